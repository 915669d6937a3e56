use super::*;
use crate::auction::{BidderId, ItemId};
use crate::error::Error;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::trace;

#[derive(Default)]
struct InMemoryAuctionStoreInner {
    items: HashMap<ItemId, Item>,
    bids: HashMap<ItemId, Vec<Bid>>,
    bidder_items: HashMap<BidderId, Vec<ItemId>>,
}

/// Auction store kept entirely in memory
///
/// All state sits behind a single reader/writer lock: reads share it,
/// writes hold it exclusively, and neither is held past the operation.
#[derive(Default)]
pub struct InMemoryAuctionStore {
    inner: RwLock<InMemoryAuctionStoreInner>,
}

impl InMemoryAuctionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_shared() -> SharedAuctionStore {
        Arc::new(Self::new())
    }
}

impl AuctionStore for InMemoryAuctionStore {
    fn record_bid(&self, bid: Bid) -> Result<()> {
        let mut write = self.inner.write();

        if !write.items.contains_key(&bid.item_id) {
            return Err(Error::ItemNotFound(bid.item_id));
        }

        let bidder_items = write.bidder_items.entry(bid.bidder_id.clone()).or_default();
        if !bidder_items.contains(&bid.item_id) {
            bidder_items.push(bid.item_id.clone());
        }

        trace!(bid_id = %bid.bid_id, item_id = %bid.item_id, amount = bid.amount, "recording bid");
        write.bids.entry(bid.item_id.clone()).or_default().push(bid);

        Ok(())
    }

    fn get_bids(&self, item_id: ItemIdRef) -> Result<Vec<Bid>> {
        match self.inner.read().bids.get(item_id) {
            Some(bids) if !bids.is_empty() => Ok(bids.clone()),
            _ => Err(Error::NoBids(item_id.to_owned())),
        }
    }

    fn get_winning_bid(&self, item_id: ItemIdRef) -> Result<Bid> {
        let read = self.inner.read();

        let mut bids = read.bids.get(item_id).into_iter().flatten();
        let first = bids
            .next()
            .ok_or_else(|| Error::NoBids(item_id.to_owned()))?;

        Ok(bids
            .fold(first, |winning, bid| {
                if bid.outranks(winning) {
                    bid
                } else {
                    winning
                }
            })
            .clone())
    }

    fn get_items_for_bidder(&self, bidder_id: BidderIdRef) -> Result<Vec<Item>> {
        let read = self.inner.read();

        match read.bidder_items.get(bidder_id) {
            Some(item_ids) if !item_ids.is_empty() => Ok(item_ids
                .iter()
                .filter_map(|item_id| read.items.get(item_id).cloned())
                .collect()),
            _ => Err(Error::NoBidsForBidder(bidder_id.to_owned())),
        }
    }

    fn add_item(&self, item: Item) {
        trace!(item_id = %item.item_id, "adding item");
        self.inner.write().items.insert(item.item_id.clone(), item);
    }
}
