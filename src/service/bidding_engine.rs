//! Bidding Engine
//!
//! Business rules on top of the [`AuctionStore`](crate::store::AuctionStore):
//! validates requests, decides whether a new bid beats the current winner,
//! and records accepted bids.
//!
//! The engine keeps no state and takes no locks of its own. Placing a bid
//! reads the current winner and then records the new bid in two separate
//! store calls, so two concurrent bidders can both be checked against the
//! same winner and both be accepted.
use crate::auction::{Amount, Bid, BidderIdRef, Item, ItemIdRef};
use crate::clock::SharedClock;
use crate::error::{Error, ErrorKind, Result};
use crate::id::SharedIdGenerator;
use crate::store::SharedAuctionStore;
use std::sync::Arc;
use tracing::debug;

pub type SharedBiddingEngine = Arc<BiddingEngine>;

pub struct BiddingEngine {
    store: SharedAuctionStore,
    clock: SharedClock,
    ids: SharedIdGenerator,
}

impl BiddingEngine {
    pub fn new(store: SharedAuctionStore, clock: SharedClock, ids: SharedIdGenerator) -> Self {
        Self { store, clock, ids }
    }

    pub fn new_shared(
        store: SharedAuctionStore,
        clock: SharedClock,
        ids: SharedIdGenerator,
    ) -> SharedBiddingEngine {
        Arc::new(Self::new(store, clock, ids))
    }

    pub fn place_bid(
        &self,
        item_id: ItemIdRef,
        bidder_id: BidderIdRef,
        amount: Amount,
    ) -> Result<Bid> {
        if let Err(e) = self.ensure_valid_bid(item_id, bidder_id, amount) {
            debug!(%item_id, %bidder_id, amount, error = %e, "bid rejected");
            return Err(e);
        }

        let bid = Bid {
            bid_id: self.ids.generate(),
            item_id: item_id.to_owned(),
            bidder_id: bidder_id.to_owned(),
            amount,
            created_at: self.clock.now(),
        };

        self.store.record_bid(bid.clone()).map_err(|e| {
            e.context(format!(
                "failed to record bid for item {item_id} by bidder {bidder_id}"
            ))
        })?;

        debug!(bid_id = %bid.bid_id, %item_id, %bidder_id, amount, "bid accepted");
        Ok(bid)
    }

    fn ensure_valid_bid(
        &self,
        item_id: ItemIdRef,
        bidder_id: BidderIdRef,
        amount: Amount,
    ) -> Result<()> {
        if item_id.is_empty() || bidder_id.is_empty() {
            return Err(Error::InvalidBid("missing item id or bidder id"));
        }
        if !amount.is_finite() || amount <= 0.0 {
            return Err(Error::InvalidBid("bid amount must be a positive number"));
        }

        match self.store.get_winning_bid(item_id) {
            Ok(winning) if amount <= winning.amount => Err(Error::BidTooLow {
                amount,
                winning: winning.amount,
            }),
            Ok(_) => Ok(()),
            // first bid on an item only has to be positive
            Err(e) if e.kind() == ErrorKind::NoBids => Ok(()),
            Err(e) => Err(Error::Internal(
                anyhow::Error::new(e)
                    .context(format!("failed to check winning bid for item {item_id}")),
            )),
        }
    }

    pub fn get_bids_for_item(&self, item_id: ItemIdRef) -> Result<Vec<Bid>> {
        if item_id.is_empty() {
            return Err(Error::InvalidBid("empty item id"));
        }

        self.store
            .get_bids(item_id)
            .map_err(|e| e.context(format!("failed to get bids for item {item_id}")))
    }

    pub fn get_winning_bid_for_item(&self, item_id: ItemIdRef) -> Result<Bid> {
        if item_id.is_empty() {
            return Err(Error::InvalidBid("empty item id"));
        }

        self.store
            .get_winning_bid(item_id)
            .map_err(|e| e.context(format!("failed to get winning bid for item {item_id}")))
    }

    pub fn get_items_for_bidder(&self, bidder_id: BidderIdRef) -> Result<Vec<Item>> {
        if bidder_id.is_empty() {
            return Err(Error::InvalidBid("empty bidder id"));
        }

        self.store
            .get_items_for_bidder(bidder_id)
            .map_err(|e| e.context(format!("failed to get items for bidder {bidder_id}")))
    }

    /// Make an item available for bidding. Setup only.
    pub fn add_item(&self, item: Item) {
        debug!(item_id = %item.item_id, title = %item.title, "adding item");
        self.store.add_item(item);
    }
}
