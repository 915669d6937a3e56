//! Auction state storage
//!
//! The store is the only place that holds (and mutates) shared auction
//! state, and the only point of synchronization. Each operation is
//! atomic on its own; nothing here spans multiple calls, so any
//! read-then-write sequence built on top of it is not atomic as a whole.
mod in_memory;

pub use self::in_memory::*;

use crate::auction::{Bid, BidderIdRef, Item, ItemIdRef};
use crate::error::Result;
use std::sync::Arc;

pub trait AuctionStore: Send + Sync {
    /// Append `bid` to its item's bid history
    ///
    /// Fails with `ItemNotFound` if the item is not known. Amounts,
    /// timestamps and bidder ids are stored as given.
    fn record_bid(&self, bid: Bid) -> Result<()>;

    /// All bids on an item, in arrival order
    ///
    /// Fails with `NoBids` if there are none, whether or not the item exists.
    fn get_bids(&self, item_id: ItemIdRef) -> Result<Vec<Bid>>;

    /// Highest bid on an item, earliest one among equal amounts
    fn get_winning_bid(&self, item_id: ItemIdRef) -> Result<Bid>;

    /// Items a bidder has bid on, in the order of their first bid on each
    fn get_items_for_bidder(&self, bidder_id: BidderIdRef) -> Result<Vec<Item>>;

    /// Insert or replace an item. Setup only.
    fn add_item(&self, item: Item);
}

pub type SharedAuctionStore = Arc<dyn AuctionStore + Send + Sync + 'static>;
