use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type ItemId = String;
pub type ItemIdRef<'s> = &'s str;
pub type BidderId = String;
pub type BidderIdRef<'s> = &'s str;
pub type BidId = String;
pub type Amount = f64;

/// Something that can be auctioned
///
/// Created once during setup and never changed afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub item_id: ItemId,
    pub title: String,
    pub description: String,
    /// Informational only, not enforced as a floor
    pub starting_price: Amount,
}

/// A single bidder's offer on a single item
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    pub bid_id: BidId,
    pub item_id: ItemId,
    #[serde(rename = "user_id")]
    pub bidder_id: BidderId,
    pub amount: Amount,
    pub created_at: DateTime<Utc>,
}

impl Bid {
    /// Would `self` take over as the winning bid from `current`?
    ///
    /// Higher amount wins; on equal amounts the earlier bid wins. When
    /// both are equal the incumbent keeps winning, so scanning bids in
    /// arrival order keeps the first arrival.
    pub fn outranks(&self, current: &Bid) -> bool {
        self.amount > current.amount
            || (self.amount == current.amount && self.created_at < current.created_at)
    }
}
