use super::{new_item, t0};
use crate::{
    auction::{Bid, BidderIdRef, Item, ItemIdRef},
    clock::SteppingClock,
    error::{Error, ErrorKind, Result as StoreResult},
    id::SequentialIds,
    service::{BiddingEngine, SharedBiddingEngine},
    store::{AuctionStore, InMemoryAuctionStore, SharedAuctionStore},
};
use anyhow::{format_err, Result};
use std::sync::{Arc, Barrier};

fn engine_over(store: SharedAuctionStore) -> SharedBiddingEngine {
    BiddingEngine::new_shared(
        store,
        SteppingClock::new_shared(t0()),
        SequentialIds::new_shared(),
    )
}

fn engine_with_items(item_ids: &[&str]) -> SharedBiddingEngine {
    let engine = engine_over(InMemoryAuctionStore::new_shared());
    for item_id in item_ids {
        engine.add_item(new_item(item_id, item_id, 100.0));
    }
    engine
}

#[test]
fn outbidding_scenario() -> Result<()> {
    let engine = engine_with_items(&["item1"]);

    let first = engine.place_bid("item1", "u1", 100.0)?;
    assert_eq!(engine.get_winning_bid_for_item("item1")?, first);

    let err = engine.place_bid("item1", "u2", 90.0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BidTooLow);

    let second = engine.place_bid("item1", "u2", 150.0)?;
    let winning = engine.get_winning_bid_for_item("item1")?;
    assert_eq!(winning, second);
    assert_eq!(winning.bidder_id, "u2");
    assert_eq!(winning.amount, 150.0);

    assert_eq!(engine.get_bids_for_item("item1")?, vec![first, second]);
    Ok(())
}

#[test]
fn matching_the_winner_is_too_low() -> Result<()> {
    let engine = engine_with_items(&["item1"]);

    let first = engine.place_bid("item1", "uA", 200.0)?;
    let err = engine.place_bid("item1", "uB", 200.0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BidTooLow);
    assert!(matches!(
        err,
        Error::BidTooLow {
            amount,
            winning
        } if amount == 200.0 && winning == 200.0
    ));

    assert_eq!(engine.get_winning_bid_for_item("item1")?, first);
    Ok(())
}

#[test]
fn starting_price_is_not_a_floor() -> Result<()> {
    let engine = engine_with_items(&["item1"]);
    // starting price is 100
    let bid = engine.place_bid("item1", "u1", 0.01)?;
    assert_eq!(bid.amount, 0.01);
    Ok(())
}

#[test]
fn accepted_bid_uses_injected_id_and_clock() -> Result<()> {
    let engine = engine_with_items(&["item1", "item2"]);

    let first = engine.place_bid("item1", "u1", 10.0)?;
    let second = engine.place_bid("item2", "u1", 10.0)?;

    assert_eq!(
        first,
        Bid {
            bid_id: "bid-0".to_owned(),
            item_id: "item1".to_owned(),
            bidder_id: "u1".to_owned(),
            amount: 10.0,
            created_at: t0(),
        }
    );
    assert_eq!(second.bid_id, "bid-1");
    assert!(first.created_at < second.created_at);
    Ok(())
}

#[test]
fn invalid_bids_are_rejected() {
    let engine = engine_with_items(&["item1"]);

    for (item_id, bidder_id, amount) in [
        ("item1", "u1", 0.0),
        ("item1", "u1", -5.0),
        ("itemX", "u1", 0.0),
        ("itemX", "u1", -1.0),
        ("item1", "u1", f64::NAN),
        ("item1", "u1", f64::INFINITY),
        ("", "u1", 10.0),
        ("item1", "", 10.0),
        ("", "", -1.0),
    ] {
        let err = engine.place_bid(item_id, bidder_id, amount).unwrap_err();
        assert_eq!(
            err.kind(),
            ErrorKind::InvalidBid,
            "{item_id:?} {bidder_id:?} {amount}"
        );
    }

    assert_eq!(
        engine.get_bids_for_item("item1").unwrap_err().kind(),
        ErrorKind::NoBids
    );
}

#[test]
fn bid_on_unknown_item_is_item_not_found() {
    let engine = engine_with_items(&["item1"]);

    for amount in [0.01, 100.0, 1e12] {
        let err = engine.place_bid("itemX", "u1", amount).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ItemNotFound);
        assert!(err.to_string().contains("itemX"), "{err}");
    }

    assert_eq!(
        engine.get_items_for_bidder("u1").unwrap_err().kind(),
        ErrorKind::NoBidsForBidder
    );
}

#[test]
fn reads_reject_empty_ids() {
    let engine = engine_with_items(&["item1"]);

    assert_eq!(
        engine.get_bids_for_item("").unwrap_err().kind(),
        ErrorKind::InvalidBid
    );
    assert_eq!(
        engine.get_winning_bid_for_item("").unwrap_err().kind(),
        ErrorKind::InvalidBid
    );
    assert_eq!(
        engine.get_items_for_bidder("").unwrap_err().kind(),
        ErrorKind::InvalidBid
    );
}

#[test]
fn items_without_bids_report_no_bids() {
    let engine = engine_with_items(&["item1"]);

    for item_id in ["item1", "itemX"] {
        assert_eq!(
            engine.get_bids_for_item(item_id).unwrap_err().kind(),
            ErrorKind::NoBids
        );
        assert_eq!(
            engine.get_winning_bid_for_item(item_id).unwrap_err().kind(),
            ErrorKind::NoBids
        );
    }
}

#[test]
fn unknown_bidder_has_no_items() {
    let engine = engine_with_items(&["item1"]);

    let err = engine.get_items_for_bidder("unknown_user").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoBidsForBidder);
    assert!(matches!(err, Error::Context { .. }));
}

#[test]
fn bidder_items_are_listed_once() -> Result<()> {
    let engine = engine_with_items(&["item1", "item2"]);

    engine.place_bid("item1", "u1", 100.0)?;
    engine.place_bid("item2", "u1", 50.0)?;
    engine.place_bid("item1", "u1", 200.0)?;

    let items = engine.get_items_for_bidder("u1")?;
    assert_eq!(
        items
            .iter()
            .map(|item| item.item_id.as_str())
            .collect::<Vec<_>>(),
        vec!["item1", "item2"]
    );
    Ok(())
}

/// Store whose winner lookup always fails with a given error
struct BrokenWinnerStore {
    inner: InMemoryAuctionStore,
    error: fn() -> Error,
}

impl AuctionStore for BrokenWinnerStore {
    fn record_bid(&self, bid: Bid) -> StoreResult<()> {
        self.inner.record_bid(bid)
    }

    fn get_bids(&self, item_id: ItemIdRef) -> StoreResult<Vec<Bid>> {
        self.inner.get_bids(item_id)
    }

    fn get_winning_bid(&self, _item_id: ItemIdRef) -> StoreResult<Bid> {
        Err((self.error)())
    }

    fn get_items_for_bidder(&self, bidder_id: BidderIdRef) -> StoreResult<Vec<Item>> {
        self.inner.get_items_for_bidder(bidder_id)
    }

    fn add_item(&self, item: Item) {
        self.inner.add_item(item)
    }
}

#[test]
fn unexpected_winner_lookup_failure_is_internal() {
    for error in [
        (|| Error::Internal(format_err!("disk on fire"))) as fn() -> Error,
        || Error::ItemNotFound("item1".to_owned()),
    ] {
        let store = Arc::new(BrokenWinnerStore {
            inner: InMemoryAuctionStore::new(),
            error,
        });
        store.add_item(new_item("item1", "Item 1", 100.0));
        let engine = engine_over(store.clone());

        let err = engine.place_bid("item1", "u1", 100.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        // nothing was recorded
        assert_eq!(
            store.get_bids("item1").unwrap_err().kind(),
            ErrorKind::NoBids
        );
    }
}

#[test]
fn no_bids_from_winner_lookup_lets_the_bid_through() -> Result<()> {
    let store = Arc::new(BrokenWinnerStore {
        inner: InMemoryAuctionStore::new(),
        error: || Error::NoBids("item1".to_owned()).context("wrapped"),
    });
    store.add_item(new_item("item1", "Item 1", 100.0));
    let engine = engine_over(store.clone());

    engine.place_bid("item1", "u1", 100.0)?;
    // the broken lookup never reports a winner, so a lower bid passes as well
    engine.place_bid("item1", "u2", 50.0)?;
    assert_eq!(store.get_bids("item1")?.len(), 2);
    Ok(())
}

/// Store that holds each winner lookup until the barrier's other party arrives
struct LockstepStore {
    inner: InMemoryAuctionStore,
    barrier: Barrier,
}

impl AuctionStore for LockstepStore {
    fn record_bid(&self, bid: Bid) -> StoreResult<()> {
        self.inner.record_bid(bid)
    }

    fn get_bids(&self, item_id: ItemIdRef) -> StoreResult<Vec<Bid>> {
        self.inner.get_bids(item_id)
    }

    fn get_winning_bid(&self, item_id: ItemIdRef) -> StoreResult<Bid> {
        let res = self.inner.get_winning_bid(item_id);
        self.barrier.wait();
        res
    }

    fn get_items_for_bidder(&self, bidder_id: BidderIdRef) -> StoreResult<Vec<Item>> {
        self.inner.get_items_for_bidder(bidder_id)
    }

    fn add_item(&self, item: Item) {
        self.inner.add_item(item)
    }
}

#[test]
fn concurrent_bids_checked_against_the_same_winner_are_both_accepted() -> Result<()> {
    let inner = InMemoryAuctionStore::new();
    inner.add_item(new_item("item1", "Item 1", 100.0));

    let store = Arc::new(LockstepStore {
        inner,
        barrier: Barrier::new(2),
    });
    store.inner.record_bid(Bid {
        bid_id: "opening".to_owned(),
        item_id: "item1".to_owned(),
        bidder_id: "u0".to_owned(),
        amount: 100.0,
        created_at: t0(),
    })?;
    let engine = engine_over(store.clone());

    // both read the 100 winner before either records, so 150 is accepted
    // even when 160 is recorded first
    let (high, low) = std::thread::scope(|s| {
        let high = s.spawn(|| engine.place_bid("item1", "u1", 160.0));
        let low = s.spawn(|| engine.place_bid("item1", "u2", 150.0));
        (
            high.join().expect("bidder thread panicked"),
            low.join().expect("bidder thread panicked"),
        )
    });
    let high = high?;
    low?;

    assert_eq!(store.get_bids("item1")?.len(), 3);
    assert_eq!(store.inner.get_winning_bid("item1")?, high);
    Ok(())
}

#[test]
fn concurrent_accepted_bids_are_all_recorded() -> Result<()> {
    let engine = engine_with_items(&["item1"]);
    let count = 64;

    let accepted: Vec<Bid> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..count)
            .map(|i| {
                let engine = &engine;
                s.spawn(move || engine.place_bid("item1", &format!("bidder-{i}"), 1.0 + i as f64))
            })
            .collect();
        handles
            .into_iter()
            .filter_map(|h| h.join().expect("bidder thread panicked").ok())
            .collect()
    });

    assert!(!accepted.is_empty());
    let recorded = engine.get_bids_for_item("item1")?;
    assert_eq!(recorded.len(), accepted.len());
    for bid in &accepted {
        assert!(recorded.contains(bid));
        assert_eq!(
            engine.get_items_for_bidder(&bid.bidder_id)?,
            vec![new_item("item1", "item1", 100.0)]
        );
    }
    Ok(())
}
