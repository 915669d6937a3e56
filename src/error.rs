use crate::auction::{Amount, BidderId, ItemId};
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("item not found: {0}")]
    ItemNotFound(ItemId),
    #[error("no bids found for item: {0}")]
    NoBids(ItemId),
    #[error("bidder has not placed any bids: {0}")]
    NoBidsForBidder(BidderId),
    #[error("invalid bid: {0}")]
    InvalidBid(&'static str),
    #[error("bid amount too low: {amount:.2} does not exceed current highest bid {winning:.2}")]
    BidTooLow { amount: Amount, winning: Amount },
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<Error>,
    },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Classification of an [`Error`], ignoring any context it was wrapped in
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    ItemNotFound,
    NoBids,
    NoBidsForBidder,
    InvalidBid,
    BidTooLow,
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::ItemNotFound(_) => ErrorKind::ItemNotFound,
            Error::NoBids(_) => ErrorKind::NoBids,
            Error::NoBidsForBidder(_) => ErrorKind::NoBidsForBidder,
            Error::InvalidBid(_) => ErrorKind::InvalidBid,
            Error::BidTooLow { .. } => ErrorKind::BidTooLow,
            Error::Context { source, .. } => source.kind(),
            Error::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn context(self, context: impl Into<String>) -> Self {
        Error::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }
}
