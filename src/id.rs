use crate::auction::BidId;
use std::sync::Arc;
use uuid::Uuid;

/// Source of unique bid identifiers
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> BidId;
}

pub type SharedIdGenerator = Arc<dyn IdGenerator + Send + Sync + 'static>;

#[derive(Clone, Debug, Default)]
pub struct UuidGenerator;

impl UuidGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn new_shared() -> SharedIdGenerator {
        Arc::new(Self::new())
    }
}

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> BidId {
        Uuid::new_v4().to_string()
    }
}

/// Hands out `bid-0`, `bid-1`, ...
#[cfg(test)]
#[derive(Default)]
pub struct SequentialIds(std::sync::atomic::AtomicU64);

#[cfg(test)]
impl SequentialIds {
    pub fn new_shared() -> SharedIdGenerator {
        Arc::new(Self::default())
    }
}

#[cfg(test)]
impl IdGenerator for SequentialIds {
    fn generate(&self) -> BidId {
        format!(
            "bid-{}",
            self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst)
        )
    }
}
