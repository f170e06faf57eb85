use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

/// IdGenerator trait for abstracting device id generation
pub trait IdGenerator: Send + Sync {
    /// Generate a new UUID v4
    fn uuid_v4(&self) -> Uuid;
}

/// Production implementation of IdGenerator using random UUID generation
#[derive(Debug, Clone, Default)]
pub struct RandomIdGenerator;

impl RandomIdGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl IdGenerator for RandomIdGenerator {
    fn uuid_v4(&self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Test implementation of IdGenerator with fixed/controllable UUIDs
/// Useful for deterministic testing
#[derive(Debug)]
pub struct FixedIdGenerator {
    uuids: Vec<Uuid>,
    index: AtomicUsize,
}

impl FixedIdGenerator {
    /// Create a new FixedIdGenerator with a list of UUIDs to return in sequence
    /// When the list is exhausted, it wraps around to the beginning
    pub fn new(uuids: Vec<Uuid>) -> Self {
        assert!(!uuids.is_empty(), "FixedIdGenerator needs at least one id");
        Self {
            uuids,
            index: AtomicUsize::new(0),
        }
    }

    /// Create a FixedIdGenerator with a sequence of UUIDs from strings
    ///
    /// Panics if any string is not a UUID.
    pub fn from_strings(uuid_strs: &[&str]) -> Self {
        Self::new(
            uuid_strs
                .iter()
                .map(|s| Uuid::parse_str(s).expect("fixed id must be a UUID"))
                .collect(),
        )
    }
}

impl IdGenerator for FixedIdGenerator {
    fn uuid_v4(&self) -> Uuid {
        let index = self.index.fetch_add(1, Ordering::Relaxed);
        self.uuids[index % self.uuids.len()]
    }
}
