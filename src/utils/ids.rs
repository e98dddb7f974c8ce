//! Unique suffixes for node and edge ids.
//!
//! Ids keep their readable creation context (`<type>-<parent>-<suffix>`);
//! only the suffix comes from here, so uniqueness never depends on the
//! wall clock.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::{IdStrategy, IdsConfig};

/// Source of unique id suffixes.
pub trait IdGenerator: Send + Sync {
    /// Returns a suffix never returned before by this generator.
    fn next_suffix(&self) -> String;
}

/// Monotonic counter suffixes (`"0"`, `"1"`, ...), offset by a seed.
#[derive(Debug, Default)]
pub struct SequenceIds {
    next: AtomicU64,
}

impl SequenceIds {
    pub fn new(seed: u64) -> Self {
        Self {
            next: AtomicU64::new(seed),
        }
    }
}

impl IdGenerator for SequenceIds {
    fn next_suffix(&self) -> String {
        self.next.fetch_add(1, Ordering::Relaxed).to_string()
    }
}

/// Random 21 character suffixes.
#[derive(Debug, Default)]
pub struct NanoIds;

impl IdGenerator for NanoIds {
    fn next_suffix(&self) -> String {
        nanoid::nanoid!()
    }
}

pub(crate) fn from_config(config: &IdsConfig) -> Box<dyn IdGenerator> {
    match config.strategy {
        IdStrategy::Sequence => Box::new(SequenceIds::new(config.seed)),
        IdStrategy::Nanoid => Box::new(NanoIds),
    }
}
