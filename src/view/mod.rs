//! Per-screen controllers.
//!
//! Each controller owns its screen state behind a `tokio::sync::Mutex` and
//! exposes async actions. A busy flag (`scanning` / `loading`) turns a second
//! trigger into a no-op while one is outstanding, and every load takes a
//! ticket from a [`RequestFence`] so a stale response never overwrites the
//! result of a newer one.

use std::sync::atomic::{AtomicU64, Ordering};

pub mod devices;
pub mod history;
pub mod network;
pub mod scan;

/// Monotonic request sequence; only the latest issued ticket is current
#[derive(Debug, Default)]
pub struct RequestFence {
    latest: AtomicU64,
}

impl RequestFence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding every earlier ticket
    pub fn issue(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket
    }
}
