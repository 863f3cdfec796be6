//! Time source for TTL bookkeeping.
//!
//! Caches take an `Arc<dyn Clock>` instead of reading the time directly.
//! `SystemClock` reads tokio's clock, so tests move it with
//! `tokio::time::pause` / `tokio::time::advance` instead of sleeping.

use tokio::time::Instant;

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Runtime clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
