//! Per-user role cache with a TTL and in-flight de-duplication.
//!
//! Invariants:
//! - an entry older than the TTL is never returned, and is dropped once seen
//!   or on the next write
//! - at most one role fetch per user is running at a time; concurrent callers
//!   await the same shared future
//! - `invalidate` drops both the entry and any in-flight fetch, and a fetch
//!   that was already running when it happened does not repopulate the cache

use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use super::models::RoleInfo;
use crate::common::Clock;

type RoleFuture = Shared<BoxFuture<'static, RoleInfo>>;

#[derive(Debug, Clone)]
struct RoleCacheEntry {
    info: RoleInfo,
    cached_at: Instant,
}

struct InFlight {
    generation: u64,
    future: RoleFuture,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<Uuid, RoleCacheEntry>,
    in_flight: HashMap<Uuid, InFlight>,
    next_generation: u64,
}

pub struct RoleCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    inner: Mutex<Inner>,
}

impl RoleCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Nothing inside can be left half-updated by a panic, so a poisoned lock is still usable
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_fresh(&self, entry: &RoleCacheEntry, now: Instant) -> bool {
        now.duration_since(entry.cached_at) < self.ttl
    }

    /// Cached role if it is younger than the TTL
    pub fn get(&self, user_id: Uuid) -> Option<RoleInfo> {
        let now = self.clock.now();
        let mut inner = self.lock();
        let cached = inner
            .entries
            .get(&user_id)
            .map(|entry| (self.is_fresh(entry, now), entry.info.clone()));
        match cached {
            Some((true, info)) => Some(info),
            Some((false, _)) => {
                inner.entries.remove(&user_id);
                None
            }
            None => None,
        }
    }

    pub fn set(&self, user_id: Uuid, info: RoleInfo) {
        let cached_at = self.clock.now();
        let mut inner = self.lock();
        self.insert_entry(&mut inner, user_id, RoleCacheEntry { info, cached_at });
    }

    /// Store an entry, evicting everything that has expired
    fn insert_entry(&self, inner: &mut Inner, user_id: Uuid, entry: RoleCacheEntry) {
        let now = entry.cached_at;
        inner.entries.retain(|_, e| self.is_fresh(e, now));
        inner.entries.insert(user_id, entry);
    }

    /// Forget a user's role and abandon any fetch in progress
    pub fn invalidate(&self, user_id: Uuid) {
        let mut inner = self.lock();
        inner.entries.remove(&user_id);
        inner.in_flight.remove(&user_id);
        debug!(%user_id, "Role cache entry invalidated");
    }

    /// Return the cached role, or run `fetch` once for everyone asking
    ///
    /// `force` skips the cache but still joins a fetch that is already
    /// running for the same user.
    pub async fn resolve<F, Fut>(&self, user_id: Uuid, force: bool, fetch: F) -> RoleInfo
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = RoleInfo> + Send + 'static,
    {
        if !force {
            if let Some(info) = self.get(user_id) {
                debug!(%user_id, role = %info.role, "Role cache hit");
                return info;
            }
        }

        let (generation, future) = {
            let mut inner = self.lock();
            match inner.in_flight.get(&user_id) {
                Some(flight) => {
                    debug!(%user_id, "Joining in-flight role fetch");
                    (flight.generation, flight.future.clone())
                }
                None => {
                    inner.next_generation += 1;
                    let generation = inner.next_generation;
                    let future = fetch().boxed().shared();
                    inner.in_flight.insert(
                        user_id,
                        InFlight {
                            generation,
                            future: future.clone(),
                        },
                    );
                    (generation, future)
                }
            }
        };

        let info = future.await;

        // First finisher publishes; later finishers and invalidated fetches find nothing to do
        let cached_at = self.clock.now();
        let mut inner = self.lock();
        if inner
            .in_flight
            .get(&user_id)
            .is_some_and(|flight| flight.generation == generation)
        {
            inner.in_flight.remove(&user_id);
            self.insert_entry(
                &mut inner,
                user_id,
                RoleCacheEntry {
                    info: info.clone(),
                    cached_at,
                },
            );
        }

        info
    }
}
