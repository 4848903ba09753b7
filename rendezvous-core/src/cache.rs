//! Expiring in-memory result cache keyed by request fingerprints.
//!
//! Values are stored as JSON so one map can hold every payload type. The
//! cache is shared between concurrent computations via `Arc`; `DashMap`
//! shards its locks so readers of different keys do not contend.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::participant::located;
use crate::{Participant, TravelMode};

/// The kind of result a cache entry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheNamespace {
    /// [`GeometricMidpoint`](crate::GeometricMidpoint) payloads.
    GeometricMidpoint,
    /// [`TimeOptimizedMidpoint`](crate::TimeOptimizedMidpoint) payloads.
    TimeMidpoint,
    /// [`RoutesToPoint`](crate::RoutesToPoint) payloads.
    RoutesToPoint,
}

impl CacheNamespace {
    /// Key prefix for the namespace.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GeometricMidpoint => "geometric_midpoint",
            Self::TimeMidpoint => "time_midpoint",
            Self::RoutesToPoint => "routes_to_point",
        }
    }

    /// Recommended lifetime for entries in this namespace.
    #[must_use]
    pub const fn default_ttl(self) -> Duration {
        match self {
            Self::GeometricMidpoint | Self::RoutesToPoint => Duration::from_secs(300),
            Self::TimeMidpoint => Duration::from_secs(600),
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: serde_json::Value,
    // `None` when the lifetime overflows `Instant`.
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }
}

/// Concurrent key-value store whose entries expire after a per-entry TTL.
///
/// Expired entries are never returned. They are removed lazily on lookup,
/// by [`ResultCache::purge_expired`], or by a background sweeper started
/// with [`ResultCache::spawn_sweeper`].
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use rendezvous_core::ResultCache;
///
/// let cache = ResultCache::new();
/// cache.set("answer".to_owned(), &42_u32, Duration::from_secs(60));
/// assert_eq!(cache.get::<u32>("answer"), Some(42));
/// assert_eq!(cache.get::<u32>("question"), None);
/// ```
#[derive(Debug, Default)]
pub struct ResultCache {
    entries: DashMap<String, CacheEntry>,
}

impl ResultCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch and decode the live entry for `key`.
    ///
    /// Expired entries and entries that fail to decode as `T` are removed
    /// and reported as misses.
    #[must_use]
    pub fn get<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let now = Instant::now();
        // The shard guard is released inside `map`, before any removal below.
        let lookup = self
            .entries
            .get(key)
            .map(|entry| (!entry.is_expired(now)).then(|| entry.value.clone()));
        match lookup {
            None => None,
            Some(None) => {
                self.entries
                    .remove_if(key, |_, entry| entry.is_expired(now));
                debug!("cache entry {key} expired");
                None
            }
            Some(Some(value)) => match serde_json::from_value(value) {
                Ok(decoded) => Some(decoded),
                Err(err) => {
                    warn!("discarding undecodable cache entry {key}: {err}");
                    self.entries.remove(key);
                    None
                }
            },
        }
    }

    /// Store `value` under `key` for `ttl`.
    ///
    /// A zero `ttl` stores nothing. Serialisation failures are logged and
    /// the value is not cached.
    pub fn set<T>(&self, key: String, value: &T, ttl: Duration)
    where
        T: Serialize + ?Sized,
    {
        if ttl.is_zero() {
            return;
        }
        match serde_json::to_value(value) {
            Ok(json) => {
                self.entries.insert(
                    key,
                    CacheEntry {
                        value: json,
                        expires_at: Instant::now().checked_add(ttl),
                    },
                );
            }
            Err(err) => warn!("not caching {key}: {err}"),
        }
    }

    /// Remove every expired entry, returning how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let keep = !entry.is_expired(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    /// Number of stored entries, including expired ones not yet purged.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Purge expired entries every `every` on the current Tokio runtime.
    ///
    /// The task holds a weak reference and exits once the last strong
    /// reference to the cache is dropped.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    #[must_use = "dropping the handle detaches the sweeper"]
    pub fn spawn_sweeper(cache: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let weak = Arc::downgrade(cache);
        let period = every.max(Duration::from_millis(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(live) = weak.upgrade() else {
                    debug!("result cache dropped; sweeper exiting");
                    break;
                };
                let removed = live.purge_expired();
                if removed > 0 {
                    debug!("purged {removed} expired cache entries");
                }
            }
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct KeyParticipant<'a> {
    lat: f64,
    lng: f64,
    travel_mode: TravelMode,
    id: &'a str,
}

#[derive(Serialize)]
struct KeyInput<'a, P: ?Sized> {
    participants: Vec<KeyParticipant<'a>>,
    params: &'a P,
}

/// Deterministic cache key for a request.
///
/// Located participants are sorted by latitude, longitude, travel mode and
/// identifier, so the key does not depend on input order. Participants
/// without a position do not affect any result and are left out. `params`
/// carries every other input that shapes the result (target point,
/// objective, venue category and so on).
///
/// # Errors
///
/// Returns an error when `params` cannot be serialised to JSON.
pub fn fingerprint<P>(
    namespace: CacheNamespace,
    participants: &[Participant],
    params: &P,
) -> Result<String, serde_json::Error>
where
    P: Serialize + ?Sized,
{
    let mut travellers = located(participants);
    travellers.sort_by(|a, b| {
        a.point
            .lat
            .total_cmp(&b.point.lat)
            .then_with(|| a.point.lng.total_cmp(&b.point.lng))
            .then_with(|| a.mode.cmp(&b.mode))
            .then_with(|| a.id.cmp(b.id))
    });
    let input = KeyInput {
        participants: travellers
            .into_iter()
            .map(|traveller| KeyParticipant {
                lat: traveller.point.lat,
                lng: traveller.point.lng,
                travel_mode: traveller.mode,
                id: traveller.id,
            })
            .collect(),
        params,
    };
    let bytes = serde_json::to_vec(&input)?;
    Ok(format!("{}:{:x}", namespace.as_str(), Sha256::digest(&bytes)))
}
