//! Tunable parameters for [`MeetingPointEngine`](crate::MeetingPointEngine).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::CacheNamespace;

/// Engine configuration.
///
/// Each time-optimised computation issues at most
/// `max_iterations × participants` directions queries, including transit
/// fallbacks, and one places search. Venue ranking adds one distance-matrix
/// query per participant over at most `max_candidates` venues, plus one
/// driving retry per transit rider with gaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Upper bound on optimiser iterations. Multiplied by the participant
    /// count it caps optimiser directions queries.
    pub max_iterations: usize,
    /// Distance the optimiser moves per iteration, in degrees (~500 m).
    pub step_degrees: f64,
    /// Radius of the venue search around the optimised point.
    pub search_radius_meters: u32,
    /// Places category to search for, e.g. `cafe`.
    pub venue_category: String,
    /// Maximum number of venues scored per computation.
    pub max_candidates: usize,
    /// Maximum number of venues suggested around a geometric midpoint.
    pub suggested_venue_limit: usize,
    /// Cache lifetimes per namespace.
    pub cache_ttls: CacheTtls,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            step_degrees: 0.005,
            search_radius_meters: 1_000,
            venue_category: "cafe".to_owned(),
            max_candidates: 20,
            suggested_venue_limit: 5,
            cache_ttls: CacheTtls::default(),
        }
    }
}

impl EngineConfig {
    /// Set the venue category.
    #[must_use]
    pub fn with_venue_category(mut self, category: impl Into<String>) -> Self {
        self.venue_category = category.into();
        self
    }

    /// Set the venue search radius.
    #[must_use]
    pub const fn with_search_radius(mut self, radius_meters: u32) -> Self {
        self.search_radius_meters = radius_meters;
        self
    }

    /// Set the cache lifetimes.
    #[must_use]
    pub const fn with_cache_ttls(mut self, ttls: CacheTtls) -> Self {
        self.cache_ttls = ttls;
        self
    }
}

/// Cache lifetimes, in seconds, per [`CacheNamespace`].
///
/// Shorter lifetimes track changing travel conditions more closely; longer
/// ones spend less on external API calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheTtls {
    /// Lifetime of geometric midpoint results.
    pub geometric_midpoint_secs: u64,
    /// Lifetime of time-optimised midpoint results.
    pub time_midpoint_secs: u64,
    /// Lifetime of routes-to-point results.
    pub routes_to_point_secs: u64,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            geometric_midpoint_secs: CacheNamespace::GeometricMidpoint.default_ttl().as_secs(),
            time_midpoint_secs: CacheNamespace::TimeMidpoint.default_ttl().as_secs(),
            routes_to_point_secs: CacheNamespace::RoutesToPoint.default_ttl().as_secs(),
        }
    }
}

impl CacheTtls {
    /// Lifetime for entries in `namespace`.
    #[must_use]
    pub const fn ttl_for(&self, namespace: CacheNamespace) -> Duration {
        let secs = match namespace {
            CacheNamespace::GeometricMidpoint => self.geometric_midpoint_secs,
            CacheNamespace::TimeMidpoint => self.time_midpoint_secs,
            CacheNamespace::RoutesToPoint => self.routes_to_point_secs,
        };
        Duration::from_secs(secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_follow_recommended_lifetimes() {
        let ttls = CacheTtls::default();
        assert_eq!(
            ttls.ttl_for(CacheNamespace::GeometricMidpoint),
            Duration::from_secs(300)
        );
        assert_eq!(
            ttls.ttl_for(CacheNamespace::TimeMidpoint),
            Duration::from_secs(600)
        );
        assert_eq!(
            ttls.ttl_for(CacheNamespace::RoutesToPoint),
            Duration::from_secs(300)
        );
    }

    #[rstest]
    fn partial_json_keeps_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"venueCategory": "restaurant", "cacheTtls": {"timeMidpointSecs": 60}}"#)
                .expect("valid config");
        assert_eq!(config.venue_category, "restaurant");
        assert_eq!(config.max_iterations, 5);
        assert_eq!(config.cache_ttls.time_midpoint_secs, 60);
        assert_eq!(config.cache_ttls.routes_to_point_secs, 300);
    }
}
