//! Participants and their travel modes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{GeoPoint, GeoPointError};

/// How a participant travels to the meeting point.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    /// Private car.
    #[default]
    Driving,
    /// On foot.
    Walking,
    /// Public transport.
    Transit,
    /// Bicycle.
    Bicycling,
}

impl TravelMode {
    /// Wire name used by routing services.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Driving => "driving",
            Self::Walking => "walking",
            Self::Transit => "transit",
            Self::Bicycling => "bicycling",
        }
    }

    /// Mode to retry with when this mode cannot route a pair.
    ///
    /// Only transit falls back (to driving); transit coverage has gaps that
    /// roads usually do not.
    #[must_use]
    pub const fn fallback(self) -> Option<Self> {
        match self {
            Self::Transit => Some(Self::Driving),
            Self::Driving | Self::Walking | Self::Bicycling => None,
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown [`TravelMode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown travel mode {0:?}")]
pub struct TravelModeParseError(pub String);

impl FromStr for TravelMode {
    type Err = TravelModeParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "driving" => Ok(Self::Driving),
            "walking" => Ok(Self::Walking),
            "transit" => Ok(Self::Transit),
            "bicycling" => Ok(Self::Bicycling),
            other => Err(TravelModeParseError(other.to_owned())),
        }
    }
}

/// A person taking part in a meetup.
///
/// Participants whose position is unknown are accepted so callers can pass
/// a whole member list, but they are ignored by every computation.
///
/// # Examples
/// ```
/// use rendezvous_core::{Participant, TravelMode};
///
/// # fn main() -> Result<(), rendezvous_core::ParticipantError> {
/// let alice = Participant::new("alice", 25.03, 121.56, TravelMode::Transit)?;
/// let bob = Participant::unlocated("bob", TravelMode::Walking);
/// assert!(alice.location.is_some());
/// assert!(bob.location.is_none());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ParticipantRecord", into = "ParticipantRecord")]
pub struct Participant {
    /// Caller-assigned identifier.
    pub id: String,
    /// Last known position, if any.
    pub location: Option<GeoPoint>,
    /// Preferred travel mode.
    pub travel_mode: TravelMode,
}

/// Errors returned when constructing a [`Participant`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParticipantError {
    /// The supplied coordinates were out of range.
    #[error("participant {id} has an invalid location: {source}")]
    InvalidLocation {
        /// Participant identifier.
        id: String,
        /// Underlying coordinate error.
        #[source]
        source: GeoPointError,
    },
    /// Only one of latitude and longitude was supplied.
    #[error("participant {id} must supply both lat and lng or neither")]
    PartialLocation {
        /// Participant identifier.
        id: String,
    },
}

impl Participant {
    /// Validates and constructs a located [`Participant`].
    pub fn new(
        id: impl Into<String>,
        lat: f64,
        lng: f64,
        travel_mode: TravelMode,
    ) -> Result<Self, ParticipantError> {
        let id = id.into();
        match GeoPoint::new(lat, lng) {
            Ok(point) => Ok(Self {
                id,
                location: Some(point),
                travel_mode,
            }),
            Err(source) => Err(ParticipantError::InvalidLocation { id, source }),
        }
    }

    /// Construct a participant whose position is unknown.
    pub fn unlocated(id: impl Into<String>, travel_mode: TravelMode) -> Self {
        Self {
            id: id.into(),
            location: None,
            travel_mode,
        }
    }
}

/// Wire shape of a participant: `{id, lat?, lng?, travelMode?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ParticipantRecord {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lng: Option<f64>,
    #[serde(default)]
    travel_mode: TravelMode,
}

impl TryFrom<ParticipantRecord> for Participant {
    type Error = ParticipantError;

    fn try_from(record: ParticipantRecord) -> Result<Self, Self::Error> {
        match (record.lat, record.lng) {
            (Some(lat), Some(lng)) => Self::new(record.id, lat, lng, record.travel_mode),
            (None, None) => Ok(Self::unlocated(record.id, record.travel_mode)),
            _ => Err(ParticipantError::PartialLocation { id: record.id }),
        }
    }
}

impl From<Participant> for ParticipantRecord {
    fn from(participant: Participant) -> Self {
        Self {
            id: participant.id,
            lat: participant.location.map(|point| point.lat),
            lng: participant.location.map(|point| point.lng),
            travel_mode: participant.travel_mode,
        }
    }
}

/// Borrowed view of a participant with a known position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Located<'a> {
    pub(crate) id: &'a str,
    pub(crate) point: GeoPoint,
    pub(crate) mode: TravelMode,
}

/// Participants with a known position, in input order.
pub(crate) fn located(participants: &[Participant]) -> Vec<Located<'_>> {
    participants
        .iter()
        .filter_map(|participant| {
            participant.location.map(|point| Located {
                id: participant.id.as_str(),
                point,
                mode: participant.travel_mode,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(TravelMode::Transit, Some(TravelMode::Driving))]
    #[case(TravelMode::Driving, None)]
    #[case(TravelMode::Walking, None)]
    #[case(TravelMode::Bicycling, None)]
    fn only_transit_falls_back(#[case] mode: TravelMode, #[case] expected: Option<TravelMode>) {
        assert_eq!(mode.fallback(), expected);
    }

    #[rstest]
    fn travel_mode_round_trips_through_its_wire_name() {
        for mode in [
            TravelMode::Driving,
            TravelMode::Walking,
            TravelMode::Transit,
            TravelMode::Bicycling,
        ] {
            assert_eq!(mode.as_str().parse::<TravelMode>(), Ok(mode));
        }
        assert!("teleport".parse::<TravelMode>().is_err());
    }

    #[rstest]
    fn deserialises_caller_records() {
        let json = r#"[
            {"id": "a", "lat": 25.03, "lng": 121.56, "travelMode": "transit"},
            {"id": "b"},
            {"id": "c", "lat": 25.0, "lng": 121.0}
        ]"#;
        let participants: Vec<Participant> = serde_json::from_str(json).expect("valid records");
        assert_eq!(participants.len(), 3);
        assert_eq!(participants[0].travel_mode, TravelMode::Transit);
        assert!(participants[1].location.is_none());
        assert_eq!(participants[2].travel_mode, TravelMode::Driving);
    }

    #[rstest]
    #[case(r#"{"id": "a", "lat": 25.03}"#, "both lat and lng")]
    #[case(r#"{"id": "a", "lat": 25.03, "lng": 200.0}"#, "invalid location")]
    fn rejects_malformed_records(#[case] json: &str, #[case] message: &str) {
        let err = serde_json::from_str::<Participant>(json).expect_err("malformed record");
        assert!(err.to_string().contains(message), "unexpected error: {err}");
    }

    #[rstest]
    fn located_skips_unknown_positions() {
        let participants = vec![
            Participant::new("a", 1.0, 2.0, TravelMode::Walking).expect("valid"),
            Participant::unlocated("b", TravelMode::Driving),
        ];
        let located = located(&participants);
        assert_eq!(located.len(), 1);
        assert_eq!(located[0].id, "a");
        assert_eq!(located[0].mode, TravelMode::Walking);
    }
}
