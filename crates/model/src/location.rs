use chrono::{DateTime, SubsecRound as _, TimeZone as _, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utility::{
    id::Id,
    serde::date_time::{self, now_utc, SUBSEC_DIGITS},
};

use crate::{ExampleData, WithId};

/// A single position fix as submitted by a client.
///
/// A missing `timestamp` defaults to the instant the payload is parsed.
/// Every payload evaluates its own default, so the elements of a batch
/// get distinct (if close) timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LocationCreate {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(deserialize_with = "date_time::deserialize_utc", default = "now_utc")]
    #[schemars(with = "DateTime<Utc>")]
    pub timestamp: DateTime<Utc>,
}

/// A stored location, which is a [`LocationCreate`] plus its id.
pub type Location = WithId<LocationCreate>;

pub type LocationId = Id<LocationCreate>;

impl LocationCreate {
    /// The timestamp is truncated to the precision parsed timestamps have.
    pub fn new(latitude: f64, longitude: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            timestamp: timestamp.trunc_subsecs(SUBSEC_DIGITS),
        }
    }

    /// Applies the fields present in `update`.
    pub fn apply(self, update: &LocationUpdate) -> Self {
        Self {
            latitude: update.latitude.unwrap_or(self.latitude),
            longitude: update.longitude.unwrap_or(self.longitude),
            timestamp: update.timestamp.unwrap_or(self.timestamp),
        }
    }
}

impl ExampleData for LocationCreate {
    fn example_data() -> Self {
        Self {
            latitude: 40.7128,
            longitude: -74.0060,
            timestamp: Utc
                .with_ymd_and_hms(2023, 1, 1, 12, 0, 0)
                .single()
                .unwrap_or_else(now_utc),
        }
    }
}

/// Fields to overwrite on a stored location. Absent fields stay untouched.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LocationUpdate {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(deserialize_with = "date_time::deserialize_utc_option", default)]
    #[schemars(with = "Option<DateTime<Utc>>")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl LocationUpdate {
    pub fn is_empty(&self) -> bool {
        self.latitude.is_none() && self.longitude.is_none() && self.timestamp.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LocationsBatch {
    pub locations: Vec<LocationCreate>,
}

/// Ids assigned by a batch insert, in submission order.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InsertedIds {
    pub inserted_ids: Vec<LocationId>,
}
