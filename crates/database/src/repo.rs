use std::{error, fmt, result};

use async_trait::async_trait;
use model::location::{Location, LocationCreate, LocationId, LocationUpdate};

#[derive(Debug)]
pub enum DatabaseError {
    NotFound,
    /// The database acknowledged a write without reporting a usable id.
    IdMissing,
    Other(Box<dyn error::Error + Send + Sync>),
}

impl DatabaseError {
    pub fn other<T: error::Error + Send + Sync + 'static>(why: T) -> Self {
        Self::Other(Box::new(why))
    }
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "record not found"),
            Self::IdMissing => write!(f, "database did not return an object id"),
            Self::Other(why) => write!(f, "{}", why),
        }
    }
}

impl error::Error for DatabaseError {}

pub type Result<T> = result::Result<T, DatabaseError>;

/// Storage of location records.
///
/// Every method is a single round trip to the store and is atomic only at
/// the level of one record.
#[async_trait]
pub trait LocationRepo: Clone + Send + Sync + 'static {
    async fn insert(&self, location: LocationCreate) -> Result<Location>;

    /// Inserts all locations and returns their ids in submission order.
    /// Not atomic: a failure part way through leaves earlier records stored.
    async fn insert_many(&self, locations: Vec<LocationCreate>) -> Result<Vec<LocationId>>;

    /// Up to `limit` locations in storage order. `None` means no limit.
    async fn get_all(&self, limit: Option<i64>) -> Result<Vec<Location>>;

    /// The location with the greatest timestamp.
    async fn last(&self) -> Result<Location>;

    async fn get(&self, id: LocationId) -> Result<Location>;

    /// Writes the fields present in `update`. Fails with `NotFound` when no
    /// record was modified, which includes writing values equal to the
    /// stored ones.
    async fn update(&self, id: LocationId, update: LocationUpdate) -> Result<Location>;

    async fn delete(&self, id: LocationId) -> Result<()>;
}
