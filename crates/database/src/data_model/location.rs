use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use chrono::{DateTime, Utc};
use model::location::{Location, LocationCreate, LocationId, LocationUpdate};
use mongodb::Collection;
use serde::{Deserialize, Serialize};

use crate::{
    queries::location::{delete, get, get_all, insert, insert_many, last, update},
    repo::{DatabaseError, LocationRepo, Result},
};

use super::DatabaseDocument;

pub const COLLECTION: &str = "locations";

/// A location as stored.
/// Collection: `locations`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub timestamp: DateTime<Utc>,
}

impl DatabaseDocument for LocationDocument {
    type Model = Location;
    type Input = LocationCreate;
    type Update = LocationUpdate;

    fn from_input(input: LocationCreate) -> Self {
        Self {
            id: None,
            latitude: input.latitude,
            longitude: input.longitude,
            timestamp: input.timestamp,
        }
    }

    fn to_model(self) -> Result<Location> {
        let id = self.id.ok_or(DatabaseError::IdMissing)?;
        Ok(Location::new(
            LocationId::new(id),
            LocationCreate::new(self.latitude, self.longitude, self.timestamp),
        ))
    }

    fn set_document(update: &LocationUpdate) -> Document {
        let mut set = Document::new();
        if let Some(latitude) = update.latitude {
            set.insert("latitude", latitude);
        }
        if let Some(longitude) = update.longitude {
            set.insert("longitude", longitude);
        }
        if let Some(timestamp) = update.timestamp {
            set.insert("timestamp", bson::DateTime::from_chrono(timestamp));
        }
        set
    }
}

pub(crate) fn by_id(id: LocationId) -> Document {
    doc! { "_id": id.raw() }
}

/// The `locations` collection of a [`crate::MongoDatabase`].
#[derive(Debug, Clone)]
pub struct MongoLocations {
    pub(crate) collection: Collection<LocationDocument>,
}

impl MongoLocations {
    pub fn new(collection: Collection<LocationDocument>) -> Self {
        Self { collection }
    }
}

#[async_trait]
impl LocationRepo for MongoLocations {
    async fn insert(&self, location: LocationCreate) -> Result<Location> {
        insert(&self.collection, location).await
    }

    async fn insert_many(&self, locations: Vec<LocationCreate>) -> Result<Vec<LocationId>> {
        insert_many(&self.collection, locations).await
    }

    async fn get_all(&self, limit: Option<i64>) -> Result<Vec<Location>> {
        get_all(&self.collection, limit).await
    }

    async fn last(&self) -> Result<Location> {
        last(&self.collection).await
    }

    async fn get(&self, id: LocationId) -> Result<Location> {
        get(&self.collection, id).await
    }

    async fn update(&self, id: LocationId, location: LocationUpdate) -> Result<Location> {
        update(&self.collection, id, location).await
    }

    async fn delete(&self, id: LocationId) -> Result<()> {
        delete(&self.collection, id).await
    }
}

#[cfg(test)]
mod tests {
    use bson::Bson;
    use chrono::TimeZone as _;

    use super::*;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn input_documents_leave_id_to_the_database() {
        let document = LocationDocument::from_input(LocationCreate::new(1.0, 2.0, noon()));
        let raw = bson::to_document(&document).unwrap();

        assert!(!raw.contains_key("_id"));
        assert_eq!(raw.get_f64("latitude").unwrap(), 1.0);
        assert_eq!(raw.get_f64("longitude").unwrap(), 2.0);
        assert_eq!(
            raw.get("timestamp"),
            Some(&Bson::DateTime(bson::DateTime::from_chrono(noon())))
        );
    }

    #[test]
    fn stored_documents_become_locations() {
        let oid = ObjectId::parse_str("65a1f0c2e4b0a1b2c3d4e5f6").unwrap();
        let raw = doc! {
            "_id": oid,
            "latitude": 1.0,
            "longitude": 2.0,
            "timestamp": bson::DateTime::from_chrono(noon()),
        };

        let location = bson::from_document::<LocationDocument>(raw)
            .unwrap()
            .to_model()
            .unwrap();

        assert_eq!(location.id.raw(), oid);
        assert_eq!(location.content, LocationCreate::new(1.0, 2.0, noon()));
    }

    #[test]
    fn documents_without_id_are_rejected() {
        let document = LocationDocument::from_input(LocationCreate::new(1.0, 2.0, noon()));
        assert!(matches!(document.to_model(), Err(DatabaseError::IdMissing)));
    }

    #[test]
    fn set_document_only_contains_present_fields() {
        let set = LocationDocument::set_document(&LocationUpdate {
            latitude: Some(5.0),
            longitude: None,
            timestamp: Some(noon()),
        });

        assert_eq!(
            set,
            doc! {
                "latitude": 5.0,
                "timestamp": bson::DateTime::from_chrono(noon()),
            }
        );
        assert!(LocationDocument::set_document(&LocationUpdate::default()).is_empty());
    }

    #[test]
    fn id_filter_uses_native_object_id() {
        let id = LocationId::parse("65a1f0c2e4b0a1b2c3d4e5f6").unwrap();
        assert_eq!(by_id(id).get_object_id("_id").unwrap(), id.raw());
    }
}
