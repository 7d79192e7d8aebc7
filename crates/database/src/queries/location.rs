use std::collections::HashMap;

use bson::{doc, Bson};
use futures::TryStreamExt as _;
use model::location::{Location, LocationCreate, LocationId, LocationUpdate};
use mongodb::{
    options::{FindOneOptions, FindOptions},
    Collection,
};
use utility::let_also::LetAlso;

use crate::{
    data_model::{
        location::{by_id, LocationDocument},
        DatabaseDocument,
    },
    repo::{DatabaseError, Result},
};

use super::convert_error;

fn object_id(inserted: &Bson) -> Result<LocationId> {
    inserted
        .as_object_id()
        .map(LocationId::new)
        .ok_or(DatabaseError::IdMissing)
}

/// Ids of a batch insert in submission order. The driver keys them by the
/// index of the document in the batch.
pub(crate) fn ordered_ids(
    inserted_ids: &HashMap<usize, Bson>,
    count: usize,
) -> Result<Vec<LocationId>> {
    (0..count)
        .map(|index| {
            inserted_ids
                .get(&index)
                .ok_or(DatabaseError::IdMissing)
                .and_then(object_id)
        })
        .collect()
}

/// `None` and non-positive limits leave the cursor unbounded.
pub(crate) fn find_options(limit: Option<i64>) -> FindOptions {
    FindOptions::builder()
        .limit(limit.filter(|limit| *limit > 0))
        .build()
}

/// A write addressed by id must have touched exactly that record.
pub(crate) fn require_affected(count: u64) -> Result<()> {
    if count == 0 {
        Err(DatabaseError::NotFound)
    } else {
        Ok(())
    }
}

pub async fn insert(
    collection: &Collection<LocationDocument>,
    location: LocationCreate,
) -> Result<Location> {
    let document = LocationDocument::from_input(location.clone());
    let result = collection
        .insert_one(&document, None)
        .await
        .map_err(convert_error)?;

    Ok(Location::new(object_id(&result.inserted_id)?, location))
}

pub async fn insert_many(
    collection: &Collection<LocationDocument>,
    locations: Vec<LocationCreate>,
) -> Result<Vec<LocationId>> {
    // the driver refuses empty batches
    if locations.is_empty() {
        return Ok(vec![]);
    }

    let count = locations.len();
    let result = collection
        .insert_many(locations.into_iter().map(LocationDocument::from_input), None)
        .await
        .map_err(convert_error)?;

    ordered_ids(&result.inserted_ids, count)
}

pub async fn get_all(
    collection: &Collection<LocationDocument>,
    limit: Option<i64>,
) -> Result<Vec<Location>> {
    collection
        .find(None, find_options(limit))
        .await
        .map_err(convert_error)?
        .try_collect::<Vec<_>>()
        .await
        .map_err(convert_error)?
        .let_owned(|documents: Vec<LocationDocument>| {
            documents
                .into_iter()
                .map(LocationDocument::to_model)
                .collect()
        })
}

pub async fn last(collection: &Collection<LocationDocument>) -> Result<Location> {
    let options = FindOneOptions::builder()
        .sort(doc! { "timestamp": -1 })
        .build();

    collection
        .find_one(None, options)
        .await
        .map_err(convert_error)?
        .ok_or(DatabaseError::NotFound)?
        .to_model()
}

pub async fn get(
    collection: &Collection<LocationDocument>,
    id: LocationId,
) -> Result<Location> {
    collection
        .find_one(by_id(id), None)
        .await
        .map_err(convert_error)?
        .ok_or(DatabaseError::NotFound)?
        .to_model()
}

pub async fn update(
    collection: &Collection<LocationDocument>,
    id: LocationId,
    location: LocationUpdate,
) -> Result<Location> {
    let set = LocationDocument::set_document(&location);
    if set.is_empty() {
        return Err(DatabaseError::NotFound);
    }

    let result = collection
        .update_one(by_id(id), doc! { "$set": set }, None)
        .await
        .map_err(convert_error)?;

    // an update writing the stored values modifies nothing and is
    // indistinguishable from a missing record here
    require_affected(result.modified_count)?;

    get(collection, id).await
}

pub async fn delete(collection: &Collection<LocationDocument>, id: LocationId) -> Result<()> {
    let result = collection
        .delete_one(by_id(id), None)
        .await
        .map_err(convert_error)?;

    require_affected(result.deleted_count)
}
