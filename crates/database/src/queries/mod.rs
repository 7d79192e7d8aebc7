use crate::repo::DatabaseError;

pub mod location;

pub(crate) fn convert_error(why: mongodb::error::Error) -> DatabaseError {
    DatabaseError::other(why)
}
