use std::{borrow::Cow, error::Error, fmt, hash, marker::PhantomData, str::FromStr};

use bson::oid::ObjectId;
use schemars::{
    gen::SchemaGenerator,
    schema::{InstanceType, Schema, SchemaObject, StringValidation},
    JsonSchema,
};
use serde::{de, Deserialize, Serialize};

/// Length of the hex encoding of an object id.
pub const ID_HEX_LEN: usize = 24;

/// Identifier of a stored record of type `T`.
///
/// Held as the database's native binary object id and rendered as its
/// 24 character hex string everywhere else (JSON, urls, logs).
pub struct Id<T>(ObjectId, PhantomData<T>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidId {
    pub candidate: String,
}

impl fmt::Display for InvalidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' is not a valid id, expected {} hex characters",
            self.candidate, ID_HEX_LEN
        )
    }
}

impl Error for InvalidId {}

impl<T> Id<T> {
    pub fn new(inner: ObjectId) -> Self {
        Self(inner, PhantomData)
    }

    /// A fresh id, as the database would assign on insert.
    pub fn generate() -> Self {
        Self::new(ObjectId::new())
    }

    pub fn parse(candidate: &str) -> Result<Self, InvalidId> {
        let invalid = || InvalidId {
            candidate: candidate.to_owned(),
        };

        if candidate.len() != ID_HEX_LEN
            || !candidate.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Err(invalid());
        }
        ObjectId::parse_str(candidate)
            .map(Self::new)
            .map_err(|_| invalid())
    }

    pub fn is_valid(candidate: &str) -> bool {
        Self::parse(candidate).is_ok()
    }

    pub fn raw(&self) -> ObjectId {
        self.0
    }

    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl<T> From<ObjectId> for Id<T> {
    fn from(value: ObjectId) -> Self {
        Self::new(value)
    }
}

impl<T> FromStr for Id<T> {
    type Err = InvalidId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Id").field(&self.to_hex()).finish()
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> hash::Hash for Id<T> {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl<T> Eq for Id<T> {}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = Cow::<'de, str>::deserialize(deserializer)?;
        Id::parse(&s).map_err(|why| {
            de::Error::invalid_value(de::Unexpected::Str(&why.candidate), &"an object id")
        })
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<T: JsonSchema> JsonSchema for Id<T> {
    fn schema_name() -> String {
        // Exclude the module path to make the name in generated schemas clearer.
        format!("{}Id", T::schema_name())
    }

    fn schema_id() -> Cow<'static, str> {
        // Include the module, in case a type with the same name is in another module/crate
        Cow::Borrowed(concat!(module_path!(), "::Id"))
    }

    fn json_schema(_gen: &mut SchemaGenerator) -> Schema {
        SchemaObject {
            instance_type: Some(InstanceType::String.into()),
            format: Some("objectid".to_owned()),
            string: Some(Box::new(StringValidation {
                max_length: Some(ID_HEX_LEN as u32),
                min_length: Some(ID_HEX_LEN as u32),
                pattern: Some("^[0-9a-fA-F]{24}$".to_owned()),
            })),
            ..Default::default()
        }
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Thing;

    #[test]
    fn parses_canonical_hex() {
        let id = Id::<Thing>::parse("65a1f0c2e4b0a1b2c3d4e5f6").unwrap();
        assert_eq!(id.to_hex(), "65a1f0c2e4b0a1b2c3d4e5f6");
        assert_eq!(id.to_string(), "65a1f0c2e4b0a1b2c3d4e5f6");
    }

    #[test]
    fn uppercase_hex_is_normalised() {
        let id = Id::<Thing>::parse("65A1F0C2E4B0A1B2C3D4E5F6").unwrap();
        assert_eq!(id.to_hex(), "65a1f0c2e4b0a1b2c3d4e5f6");
    }

    #[test]
    fn rejects_malformed_candidates() {
        for candidate in [
            "",
            "not-a-valid-id",
            "65a1f0c2e4b0a1b2c3d4e5f",
            "65a1f0c2e4b0a1b2c3d4e5f6a",
            "65a1f0c2e4b0a1b2c3d4e5fg",
            " 65a1f0c2e4b0a1b2c3d4e5f",
        ] {
            let err = Id::<Thing>::parse(candidate).unwrap_err();
            assert_eq!(err.candidate, candidate);
            assert!(!Id::<Thing>::is_valid(candidate));
        }
    }

    #[test]
    fn serializes_as_hex_string() {
        let id = Id::<Thing>::parse("65a1f0c2e4b0a1b2c3d4e5f6").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"65a1f0c2e4b0a1b2c3d4e5f6\"");

        let back: Id<Thing> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn deserialize_rejects_invalid_hex() {
        let result = serde_json::from_str::<Id<Thing>>("\"nope\"");
        assert!(result.is_err());
    }

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(Id::<Thing>::generate(), Id::<Thing>::generate());
    }
}
