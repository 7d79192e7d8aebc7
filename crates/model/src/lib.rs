use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use serde_with;
use utility::id::Id;

pub mod location;

pub trait ExampleData {
    fn example_data() -> Self;
}

/// A stored value together with the id the database assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WithId<V> {
    pub id: Id<V>,
    #[serde(flatten)]
    pub content: V,
}

impl<V> WithId<V> {
    pub fn new(id: Id<V>, content: V) -> Self {
        Self { id, content }
    }
}

impl<V: ExampleData> ExampleData for WithId<V> {
    fn example_data() -> Self {
        Self::new(Id::generate(), V::example_data())
    }
}
