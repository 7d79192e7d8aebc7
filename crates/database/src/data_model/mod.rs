use bson::Document;

use crate::repo::Result;

pub mod location;

/// A document as it is stored in a collection.
pub trait DatabaseDocument: Sized {
    type Model;
    type Input;
    type Update;

    fn from_input(input: Self::Input) -> Self;
    fn to_model(self) -> Result<Self::Model>;

    /// The `$set` operand applying `update`, empty when nothing changes.
    fn set_document(update: &Self::Update) -> Document;
}
