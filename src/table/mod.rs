use thiserror::Error;

mod rid;
mod schema;
mod tuple;

pub use rid::RecordId;
pub use schema::{Column, Schema, SchemaRef};
pub use tuple::Tuple;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("datum not match with schema")]
    DatumSchemaNotMatch,
    #[error("field index {0} out of bound")]
    FieldOutOfBound(usize),
}
