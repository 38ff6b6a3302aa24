//! # joinforge-core: metadata foundation for the joinforge query engine
//!
//! Entity metadata traits, typed field descriptors, projection types,
//! table-alias derivation, and the shared error taxonomy. The query
//! builder itself lives in `joinforge-query`.

pub mod alias;
pub mod entity;
pub mod error;
pub mod fields;
pub mod naming;
pub mod projection;

// Re-export core traits and types
pub use alias::{table_alias, unique_alias};
pub use entity::{Entity, FieldDef, NotDeleted, SoftDelete};
pub use error::{QueryError, QueryResult};
pub use fields::FieldRef;
pub use naming::to_snake_case;
pub use projection::{Projection, ProjectionField};
