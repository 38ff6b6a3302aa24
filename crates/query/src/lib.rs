//! Programmatic multi-table SELECT composition
//!
//! Builds join queries from typed entity metadata: aliases are derived from
//! table names and kept statement-unique, join targets are configured
//! through transient child builders that merge back into the parent, select
//! lists resolve from explicit columns, projection types, or per-table
//! wildcards, and soft-delete predicates are injected automatically for
//! every participating table.

pub mod conditions;
pub mod meta;
pub mod query;

pub use conditions::{ConditionExpression, ParamBinder, SharedParams};
pub use meta::{global, qualify, AliasColumn, AliasRegistry};
pub use query::{JoinKey, JoinKind, JoinOn, JoinOperand, JoinPart, JoinQuery, SqlFunc, SqlFunction};

pub use joinforge_core::{
    table_alias, to_snake_case, unique_alias, Entity, FieldDef, FieldRef, NotDeleted, Projection,
    ProjectionField, QueryError, QueryResult, SoftDelete,
};
