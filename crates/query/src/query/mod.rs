//! Join-query construction: typed builder, core state, join edges,
//! select-list resolution, and statement assembly

pub mod builder;
pub mod core;
pub mod join_part;
pub mod select;
pub mod sql;

pub use builder::{JoinKey, JoinQuery};
pub use join_part::{JoinKind, JoinOn, JoinOperand, JoinPart};
pub use select::{SqlFunc, SqlFunction};
