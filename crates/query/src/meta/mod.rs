//! Entity metadata caching

pub mod registry;

pub use registry::{global, qualify, AliasColumn, AliasRegistry};
