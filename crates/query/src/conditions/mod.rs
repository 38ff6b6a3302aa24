//! Query conditions and parameter binding

pub mod expression;
pub mod params;

pub use expression::ConditionExpression;
pub use params::{shared, ParamBinder, SharedParams};
