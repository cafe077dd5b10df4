//! Translate a table query built in memory into a target-independent query description.

pub mod builder;
pub mod expression;
pub mod query;
