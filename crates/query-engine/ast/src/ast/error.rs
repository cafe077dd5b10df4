//! Errors raised while building a query description.

use thiserror::Error;

/// A type for AST construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("The '{operator}' operator expects {expected} operand(s), but {actual} were given.")]
    Arity {
        operator: String,
        expected: usize,
        actual: usize,
    },
    #[error("The children of the '{0}' node have already been assigned.")]
    FrozenNode(String),
    #[error("'{0}' is not a valid table name.")]
    InvalidTableName(String),
    #[error("'{0}' is not a valid query parameter name.")]
    InvalidParameterName(String),
}
