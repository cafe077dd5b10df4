//! Errors for query translation.

use thiserror::Error;

/// A type for translation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("'{0}' clause in query expression is not supported.")]
    UnsupportedOperation(String),
    #[error("Invalid predicate: {0}.")]
    InvalidPredicate(String),
    #[error("Invalid argument: {0}.")]
    InvalidArgument(String),
    #[error(transparent)]
    Ast(#[from] query_engine_ast::ast::Error),
}
