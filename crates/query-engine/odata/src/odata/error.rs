//! Errors for OData rendering and parsing.

use thiserror::Error;

/// A type for OData errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("{0} cannot be expressed in an OData query.")]
    UnsupportedRenderTarget(String),
    #[error("Syntax error at position {position}: {message}.")]
    Parse { message: String, position: usize },
    #[error("Invalid value '{value}' for query option '{option}'.")]
    InvalidQueryOption { option: String, value: String },
    #[error(transparent)]
    Ast(#[from] query_engine_ast::ast::Error),
}
