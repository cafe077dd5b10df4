//! Render query descriptions as parameterized SQLite statements.

pub mod ast;
pub mod convert;
pub mod format;
pub mod helpers;
pub mod string;

pub use format::{format_count, format_delete, format_select, SqlQuery};
