//! Render query descriptions as OData query strings, and parse them back.

pub mod error;
pub mod parse;
pub mod render;
pub mod values;

pub use error::Error;
pub use parse::{parse_filter, parse_query};
pub use render::{to_odata, ODataQuery};
