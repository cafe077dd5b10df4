//! The canonical query description shared by the OData and SQL renderers.

pub mod description;
pub mod error;
pub mod helpers;
pub mod node;

pub use description::*;
pub use error::Error;
pub use node::*;
