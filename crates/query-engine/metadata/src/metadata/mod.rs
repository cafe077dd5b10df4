//! Metadata information regarding the model types and the local store.

pub mod conversions;
pub mod entity;
pub mod naming;
pub mod store;
pub mod types;

// re-export without modules
pub use conversions::*;
pub use entity::*;
pub use naming::*;
pub use store::*;
pub use types::*;
