//! Common types shared across the land-register print services.

pub mod error;
pub mod extent;

pub use error::{LandregError, LandregResult};
pub use extent::Extent;
