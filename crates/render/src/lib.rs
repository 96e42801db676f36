mod assets;
pub mod error;
mod index;

pub use crate::index::{IndexPage, UNKNOWN_VERSION};
