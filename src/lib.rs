// Cognate-set dispersion toolkit
// Library entry point; the binary in main.rs is a thin CLI over these modules

pub mod config;
pub mod error;
pub mod geodesy;
pub mod pipeline;
pub mod taxonomy;
pub mod tools;

pub use error::{Error, Result};
