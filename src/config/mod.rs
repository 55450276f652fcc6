//! Configuration module for themevars
//!
//! Provides types, discovery and loading for `themevars.toml`.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
