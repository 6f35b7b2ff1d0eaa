//! # leadbook-core
//!
//! Core types, traits, and abstractions for the leadbook service.
//!
//! This crate provides the foundational data structures and trait definitions
//! that other leadbook crates depend on.

pub mod defaults;
pub mod error;
pub mod models;
pub mod security;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use security::{LeadAction, NotePermissions, SecurityService};
pub use traits::*;
