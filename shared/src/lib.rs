//! Shared types for the prompt optimization system
//!
//! Contains the wire types every crate agrees on: provider and output
//! identifiers, the optimization request and result, rating messages and the
//! provider failure taxonomy.

pub mod errors;
pub mod logging;
pub mod messages;
pub mod types;

pub use errors::*;
pub use messages::*;
pub use types::*;
