//! Common test utilities and infrastructure
//!
//! Fixtures hold canned requests and adapter answers, helpers build
//! orchestrators over mock or in-process components.

pub mod fixtures;
pub mod helpers;

pub use fixtures::TestFixtures;
pub use helpers::{OrchestratorBuilder, TestHelpers};
