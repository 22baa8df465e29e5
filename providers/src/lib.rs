//! Provider adapters for the prompt optimization system
//!
//! One uniform `invoke` contract over distinct AI backends. Adapters never
//! retry; retry policy belongs to the caller.

pub mod registry;
pub mod services;
pub mod traits;
pub mod types;

pub use registry::ProviderRegistry;
pub use services::*;
pub use traits::*;
pub use types::*;
