//! Provider adapter implementations

pub mod anthropic;
pub mod api_keys;
pub mod gemini;
pub mod http;
pub mod openai;
pub mod random;

#[cfg(test)]
pub mod tests;

pub use anthropic::*;
pub use api_keys::*;
pub use gemini::*;
pub use openai::*;
pub use random::*;
