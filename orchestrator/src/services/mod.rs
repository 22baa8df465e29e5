//! Persistence implementations of `PromptStore`

pub mod jsonl_store;
pub mod memory_store;

#[cfg(test)]
pub mod tests;

pub use jsonl_store::JsonlStore;
pub use memory_store::MemoryStore;
