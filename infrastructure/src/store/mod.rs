//! Message store adapters

pub mod jsonl;
pub mod memory;

pub use jsonl::JsonlMessageStore;
pub use memory::MemoryMessageStore;
