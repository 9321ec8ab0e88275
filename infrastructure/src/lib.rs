//! Infrastructure layer for courier
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer, plus configuration file loading and the change-feed
//! wire format.

pub mod changes;
pub mod channel;
pub mod config;
pub mod logging;
pub mod providers;
pub mod store;

// Re-export commonly used types
pub use changes::{decode_batch, ChangeParseError};
pub use channel::BroadcastChannel;
pub use config::{ConfigLoader, FileConfig};
pub use logging::JsonlExchangeLogger;
pub use store::{JsonlMessageStore, MemoryMessageStore};

#[cfg(feature = "bedrock")]
pub use providers::bedrock::BedrockAgentGateway;
