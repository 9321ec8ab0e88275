//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod agent_gateway;
pub mod exchange_logger;
pub mod message_store;
pub mod notification_channel;
