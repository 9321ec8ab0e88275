//! Configuration loading

pub mod file_config;
pub mod loader;

pub use file_config::{
    AgentFileConfig, ChannelFileConfig, ClientFileConfig, FileConfig, StoreFileConfig,
};
pub use loader::ConfigLoader;
