//! Agent gateway providers

#[cfg(feature = "bedrock")]
pub mod bedrock;
