//! Application layer for courier
//!
//! This crate contains the use cases and port definitions of the dispatch
//! flow. It depends only on the domain layer; adapters for the ports live
//! in the infrastructure crate.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    agent_gateway::{AgentGateway, AgentReply, GatewayError},
    exchange_logger::{ExchangeEvent, ExchangeLogger, NoExchangeLogger},
    message_store::{MessageStore, StoreError},
    notification_channel::{ChannelError, Notification, NotificationChannel, NotificationStream},
};
pub use use_cases::dispatch_message::{
    DispatchError, DispatchMessageUseCase, DispatchOutcome, DispatchRequest,
};
pub use use_cases::front_desk::{ChatRequest, FrontDesk, FrontDeskError};
pub use use_cases::process_change_batch::{
    BatchReport, ChangeItem, ProcessChangeBatchUseCase,
};
pub use use_cases::submit_question::{SubmitError, SubmitQuestionInput, SubmitQuestionUseCase};
