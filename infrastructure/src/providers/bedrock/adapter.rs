//! Bedrock agent gateway adapter
//!
//! Wraps the Bedrock Agent Runtime `InvokeAgent` call to implement the
//! [`AgentGateway`] trait. The agent replies as a stream of completion
//! chunks; the adapter drains the whole stream into one answer string
//! before returning, so callers only ever see the final text.

use crate::config::AgentFileConfig;
use async_trait::async_trait;
use aws_sdk_bedrockagentruntime::operation::invoke_agent::InvokeAgentError;
use aws_sdk_bedrockagentruntime::types::ResponseStream;
use aws_sdk_bedrockagentruntime::Client as AgentRuntimeClient;
use courier_application::ports::agent_gateway::{AgentGateway, AgentReply, GatewayError};
use courier_domain::{MemoryId, SessionId};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

pub struct BedrockAgentGateway {
    client: Arc<AgentRuntimeClient>,
    agent_id: String,
    alias_id: String,
    timeout: Duration,
}

impl BedrockAgentGateway {
    /// Create a new Bedrock agent gateway.
    ///
    /// Initializes AWS credentials and creates an Agent Runtime client.
    /// Fails if the agent or alias id is not configured.
    pub async fn new(config: &AgentFileConfig) -> Result<Self, GatewayError> {
        if config.agent_id.trim().is_empty() {
            return Err(GatewayError::Other("agent_id is not configured".to_string()));
        }
        if config.alias_id.trim().is_empty() {
            return Err(GatewayError::Other("alias_id is not configured".to_string()));
        }

        let mut aws_config_loader = aws_config::defaults(aws_config::BehaviorVersion::latest());

        if let Some(ref region) = config.region {
            aws_config_loader = aws_config_loader.region(aws_config::Region::new(region.clone()));
        }
        if let Some(ref profile) = config.profile {
            aws_config_loader = aws_config_loader.profile_name(profile);
        }

        let aws_config = aws_config_loader.load().await;
        let client = AgentRuntimeClient::new(&aws_config);

        info!(agent = %config.agent_id, alias = %config.alias_id, "Bedrock agent gateway initialized");

        Ok(Self {
            client: Arc::new(client),
            agent_id: config.agent_id.clone(),
            alias_id: config.alias_id.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    async fn invoke_once(
        &self,
        question: &str,
        session_id: &SessionId,
        memory_id: Option<&MemoryId>,
    ) -> Result<AgentReply, GatewayError> {
        debug!(
            session = %session_id,
            memory = memory_id.map(|m| m.as_str()).unwrap_or("-"),
            "Calling Bedrock InvokeAgent"
        );

        let response = self
            .client
            .invoke_agent()
            .agent_id(&self.agent_id)
            .agent_alias_id(&self.alias_id)
            .session_id(session_id.as_str())
            .set_memory_id(memory_id.map(|m| m.as_str().to_string()))
            .input_text(question)
            .send()
            .await
            .map_err(|e| convert_invoke_error(&e))?;

        let memory_id = response.memory_id().map(MemoryId::new);

        // The completion arrives as an event stream; concatenate every
        // chunk into the final answer.
        let mut completion = response.completion;
        let mut answer = String::new();
        loop {
            let event = completion.recv().await.map_err(|e| {
                GatewayError::RequestFailed(format!("completion stream error: {}", e))
            })?;
            match event {
                Some(ResponseStream::Chunk(part)) => {
                    if let Some(bytes) = part.bytes() {
                        answer.push_str(&String::from_utf8_lossy(bytes.as_ref()));
                    }
                }
                // Trace and control events are not part of the answer
                Some(_) => {}
                None => break,
            }
        }

        if answer.is_empty() {
            warn!(session = %session_id, "Agent completion was empty");
            return Ok(AgentReply::Empty { memory_id });
        }

        Ok(AgentReply::Completion { answer, memory_id })
    }
}

fn convert_invoke_error(
    err: &aws_sdk_bedrockagentruntime::error::SdkError<InvokeAgentError>,
) -> GatewayError {
    match err {
        aws_sdk_bedrockagentruntime::error::SdkError::ServiceError(service_err) => {
            match service_err.err() {
                InvokeAgentError::ThrottlingException(e) => {
                    GatewayError::RequestFailed(format!("agent throttled: {}", e))
                }
                InvokeAgentError::ValidationException(e) => {
                    GatewayError::RequestFailed(format!("agent validation error: {}", e))
                }
                InvokeAgentError::ResourceNotFoundException(e) => {
                    GatewayError::RequestFailed(format!("agent not found: {}", e))
                }
                other => GatewayError::RequestFailed(format!("agent error: {:?}", other)),
            }
        }
        other => GatewayError::ConnectionError(format!("SDK error: {}", other)),
    }
}

#[async_trait]
impl AgentGateway for BedrockAgentGateway {
    async fn invoke(
        &self,
        question: &str,
        session_id: &SessionId,
        memory_id: Option<&MemoryId>,
    ) -> Result<AgentReply, GatewayError> {
        match timeout(self.timeout, self.invoke_once(question, session_id, memory_id)).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Timeout),
        }
    }
}
