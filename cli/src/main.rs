//! CLI entrypoint for Courier
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{bail, Result};
use clap::Parser;
use courier_application::use_cases::dispatch_message::{
    DispatchMessageUseCase, DispatchOutcome, DispatchRequest,
};
use courier_application::use_cases::front_desk::{ChatRequest, FrontDesk};
use courier_application::use_cases::submit_question::SubmitQuestionUseCase;
use courier_application::{
    AgentGateway, ExchangeLogger, MessageStore, NoExchangeLogger, NotificationChannel,
};
use courier_domain::SessionId;
use courier_infrastructure::{
    BroadcastChannel, ConfigLoader, FileConfig, JsonlExchangeLogger, JsonlMessageStore,
    MemoryMessageStore,
};
use courier_presentation::{ChatRepl, Cli, ConsoleFormatter, OutputFormat};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("Starting courier");

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())?
    };

    // === Dependency Injection ===
    let store: Arc<dyn MessageStore> = match &config.store.path {
        Some(path) => Arc::new(JsonlMessageStore::open(path)?),
        None => Arc::new(MemoryMessageStore::new()),
    };

    let channel: Arc<dyn NotificationChannel> =
        Arc::new(BroadcastChannel::with_capacity(config.channel.capacity));

    let gateway = build_gateway(&config).await?;

    let exchange_logger: Arc<dyn ExchangeLogger> = match &config.client.exchange_log {
        Some(path) => match JsonlExchangeLogger::new(path) {
            Some(logger) => Arc::new(logger),
            None => Arc::new(NoExchangeLogger),
        },
        None => Arc::new(NoExchangeLogger),
    };

    let submit = SubmitQuestionUseCase::new(store.clone())
        .with_exchange_logger(exchange_logger.clone());
    let dispatch = DispatchMessageUseCase::new(gateway, store.clone(), channel.clone())
        .with_topic(config.channel.topic.clone())
        .with_exchange_logger(exchange_logger);

    let answer_timeout = Duration::from_secs(config.client.answer_timeout_secs);

    // Chat mode
    if cli.chat {
        let repl = ChatRepl::new(
            submit,
            dispatch,
            channel,
            config.channel.topic.clone(),
            answer_timeout,
        )
        .with_progress(!cli.quiet);

        repl.run().await?;
        return Ok(());
    }

    let front_desk = FrontDesk::new(submit, store.clone());

    // Fetch mode - look up a stored message by id
    if let Some(message_id) = cli.get {
        let message = front_desk
            .handle(ChatRequest::GetAnswer { message_id })
            .await?;
        match cli.output {
            OutputFormat::Text => match &message.answer {
                Some(answer) => println!("{}", answer),
                None => println!("(no answer yet)"),
            },
            OutputFormat::Json => println!("{}", ConsoleFormatter::format_json(&message)),
        }
        return Ok(());
    }

    // Single question mode - question is required
    let question = match cli.question {
        Some(q) => q,
        None => bail!("Question is required. Use --chat for interactive mode."),
    };

    let session_id = cli
        .session
        .unwrap_or_else(|| SessionId::generate().to_string());

    let message = front_desk
        .handle(ChatRequest::Ask {
            question,
            session_id: session_id.clone(),
            memory_id: cli.memory,
        })
        .await?;
    let outcome = dispatch.execute(DispatchRequest::from(&message)).await?;

    match outcome {
        DispatchOutcome::Completed { answer, memory_id } => match cli.output {
            OutputFormat::Text => {
                println!("{}", answer);
                if !cli.quiet && let Some(token) = memory_id {
                    eprintln!();
                    eprintln!(
                        "Continue with: courier --session {} --memory {} \"...\"",
                        session_id, token
                    );
                }
            }
            OutputFormat::Json => {
                let stored = store.get(&message.id).await?;
                println!("{}", ConsoleFormatter::format_json(&stored));
            }
        },
        DispatchOutcome::Skipped => bail!("The agent returned no content"),
    }

    Ok(())
}

#[cfg(feature = "bedrock")]
async fn build_gateway(config: &FileConfig) -> Result<Arc<dyn AgentGateway>> {
    let gateway = courier_infrastructure::BedrockAgentGateway::new(&config.agent).await?;
    Ok(Arc::new(gateway))
}

#[cfg(not(feature = "bedrock"))]
async fn build_gateway(_config: &FileConfig) -> Result<Arc<dyn AgentGateway>> {
    bail!("courier was built without the `bedrock` feature; no agent gateway is available")
}
