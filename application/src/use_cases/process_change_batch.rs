//! Process Change Batch use case.
//!
//! Dispatcher variant driven by the store's change feed instead of a direct
//! call. Iterates a bounded batch of change items, dispatches each insert,
//! and reports failures per item so the invoking infrastructure retries
//! only the failed subset. Other items in the batch still succeed.

use crate::use_cases::dispatch_message::{DispatchMessageUseCase, DispatchRequest};
use tracing::{debug, warn};

/// One item from the store's change feed, already decoded from the wire
/// format by the infrastructure layer.
#[derive(Debug, Clone)]
pub enum ChangeItem {
    /// A new message record; carries everything dispatch needs.
    Insert {
        event_id: String,
        request: DispatchRequest,
    },
    /// A non-insert event (modify/remove). Dispatch ignores these.
    Skip { event_id: String },
    /// A record whose image could not be parsed. Counts as that item's
    /// failure; never aborts the batch.
    Invalid { event_id: String, error: String },
}

impl ChangeItem {
    pub fn event_id(&self) -> &str {
        match self {
            ChangeItem::Insert { event_id, .. }
            | ChangeItem::Skip { event_id }
            | ChangeItem::Invalid { event_id, .. } => event_id,
        }
    }
}

/// Per-item failure report for one processed batch.
///
/// `failures` holds the event ids of exactly the items that failed, in
/// batch order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub failures: Vec<String>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Use case for processing one change-feed batch.
pub struct ProcessChangeBatchUseCase {
    dispatch: DispatchMessageUseCase,
}

impl ProcessChangeBatchUseCase {
    pub fn new(dispatch: DispatchMessageUseCase) -> Self {
        Self { dispatch }
    }

    /// Dispatch every insert in the batch, isolating failures per item.
    pub async fn execute(&self, items: Vec<ChangeItem>) -> BatchReport {
        let mut report = BatchReport::default();

        for item in items {
            match item {
                ChangeItem::Insert { event_id, request } => {
                    let id = request.id.clone();
                    if let Err(e) = self.dispatch.execute(request).await {
                        warn!(event = %event_id, id = %id, error = %e, "Cannot process change record");
                        report.failures.push(event_id);
                    }
                }
                ChangeItem::Skip { event_id } => {
                    debug!(event = %event_id, "Skipping non-insert change record");
                }
                ChangeItem::Invalid { event_id, error } => {
                    warn!(event = %event_id, error = %error, "Malformed change record");
                    report.failures.push(event_id);
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::agent_gateway::GatewayError;
    use crate::ports::message_store::MessageStore;
    use crate::use_cases::test_support::{MemoryStoreFake, RecordingChannel, ScriptedGateway};
    use courier_domain::{Message, MessageId, Question, SessionId};
    use std::sync::Arc;

    fn insert(event: &str, id: &str, store: &MemoryStoreFake) -> ChangeItem {
        let message = Message::pending_with_id(
            MessageId::new(id),
            SessionId::new("s1"),
            Question::try_new(format!("question for {}", id)).unwrap(),
            None,
        );
        store.seed(message.clone());
        ChangeItem::Insert {
            event_id: event.to_string(),
            request: DispatchRequest::from(&message),
        }
    }

    #[tokio::test]
    async fn test_failed_item_is_isolated() {
        // Second of three gateway calls fails
        let gateway = Arc::new(ScriptedGateway::new(vec![
            ScriptedGateway::completion("a1", None),
            Err(GatewayError::RequestFailed("boom".to_string())),
            ScriptedGateway::completion("a3", None),
        ]));
        let store = Arc::new(MemoryStoreFake::new());
        let channel = Arc::new(RecordingChannel::new());
        let use_case = ProcessChangeBatchUseCase::new(DispatchMessageUseCase::new(
            gateway,
            store.clone(),
            channel.clone(),
        ));

        let items = vec![
            insert("ev1", "m1", &store),
            insert("ev2", "m2", &store),
            insert("ev3", "m3", &store),
        ];

        let report = use_case.execute(items).await;

        assert_eq!(report.failures, vec!["ev2".to_string()]);
        assert_eq!(channel.published_count(), 2);

        // The other records have their answers persisted
        let m1 = store.get(&MessageId::new("m1")).await.unwrap();
        assert_eq!(m1.answer.as_deref(), Some("a1"));
        let m2 = store.get(&MessageId::new("m2")).await.unwrap();
        assert!(m2.answer.is_none());
        let m3 = store.get(&MessageId::new("m3")).await.unwrap();
        assert_eq!(m3.answer.as_deref(), Some("a3"));
    }

    #[tokio::test]
    async fn test_non_insert_events_are_skipped() {
        let gateway = Arc::new(ScriptedGateway::new(vec![ScriptedGateway::completion(
            "a1", None,
        )]));
        let store = Arc::new(MemoryStoreFake::new());
        let channel = Arc::new(RecordingChannel::new());
        let use_case = ProcessChangeBatchUseCase::new(DispatchMessageUseCase::new(
            gateway.clone(),
            store.clone(),
            channel,
        ));

        let items = vec![
            ChangeItem::Skip {
                event_id: "ev1".to_string(),
            },
            insert("ev2", "m1", &store),
        ];

        let report = use_case.execute(items).await;

        assert!(report.is_clean());
        assert_eq!(gateway.invocations.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_record_counts_as_failure() {
        let gateway = Arc::new(ScriptedGateway::new(vec![]));
        let store = Arc::new(MemoryStoreFake::new());
        let channel = Arc::new(RecordingChannel::new());
        let use_case = ProcessChangeBatchUseCase::new(DispatchMessageUseCase::new(
            gateway,
            store,
            channel,
        ));

        let items = vec![ChangeItem::Invalid {
            event_id: "ev1".to_string(),
            error: "question is not set".to_string(),
        }];

        let report = use_case.execute(items).await;
        assert_eq!(report.failures, vec!["ev1".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_batch_is_clean() {
        let gateway = Arc::new(ScriptedGateway::new(vec![]));
        let store = Arc::new(MemoryStoreFake::new());
        let channel = Arc::new(RecordingChannel::new());
        let use_case = ProcessChangeBatchUseCase::new(DispatchMessageUseCase::new(
            gateway,
            store,
            channel,
        ));

        let report = use_case.execute(Vec::new()).await;
        assert!(report.is_clean());
    }
}
