//! Change record decoding

use courier_application::use_cases::dispatch_message::DispatchRequest;
use courier_application::use_cases::process_change_batch::ChangeItem;
use courier_domain::{MemoryId, MessageId, Question, SessionId};
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised while recovering a dispatch request from a record image.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChangeParseError {
    #[error("{0} is not set")]
    MissingAttribute(&'static str),

    #[error("question is empty")]
    EmptyQuestion,
}

/// A typed attribute in a change record image. Only string attributes are
/// meaningful to the dispatch flow.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Attribute {
    #[serde(rename = "S")]
    pub s: Option<String>,
}

/// One record from the change feed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    pub event_id: String,
    pub event_name: String,
    #[serde(default)]
    pub keys: HashMap<String, Attribute>,
    #[serde(default)]
    pub new_image: HashMap<String, Attribute>,
}

/// A batch of change records, as delivered by the trigger.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeBatchEvent {
    #[serde(default)]
    pub records: Vec<ChangeRecord>,
}

impl ChangeRecord {
    fn string_attr(
        map: &HashMap<String, Attribute>,
        name: &'static str,
    ) -> Result<String, ChangeParseError> {
        map.get(name)
            .and_then(|attr| attr.s.clone())
            .filter(|value| !value.trim().is_empty())
            .ok_or(ChangeParseError::MissingAttribute(name))
    }

    /// Recover the dispatch request carried by an insert record.
    ///
    /// The memory attribute is optional: absent or blank on a session's
    /// first exchange.
    pub fn dispatch_request(&self) -> Result<DispatchRequest, ChangeParseError> {
        let id = Self::string_attr(&self.keys, "id")?;
        let question = Self::string_attr(&self.new_image, "question")?;
        let question = Question::try_new(question).ok_or(ChangeParseError::EmptyQuestion)?;
        let session_id = Self::string_attr(&self.new_image, "sessionId")?;
        let memory_id = self
            .new_image
            .get("memoryId")
            .and_then(|attr| attr.s.clone())
            .filter(|value| !value.trim().is_empty())
            .map(MemoryId::new);

        Ok(DispatchRequest {
            id: MessageId::new(id),
            question,
            session_id: SessionId::new(session_id),
            memory_id,
        })
    }

    pub fn is_insert(&self) -> bool {
        self.event_name == "INSERT"
    }
}

/// Decode one record into a [`ChangeItem`].
pub fn decode_record(record: &ChangeRecord) -> ChangeItem {
    if !record.is_insert() {
        return ChangeItem::Skip {
            event_id: record.event_id.clone(),
        };
    }
    match record.dispatch_request() {
        Ok(request) => ChangeItem::Insert {
            event_id: record.event_id.clone(),
            request,
        },
        Err(e) => ChangeItem::Invalid {
            event_id: record.event_id.clone(),
            error: e.to_string(),
        },
    }
}

/// Decode a whole batch event.
pub fn decode_batch(event: &ChangeBatchEvent) -> Vec<ChangeItem> {
    event.records.iter().map(decode_record).collect()
}
