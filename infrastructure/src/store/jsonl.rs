//! Append-only JSONL message store
//!
//! Durable [`MessageStore`] writing one JSON record per line: a `created`
//! record when a message is inserted and an `answered` record when the
//! dispatcher attaches the answer. State is rebuilt by replaying the file
//! on open, so the conditional-update semantics survive restarts.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use courier_application::ports::message_store::{MessageStore, StoreError};
use courier_domain::{Message, MessageId, SessionId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StoreRecord {
    Created { message: Message },
    Answered {
        id: MessageId,
        answer: String,
        at: DateTime<Utc>,
    },
}

struct Inner {
    messages: HashMap<MessageId, Message>,
    by_session: HashMap<SessionId, Vec<MessageId>>,
    writer: BufWriter<File>,
}

impl Inner {
    fn apply(&mut self, record: StoreRecord) {
        match record {
            StoreRecord::Created { message } => {
                self.by_session
                    .entry(message.session_id.clone())
                    .or_default()
                    .push(message.id.clone());
                self.messages.insert(message.id.clone(), message);
            }
            StoreRecord::Answered { id, answer, .. } => {
                if let Some(message) = self.messages.get_mut(&id) {
                    message.answer = Some(answer);
                }
            }
        }
    }

    fn append(&mut self, record: &StoreRecord) -> Result<(), StoreError> {
        let line = serde_json::to_string(record)
            .map_err(|e| StoreError::Backend(format!("cannot encode record: {}", e)))?;
        writeln!(self.writer, "{}", line)
            .and_then(|_| self.writer.flush())
            .map_err(|e| StoreError::Backend(format!("cannot append record: {}", e)))
    }
}

/// Durable JSONL-backed [`MessageStore`].
pub struct JsonlMessageStore {
    inner: Mutex<Inner>,
    path: PathBuf,
}

impl JsonlMessageStore {
    /// Open (or create) the store at `path`, replaying existing records.
    ///
    /// Creates parent directories if needed. Undecodable lines are skipped
    /// with a warning so one corrupt record does not brick the store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            return Err(StoreError::Backend(format!(
                "cannot create store directory {}: {}",
                parent.display(),
                e
            )));
        }

        let mut inner = Inner {
            messages: HashMap::new(),
            by_session: HashMap::new(),
            writer: BufWriter::new(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|e| {
                        StoreError::Backend(format!("cannot open {}: {}", path.display(), e))
                    })?,
            ),
        };

        let reader = File::open(path)
            .map_err(|e| StoreError::Backend(format!("cannot read {}: {}", path.display(), e)))?;
        for (lineno, line) in BufReader::new(reader).lines().enumerate() {
            let line =
                line.map_err(|e| StoreError::Backend(format!("cannot read line: {}", e)))?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<StoreRecord>(&line) {
                Ok(record) => inner.apply(record),
                Err(e) => {
                    warn!(path = %path.display(), line = lineno + 1, error = %e, "Skipping undecodable store record");
                }
            }
        }

        Ok(Self {
            inner: Mutex::new(inner),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))
    }
}

#[async_trait]
impl MessageStore for JsonlMessageStore {
    async fn create(&self, message: Message) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if inner.messages.contains_key(&message.id) {
            return Err(StoreError::AlreadyExists(message.id));
        }
        inner.append(&StoreRecord::Created {
            message: message.clone(),
        })?;
        inner.apply(StoreRecord::Created { message });
        Ok(())
    }

    async fn get(&self, id: &MessageId) -> Result<Message, StoreError> {
        self.lock()?
            .messages
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn update_answer(&self, id: &MessageId, answer: &str) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if !inner.messages.contains_key(id) {
            return Err(StoreError::NotFound(id.clone()));
        }
        let record = StoreRecord::Answered {
            id: id.clone(),
            answer: answer.to_string(),
            at: Utc::now(),
        };
        inner.append(&record)?;
        inner.apply(record);
        Ok(())
    }

    async fn list_by_session(&self, session_id: &SessionId) -> Result<Vec<Message>, StoreError> {
        let inner = self.lock()?;
        let ids = match inner.by_session.get(session_id) {
            Some(ids) => ids,
            None => return Ok(Vec::new()),
        };
        Ok(ids
            .iter()
            .filter_map(|id| inner.messages.get(id).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_domain::Question;

    fn message(id: &str, session: &str, question: &str) -> Message {
        Message::pending_with_id(
            MessageId::new(id),
            SessionId::new(session),
            Question::try_new(question).unwrap(),
            None,
        )
    }

    #[tokio::test]
    async fn test_replay_restores_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.jsonl");

        {
            let store = JsonlMessageStore::open(&path).unwrap();
            store.create(message("m1", "s1", "hello")).await.unwrap();
            store.create(message("m2", "s1", "more")).await.unwrap();
            store.update_answer(&MessageId::new("m1"), "hi").await.unwrap();
        }

        // Reopen and verify both the answer and the pending record survive
        let store = JsonlMessageStore::open(&path).unwrap();
        let m1 = store.get(&MessageId::new("m1")).await.unwrap();
        assert_eq!(m1.answer.as_deref(), Some("hi"));
        let m2 = store.get(&MessageId::new("m2")).await.unwrap();
        assert!(m2.answer.is_none());

        let messages = store.list_by_session(&SessionId::new("s1")).await.unwrap();
        assert_eq!(messages.len(), 2);
    }

    #[tokio::test]
    async fn test_conditional_update_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.jsonl");

        let store = JsonlMessageStore::open(&path).unwrap();
        let result = store.update_answer(&MessageId::new("ghost"), "hi").await;
        assert!(matches!(result.unwrap_err(), StoreError::NotFound(_)));
        drop(store);

        let store = JsonlMessageStore::open(&path).unwrap();
        assert!(store.get(&MessageId::new("ghost")).await.is_err());
    }

    #[tokio::test]
    async fn test_duplicate_create_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.jsonl");

        let store = JsonlMessageStore::open(&path).unwrap();
        store.create(message("m1", "s1", "hello")).await.unwrap();
        let result = store.create(message("m1", "s1", "again")).await;
        assert!(matches!(result.unwrap_err(), StoreError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_corrupt_line_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("messages.jsonl");

        {
            let store = JsonlMessageStore::open(&path).unwrap();
            store.create(message("m1", "s1", "hello")).await.unwrap();
        }
        {
            let mut file = OpenOptions::new().append(true).open(&path).unwrap();
            writeln!(file, "not json").unwrap();
        }

        let store = JsonlMessageStore::open(&path).unwrap();
        assert!(store.get(&MessageId::new("m1")).await.is_ok());
    }
}
