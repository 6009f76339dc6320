//! In-memory conversation log, one capped record list per session.
//!
//! Each record is one request/response exchange. Records beyond the cap are
//! dropped oldest-first. The history replayed to the router is the most
//! recent `history_window` records, each expanded into a user turn and an
//! assistant turn.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use serde::Serialize;

use crate::router::Message;

/// One logged exchange.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationRecord {
    pub user_id: String,
    pub timestamp: String,
    pub request: String,
    pub response: String,
}

pub struct SessionStore {
    max_records: usize,
    history_window: usize,
    sessions: Mutex<HashMap<String, VecDeque<ConversationRecord>>>,
}

impl SessionStore {
    pub fn new(max_records: usize, history_window: usize) -> Self {
        Self {
            max_records: max_records.max(1),
            history_window,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, VecDeque<ConversationRecord>>> {
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append a record and return the session's record count afterwards.
    pub fn append(&self, session_id: &str, record: ConversationRecord) -> usize {
        let mut sessions = self.lock();
        let records = sessions.entry(session_id.to_string()).or_default();
        records.push_back(record);
        while records.len() > self.max_records {
            records.pop_front();
        }
        records.len()
    }

    /// Prior turns for the next request in `session_id`. Empty for an unknown
    /// session.
    pub fn history(&self, session_id: &str) -> Vec<Message> {
        let sessions = self.lock();
        let Some(records) = sessions.get(session_id) else {
            return Vec::new();
        };
        let skip = records.len().saturating_sub(self.history_window);
        records
            .iter()
            .skip(skip)
            .flat_map(|r| [Message::user(r.request.clone()), Message::assistant(r.response.clone())])
            .collect()
    }

    /// All stored records for `session_id`, or `None` if it was never seen.
    pub fn records(&self, session_id: &str) -> Option<Vec<ConversationRecord>> {
        self.lock().get(session_id).map(|r| r.iter().cloned().collect())
    }

    pub fn record_count(&self, session_id: &str) -> usize {
        self.lock().get(session_id).map_or(0, VecDeque::len)
    }
}
