//! Session continuity: persist and rehydrate cookies and session storage.
//!
//! Runs beside the guard and shares its storage substrate. All writes are
//! best-effort and never delay a navigation decision.

use crate::session::scripts::hydration_script;
use crate::session::types::{PageMessage, SessionSnapshot};
use crate::storage::{keys, KeyValueStore, StoreOp};
use serde_json::{Map, Value};

/// Message type posted by the sync script.
const STORAGE_SYNC: &str = "storageSync";

/// Current snapshot plus the script derived from it.
#[derive(Debug, Clone)]
pub struct SessionContinuity {
    snapshot: SessionSnapshot,
    script: String,
}

impl Default for SessionContinuity {
    fn default() -> Self {
        Self::from_snapshot(SessionSnapshot::default())
    }
}

impl SessionContinuity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: SessionSnapshot) -> Self {
        let script = hydration_script(&snapshot);
        Self { snapshot, script }
    }

    /// Read the persisted snapshot. Missing cookies read as empty, a missing
    /// or malformed session blob reads as an empty object.
    pub async fn load_persisted(store: &dyn KeyValueStore) -> SessionSnapshot {
        let values = match store.multi_get(&[keys::COOKIES, keys::SESSION]).await {
            Ok(values) => values,
            Err(e) => {
                tracing::warn!("Ignoring failed session restore: {}", e);
                return SessionSnapshot::default();
            }
        };
        let mut values = values.into_iter();
        let cookies = values.next().flatten().unwrap_or_default();
        let session = values
            .next()
            .flatten()
            .map(|raw| decode_session(&raw))
            .unwrap_or_default();
        SessionSnapshot { cookies, session }
    }

    /// Replace the snapshot (boot restore). Returns the new hydration script.
    pub fn restore(&mut self, snapshot: SessionSnapshot) -> &str {
        *self = Self::from_snapshot(snapshot);
        &self.script
    }

    /// Handle a message posted from the page. Returns the writes to persist
    /// when it was a storage sync; anything else is ignored.
    pub fn handle_message(&mut self, data: &str) -> Option<Vec<StoreOp>> {
        let snapshot = parse_sync_message(data)?;
        let session_json = Value::Object(snapshot.session.clone()).to_string();
        let writes = vec![
            StoreOp::set(keys::COOKIES, snapshot.cookies.clone()),
            StoreOp::set(keys::SESSION, session_json),
        ];
        *self = Self::from_snapshot(snapshot);
        Some(writes)
    }

    pub fn snapshot(&self) -> &SessionSnapshot {
        &self.snapshot
    }

    /// Script to run before content loads on every navigation.
    pub fn hydration_script(&self) -> &str {
        &self.script
    }
}

/// Parse a `storageSync` message. Non-string cookies read as empty and a
/// non-object session as `{}`; other message types and bad JSON yield `None`.
pub fn parse_sync_message(data: &str) -> Option<SessionSnapshot> {
    let value = match serde_json::from_str::<Value>(data) {
        Ok(value @ Value::Object(_)) => value,
        Ok(_) => return None,
        Err(e) => {
            tracing::debug!("Ignoring malformed page message: {}", e);
            return None;
        }
    };
    let message: PageMessage = match serde_json::from_value(value) {
        Ok(message) => message,
        Err(e) => {
            tracing::debug!("Ignoring malformed page message: {}", e);
            return None;
        }
    };
    if message.kind.as_deref() != Some(STORAGE_SYNC) {
        return None;
    }
    let cookies = match message.cookies {
        Value::String(s) => s,
        _ => String::new(),
    };
    let session = match message.session {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    Some(SessionSnapshot { cookies, session })
}

fn decode_session(raw: &str) -> Map<String, Value> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        _ => {
            tracing::warn!("Ignoring malformed persisted session storage");
            Map::new()
        }
    }
}
