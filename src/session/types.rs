//! Types for cookie / session-storage continuity.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Cookies and session storage captured from the page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// `document.cookie` as reported by the page
    pub cookies: String,
    /// `sessionStorage` key/value pairs
    pub session: Map<String, Value>,
}

/// Message posted by the in-page sync script.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PageMessage {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub cookies: Value,
    #[serde(default)]
    pub session: Value,
}
