//! JSON-lines bridge protocol.
//!
//! The host writes one `ShellEvent` per line on the shell's stdin; the shell
//! answers with one `ShellCommand` per line. A line that cannot be decoded is
//! answered with an error line and otherwise skipped:
//!
//! ```json
//! {"type":"error","message":"Invalid event JSON: ...","line":"{oops"}
//! ```

use crate::shell::events::{ShellCommand, ShellEvent};
use serde::Serialize;

/// Longest echo of a rejected line kept in the error reply.
const MAX_ECHO: usize = 200;

/// Error reply for an undecodable inbound line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProtocolError {
    #[serde(rename = "type")]
    kind: &'static str,
    pub message: String,
    pub line: String,
}

impl ProtocolError {
    pub fn new(message: impl Into<String>, line: &str) -> Self {
        Self {
            kind: "error",
            message: message.into(),
            line: truncate_echo(line),
        }
    }
}

/// Decode one inbound line. Blank lines yield `Ok(None)`.
pub fn decode_event(line: &str) -> Result<Option<ShellEvent>, ProtocolError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|e| ProtocolError::new(format!("Invalid event JSON: {}", e), trimmed))
}

/// Encode a command as one line (no trailing newline).
pub fn encode_command(command: &ShellCommand) -> serde_json::Result<String> {
    serde_json::to_string(command)
}

/// Encode an error reply as one line (no trailing newline).
pub fn encode_error(error: &ProtocolError) -> serde_json::Result<String> {
    serde_json::to_string(error)
}

fn truncate_echo(line: &str) -> String {
    if line.len() <= MAX_ECHO {
        return line.to_string();
    }
    let mut end = MAX_ECHO;
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &line[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_decode_event_line() {
        let event = decode_event(r#"{"type":"go_home"}"#).unwrap();
        assert_eq!(event, Some(ShellEvent::GoHome));
        assert_eq!(decode_event("   \n").unwrap(), None);
    }

    #[test]
    fn test_malformed_line_becomes_error_reply() {
        let err = decode_event("{oops").unwrap_err();
        let value: Value = serde_json::from_str(&encode_error(&err).unwrap()).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["line"], "{oops");
        assert!(value["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid event JSON"));
    }

    #[test]
    fn test_long_lines_are_truncated_in_echo() {
        let long = "é".repeat(300);
        let err = ProtocolError::new("bad", &long);
        assert!(err.line.ends_with("..."));
        assert!(err.line.len() <= MAX_ECHO + 3);
    }

    #[test]
    fn test_encode_command_line() {
        let line = encode_command(&ShellCommand::Load {
            url: "https://ok.test".to_string(),
        })
        .unwrap();
        assert!(!line.contains('\n'));
        assert_eq!(
            serde_json::from_str::<Value>(&line).unwrap(),
            json!({"type": "load", "url": "https://ok.test"})
        );
    }
}
