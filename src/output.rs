//! Run Reporting
//!
//! What the binary prints to stdout after a run, in one of two forms:
//! - Text (default): a count line followed by one line per connection
//! - JSON (`--json`): a success or error envelope
//!
//! # Output Contract
//! - Success: `{"ok": true, "command": "...", "data": {...}, "meta": {...}}`
//! - Error: `{"ok": false, "command": "...", "error": {"code": "...", "message": "..."}}`

use serde::{Deserialize, Serialize};

use crate::error::ProvisionError;
use crate::mapper::Diagnostic;

/// Per-run summary, one line per input descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProvisionSummary {
    /// Number of descriptors processed (duplicates included)
    pub connection_count: usize,
    pub connections: Vec<ConnectionSummary>,
}

/// Name and SSH target of one descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_host: Option<String>,
}

impl std::fmt::Display for ProvisionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "  {} connection(s) configured.", self.connection_count)?;
        for conn in &self.connections {
            write!(f, "\n    - {}", conn.name)?;
            if let Some(host) = &conn.ssh_host {
                write!(f, " (SSH \u{2192} {host})")?;
            }
        }
        Ok(())
    }
}

/// `data` payload of a successful `provision` envelope
#[derive(Debug, Clone, Serialize)]
pub struct ProvisionReport {
    #[serde(flatten)]
    pub summary: ProvisionSummary,

    /// Paths written, registry first
    pub files: Vec<String>,

    pub diagnostics: Vec<Diagnostic>,
}

/// Success envelope for operation results
#[derive(Debug, Clone, Serialize)]
pub struct SuccessEnvelope<T> {
    /// Always true for success envelopes
    pub ok: bool,

    pub command: String,

    pub data: T,

    pub meta: Metadata,
}

impl<T> SuccessEnvelope<T> {
    pub fn new(command: impl Into<String>, data: T, meta: Metadata) -> Self {
        Self {
            ok: true,
            command: command.into(),
            data,
            meta,
        }
    }
}

/// Error envelope for operation failures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Always false for error envelopes
    pub ok: bool,

    pub command: String,

    pub error: ErrorInfo,
}

impl ErrorEnvelope {
    pub fn new(command: impl Into<String>, error: ErrorInfo) -> Self {
        Self {
            ok: false,
            command: command.into(),
            error,
        }
    }

    /// Create error envelope from a `ProvisionError`
    pub fn from_error(command: impl Into<String>, err: &ProvisionError) -> Self {
        Self::new(command, ErrorInfo::new(err.error_code(), err.message()))
    }
}

/// Error information structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable error code (e.g., "INVALID_INPUT", "CONFIG_ERROR")
    pub code: String,

    /// Human-readable error message (no credential material)
    pub message: String,
}

impl ErrorInfo {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Execution metadata included in all success responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    /// Execution time in milliseconds
    pub execution_ms: u64,
}

impl Metadata {
    pub fn new(execution_ms: u64) -> Self {
        Self { execution_ms }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn summary() -> ProvisionSummary {
        ProvisionSummary {
            connection_count: 2,
            connections: vec![
                ConnectionSummary {
                    name: "My DB".to_string(),
                    ssh_host: None,
                },
                ConnectionSummary {
                    name: "Other".to_string(),
                    ssh_host: Some("sshhost".to_string()),
                },
            ],
        }
    }

    #[test]
    fn test_summary_text() {
        assert_eq!(
            summary().to_string(),
            "  2 connection(s) configured.\n    - My DB\n    - Other (SSH \u{2192} sshhost)"
        );
    }

    #[test]
    fn test_empty_summary_text() {
        assert_eq!(ProvisionSummary::default().to_string(), "  0 connection(s) configured.");
    }

    #[test]
    fn test_success_envelope_serialization() {
        let report = ProvisionReport {
            summary: summary(),
            files: vec!["/out/data-sources.json".to_string()],
            diagnostics: vec![Diagnostic::MissingName { index: 1 }],
        };
        let envelope = SuccessEnvelope::new("provision", report, Metadata::new(42));

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["ok"], true);
        assert_eq!(value["command"], "provision");
        assert_eq!(value["data"]["connection_count"], 2);
        assert_eq!(value["data"]["connections"][1]["ssh_host"], "sshhost");
        assert!(value["data"]["connections"][0].get("ssh_host").is_none());
        assert_eq!(value["data"]["diagnostics"][0]["kind"], "missing_name");
        assert_eq!(value["meta"]["execution_ms"], 42);
    }

    #[test]
    fn test_error_envelope_from_provision_error() {
        let err = ProvisionError::config_error("DBEAVER_DIR is not set");
        let envelope = ErrorEnvelope::from_error("provision", &err);

        assert!(!envelope.ok);
        assert_eq!(envelope.command, "provision");
        assert_eq!(envelope.error.code, "CONFIG_ERROR");
        assert!(envelope.error.message.contains("DBEAVER_DIR"));

        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains(r#""ok":false"#));
        assert!(json.contains(r#""code":"CONFIG_ERROR""#));
    }
}
