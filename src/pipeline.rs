//! Provisioning Pipeline
//!
//! `descriptors -> mapper -> (data-sources.json, credentials-config.json)`
//!
//! [`provision`] is pure apart from drawing the IV. [`ProvisionOutput::write_to`]
//! writes the two files into an existing directory, registry first. There is
//! no all-or-nothing guarantee across the two files.

use std::fs;
use std::path::{Path, PathBuf};

use crate::credentials::encrypt_credentials;
use crate::descriptor::{parse_descriptors, ConnectionDescriptor};
use crate::error::{ProvisionError, Result};
use crate::mapper::{map_descriptors, Diagnostic};
use crate::output::{ConnectionSummary, ProvisionSummary};

/// File name of the plaintext connection registry
pub const DATA_SOURCES_FILE: &str = "data-sources.json";

/// File name of the encrypted credential registry
pub const CREDENTIALS_FILE: &str = "credentials-config.json";

/// Rendered output of one pipeline run
#[derive(Debug, Clone)]
pub struct ProvisionOutput {
    /// `data-sources.json` contents
    pub data_sources: String,

    /// `credentials-config.json` contents (`IV || ciphertext`)
    pub credentials: Vec<u8>,

    pub diagnostics: Vec<Diagnostic>,

    pub summary: ProvisionSummary,
}

/// Run the pipeline over parsed descriptors
///
/// Serialization or encryption failures abort the whole run.
pub fn provision(descriptors: &[ConnectionDescriptor]) -> Result<ProvisionOutput> {
    let mapping = map_descriptors(descriptors);

    let data_sources = mapping.data_sources.to_json_pretty()?;
    let credentials = encrypt_credentials(&mapping.credentials)?;

    Ok(ProvisionOutput {
        data_sources,
        credentials,
        diagnostics: mapping.diagnostics,
        summary: summarize(descriptors),
    })
}

/// Parse the serialized descriptor list and run the pipeline
pub fn provision_json(text: &str) -> Result<ProvisionOutput> {
    let descriptors = parse_descriptors(text)?;
    provision(&descriptors)
}

impl ProvisionOutput {
    /// Write both files into `dir`, which must already exist
    ///
    /// Returns the paths written, registry first.
    pub fn write_to(&self, dir: &Path) -> Result<(PathBuf, PathBuf)> {
        let data_sources_path = dir.join(DATA_SOURCES_FILE);
        write_file(&data_sources_path, self.data_sources.as_bytes())?;

        let credentials_path = dir.join(CREDENTIALS_FILE);
        write_file(&credentials_path, &self.credentials)?;

        Ok((data_sources_path, credentials_path))
    }
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    fs::write(path, contents)
        .map_err(|e| ProvisionError::io_error(path.display().to_string(), e.to_string()))?;
    tracing::info!(path = %path.display(), bytes = contents.len(), "Wrote file");
    Ok(())
}

/// One summary line per input descriptor, duplicates included
fn summarize(descriptors: &[ConnectionDescriptor]) -> ProvisionSummary {
    ProvisionSummary {
        connection_count: descriptors.len(),
        connections: descriptors
            .iter()
            .map(|d| ConnectionSummary {
                name: d.name.clone(),
                ssh_host: d.ssh.as_ref().map(|ssh| ssh.host.clone()),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::IV_SIZE;
    use pretty_assertions::assert_eq;

    const INPUT: &str = r#"[
        {"name":"A","driver":"mysql8","host":"h","port":"3306","user":"u","password":"p"},
        {"name":"B","driver":"mariaDB","host":"h","port":3307,"ssh":{"host":"jump"}}
    ]"#;

    #[test]
    fn test_provision_json() {
        let output = provision_json(INPUT).unwrap();

        let doc: serde_json::Value = serde_json::from_str(&output.data_sources).unwrap();
        assert_eq!(doc["connections"].as_object().unwrap().len(), 2);
        assert!(output.credentials.len() > IV_SIZE);
        assert_eq!((output.credentials.len() - IV_SIZE) % 16, 0);
        assert!(output.diagnostics.is_empty());
    }

    #[test]
    fn test_summary() {
        let output = provision_json(INPUT).unwrap();
        assert_eq!(output.summary.connection_count, 2);
        assert_eq!(output.summary.connections[0].ssh_host, None);
        assert_eq!(output.summary.connections[1].ssh_host.as_deref(), Some("jump"));
    }

    #[test]
    fn test_summary_counts_duplicates() {
        let output =
            provision_json(r#"[{"name":"x","driver":"mysql8"},{"name":"X","driver":"mysql8"}]"#)
                .unwrap();
        assert_eq!(output.summary.connection_count, 2);
        let doc: serde_json::Value = serde_json::from_str(&output.data_sources).unwrap();
        assert_eq!(doc["connections"].as_object().unwrap().len(), 1);
    }

    #[test]
    fn test_malformed_input_fails() {
        assert!(matches!(provision_json("not json"), Err(ProvisionError::InvalidInput(_))));
        assert!(matches!(provision_json("{}"), Err(ProvisionError::InvalidInput(_))));
    }

    #[test]
    fn test_write_to() {
        let dir = tempfile::tempdir().unwrap();
        let output = provision_json(INPUT).unwrap();

        let (registry, credentials) = output.write_to(dir.path()).unwrap();
        assert_eq!(registry, dir.path().join(DATA_SOURCES_FILE));
        assert_eq!(fs::read_to_string(&registry).unwrap(), output.data_sources);
        assert_eq!(fs::read(&credentials).unwrap(), output.credentials);
    }

    #[test]
    fn test_write_to_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let output = provision_json("[]").unwrap();

        let err = output.write_to(&missing).unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
        assert!(err.message().contains(DATA_SOURCES_FILE));
    }
}
