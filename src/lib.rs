//! dbeaver-provision - DBeaver Workspace Provisioning
//!
//! Converts a list of database connection descriptors into the two files
//! DBeaver reads its connections from:
//! - `data-sources.json`: plaintext connection registry (hosts, URLs, SSH tunnels)
//! - `credentials-config.json`: credential registry, AES-192-CBC encrypted with
//!   DBeaver's built-in key
//!
//! # Core Principles
//! - One pass, no retained state between runs
//! - Deterministic registry output (identical inputs → identical `data-sources.json`)
//! - Permissive mapping: unknown drivers and duplicate ids are diagnostics, not errors
//!
//! # Module Organization
//! - [`error`] - Error types and handling
//! - [`descriptor`] - Input descriptor types and parsing
//! - [`derive`] - Connection ids, providers, JDBC URLs, `~/` expansion
//! - [`registry`] - `data-sources.json` document types
//! - [`credentials`] - Credential registry and encryption
//! - [`mapper`] - Descriptor → documents mapping
//! - [`pipeline`] - End-to-end run and file output
//! - [`config`] - Run settings (CLI flags / environment)
//! - [`output`] - Run report and JSON envelopes
//! - [`logging`] - tracing subscriber setup

pub mod config;
pub mod credentials;
pub mod derive;
pub mod descriptor;
pub mod error;
pub mod logging;
pub mod mapper;
pub mod output;
pub mod pipeline;
pub mod registry;

// Re-export commonly used types for convenience
pub use config::Settings;
pub use credentials::{encrypt, encrypt_credentials, CredentialRegistry, CREDENTIALS_KEY, IV_SIZE};
pub use derive::{build_connection_url, derive_id, expand_home, resolve_provider, slugify};
pub use derive::{ConnectionId, Provider};
pub use descriptor::{parse_descriptors, AuthType, ConnectionDescriptor, Driver, SshTunnel};
pub use descriptor::{PortValue, TunnelImplementation};
pub use error::{ProvisionError, Result};
pub use mapper::{map_descriptors, Diagnostic, Mapping};
pub use output::{ErrorEnvelope, Metadata, ProvisionReport, ProvisionSummary, SuccessEnvelope};
pub use pipeline::{provision, provision_json, ProvisionOutput, CREDENTIALS_FILE, DATA_SOURCES_FILE};
pub use registry::DataSources;
