//! Descriptor Mapper
//!
//! Turns the ordered descriptor list into the connection registry and the
//! credential registry. Both documents share the same ids.
//!
//! # Anomalies
//! Nothing here fails. Duplicate ids are last-write-wins, unknown drivers
//! fall back to MySQL, empty names produce `{driver}-` ids and unknown tunnel
//! options are written as given. Each of these is reported as a
//! [`Diagnostic`] and logged, without changing the output.

use serde::Serialize;

use crate::credentials::{CredentialEntry, CredentialPair, CredentialRegistry};
use crate::derive::{build_connection_url, derive_id, resolve_provider, ConnectionId};
use crate::descriptor::{ConnectionDescriptor, SshTunnel};
use crate::registry::{
    ConnectionConfiguration, ConnectionEntry, DataSources, TunnelHandler, TunnelProperties,
};

/// Non-fatal anomaly noticed while mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A later descriptor replaced an earlier one with the same id
    DuplicateId { id: String, name: String },
    /// The driver is not one of the recognized identifiers
    UnrecognizedDriver { name: String, driver: String },
    /// The descriptor at `index` has an empty name
    MissingName { index: usize },
    /// A tunnel `authType` or `implementation` DBeaver may not understand
    UnrecognizedTunnelOption {
        name: String,
        option: String,
        value: String,
    },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateId { id, name } => {
                write!(f, "connection '{name}' replaces an earlier connection with id '{id}'")
            }
            Self::UnrecognizedDriver { name, driver } => {
                write!(
                    f,
                    "connection '{name}' uses unrecognized driver '{driver}', using mysql defaults"
                )
            }
            Self::MissingName { index } => write!(f, "connection #{index} has no name"),
            Self::UnrecognizedTunnelOption { name, option, value } => {
                write!(f, "connection '{name}' has unrecognized tunnel {option} '{value}'")
            }
        }
    }
}

/// Both documents built from one descriptor list
#[derive(Debug, Clone, Default)]
pub struct Mapping {
    pub data_sources: DataSources,
    pub credentials: CredentialRegistry,
    pub diagnostics: Vec<Diagnostic>,
}

/// Map descriptors, in input order, into both documents
#[must_use]
pub fn map_descriptors(descriptors: &[ConnectionDescriptor]) -> Mapping {
    let mut mapping = Mapping::default();

    for (index, descriptor) in descriptors.iter().enumerate() {
        let id = derive_id(&descriptor.driver, &descriptor.name);

        if descriptor.name.is_empty() {
            mapping.diagnostics.push(Diagnostic::MissingName { index });
        }
        if !descriptor.driver.is_recognized() {
            mapping.diagnostics.push(Diagnostic::UnrecognizedDriver {
                name: descriptor.name.clone(),
                driver: descriptor.driver.to_string(),
            });
        }

        if let Some(ssh) = &descriptor.ssh {
            mapping.diagnostics.extend(tunnel_diagnostics(&descriptor.name, ssh));
        }

        tracing::debug!(
            %id,
            driver = %descriptor.driver,
            ssh = descriptor.ssh.is_some(),
            "Mapping connection"
        );

        let replaced = mapping
            .data_sources
            .connections
            .insert(id.clone(), connection_entry(descriptor))
            .is_some();
        mapping.credentials.insert(id.clone(), credential_entry(descriptor));

        if replaced {
            mapping.diagnostics.push(Diagnostic::DuplicateId {
                id: id.to_string(),
                name: descriptor.name.clone(),
            });
        }
    }

    for diagnostic in &mapping.diagnostics {
        tracing::warn!("{diagnostic}");
    }

    mapping
}

fn tunnel_diagnostics(name: &str, ssh: &SshTunnel) -> Vec<Diagnostic> {
    let mut unrecognized = Vec::new();
    if let Some(auth_type) = ssh.auth_type.as_ref().filter(|a| !a.is_recognized()) {
        unrecognized.push(("authType", auth_type.as_str()));
    }
    if let Some(implementation) = ssh.implementation.as_ref().filter(|i| !i.is_recognized()) {
        unrecognized.push(("implementation", implementation.as_str()));
    }

    unrecognized
        .into_iter()
        .map(|(option, value)| Diagnostic::UnrecognizedTunnelOption {
            name: name.to_string(),
            option: option.to_string(),
            value: value.to_string(),
        })
        .collect()
}

fn connection_entry(descriptor: &ConnectionDescriptor) -> ConnectionEntry {
    let url = build_connection_url(
        &descriptor.driver,
        &descriptor.host,
        &descriptor.port,
        &descriptor.database,
    );

    let mut configuration = ConnectionConfiguration::manual(
        descriptor.host.clone(),
        descriptor.port.clone(),
        descriptor.database.clone(),
        url,
    );
    if let Some(ssh) = &descriptor.ssh {
        configuration =
            configuration.with_tunnel(TunnelHandler::new(TunnelProperties::from_tunnel(ssh)));
    }

    ConnectionEntry {
        provider: resolve_provider(&descriptor.driver),
        driver: descriptor.driver.clone(),
        name: descriptor.name.clone(),
        save_password: true,
        configuration,
    }
}

fn credential_entry(descriptor: &ConnectionDescriptor) -> CredentialEntry {
    CredentialEntry {
        connection: CredentialPair::new(descriptor.user.clone(), descriptor.password.clone()),
        // tunnel passwords are never persisted
        ssh_tunnel: descriptor.ssh.as_ref().map(|ssh| CredentialPair::new(ssh.user.clone(), "")),
    }
}

impl Mapping {
    /// Ids in document order
    pub fn ids(&self) -> impl Iterator<Item = &ConnectionId> {
        self.data_sources.connections.keys()
    }
}
