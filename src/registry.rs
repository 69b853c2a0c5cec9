//! Connection Registry Document (`data-sources.json`)
//!
//! Types mirroring the part of DBeaver's `data-sources.json` schema that this
//! tool writes. The document is plaintext: hosts, ports, URLs and tunnel
//! topology, never credentials.
//!
//! # Layout
//! ```json
//! {
//!     "folders": {},
//!     "connections": { "<id>": { "provider": "...", "configuration": { ... } } },
//!     "connection-types": { "dev": { ... } }
//! }
//! ```

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::derive::{expand_home, ConnectionId, Provider};
use crate::descriptor::{AuthType, Driver, PortValue, SshTunnel, TunnelImplementation};
use crate::error::{ProvisionError, Result};

/// Default SSH port when a tunnel does not name one
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Keep-alive interval written for every tunnel, in milliseconds
pub const TUNNEL_ALIVE_INTERVAL_MS: u32 = 5000;

/// A DBeaver connection type (color, commit and timeout policy)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConnectionType {
    pub name: &'static str,
    pub color: &'static str,
    pub description: &'static str,
    pub auto_commit: bool,
    pub confirm_execute: bool,
    pub confirm_data_change: bool,
    pub smart_commit: bool,
    pub smart_commit_recover: bool,
    pub auto_close_transactions: bool,
    /// Seconds
    pub close_transactions_period: u32,
    pub auto_close_connections: bool,
    /// Seconds
    pub close_connections_period: u32,
}

/// The `dev` connection type every generated connection refers to
pub const DEV_CONNECTION_TYPE: ConnectionType = ConnectionType {
    name: "Development",
    color: "255,255,255",
    description: "Regular development database",
    auto_commit: true,
    confirm_execute: false,
    confirm_data_change: false,
    smart_commit: false,
    smart_commit_recover: false,
    auto_close_transactions: true,
    close_transactions_period: 1800,
    auto_close_connections: true,
    close_connections_period: 14400,
};

/// Key of [`DEV_CONNECTION_TYPE`] in the catalog and in each configuration's `type`
pub const DEV_CONNECTION_TYPE_ID: &str = "dev";

/// The `connection-types` catalog, identical in every run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConnectionTypeCatalog {
    pub dev: ConnectionType,
}

pub const CONNECTION_TYPES: ConnectionTypeCatalog = ConnectionTypeCatalog {
    dev: DEV_CONNECTION_TYPE,
};

/// Top-level `data-sources.json` document
#[derive(Debug, Clone, Serialize)]
pub struct DataSources {
    /// Always empty; folders are not generated
    pub folders: BTreeMap<String, serde_json::Value>,

    /// Connections keyed by id, in first-insertion order
    pub connections: IndexMap<ConnectionId, ConnectionEntry>,

    #[serde(rename = "connection-types")]
    pub connection_types: ConnectionTypeCatalog,
}

impl Default for DataSources {
    fn default() -> Self {
        Self {
            folders: BTreeMap::new(),
            connections: IndexMap::new(),
            connection_types: CONNECTION_TYPES,
        }
    }
}

impl DataSources {
    /// Render the document as JSON indented with four spaces
    pub fn to_json_pretty(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);

        self.serialize(&mut serializer).map_err(|e| {
            ProvisionError::serialization_error(format!("Could not serialize data sources: {e}"))
        })?;

        String::from_utf8(buf).map_err(|e| {
            ProvisionError::serialization_error(format!("Data sources are not valid UTF-8: {e}"))
        })
    }
}

/// One entry of the `connections` map
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionEntry {
    pub provider: Provider,
    pub driver: Driver,
    pub name: String,

    /// Always true so DBeaver reads the credentials file
    #[serde(rename = "save-password")]
    pub save_password: bool,

    pub configuration: ConnectionConfiguration,
}

/// The nested `configuration` record of a connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionConfiguration {
    pub host: String,
    pub port: String,
    pub database: String,
    pub url: String,

    #[serde(rename = "configurationType")]
    pub configuration_type: &'static str,

    /// Connection type id, see [`DEV_CONNECTION_TYPE_ID`]
    #[serde(rename = "type")]
    pub connection_type: &'static str,

    #[serde(rename = "closeIdleConnection")]
    pub close_idle_connection: bool,

    #[serde(rename = "auth-model")]
    pub auth_model: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub handlers: Option<Handlers>,
}

impl ConnectionConfiguration {
    /// Manual configuration with the fixed policy (dev type, native auth, idle connections kept)
    pub fn manual(
        host: impl Into<String>,
        port: impl Into<String>,
        database: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: port.into(),
            database: database.into(),
            url: url.into(),
            configuration_type: "MANUAL",
            connection_type: DEV_CONNECTION_TYPE_ID,
            close_idle_connection: false,
            auth_model: "native",
            handlers: None,
        }
    }

    #[must_use]
    pub fn with_tunnel(mut self, tunnel: TunnelHandler) -> Self {
        self.handlers = Some(Handlers { ssh_tunnel: tunnel });
        self
    }
}

/// Network handlers attached to a connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Handlers {
    pub ssh_tunnel: TunnelHandler,
}

/// `handlers.ssh_tunnel` block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TunnelHandler {
    #[serde(rename = "type")]
    pub handler_type: &'static str,

    pub enabled: bool,

    #[serde(rename = "save-password")]
    pub save_password: bool,

    pub properties: TunnelProperties,
}

impl TunnelHandler {
    /// Enabled tunnel handler that keeps its (empty) password
    #[must_use]
    pub const fn new(properties: TunnelProperties) -> Self {
        Self {
            handler_type: "TUNNEL",
            enabled: true,
            save_password: true,
            properties,
        }
    }
}

/// Properties of an SSH tunnel with defaults applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TunnelProperties {
    pub host: String,
    /// Written in the shape it was given (number or string)
    pub port: PortValue,
    pub auth_type: AuthType,
    pub key_path: String,
    pub implementation: TunnelImplementation,
    pub bypass_host_verification: bool,
    pub alive_interval: u32,
}

impl TunnelProperties {
    /// Apply defaults to a descriptor's tunnel and expand its key path
    #[must_use]
    pub fn from_tunnel(ssh: &SshTunnel) -> Self {
        Self {
            host: ssh.host.clone(),
            port: ssh.port.clone().unwrap_or_else(|| DEFAULT_SSH_PORT.into()),
            auth_type: ssh.auth_type.clone().unwrap_or_default(),
            key_path: ssh.key_path.as_deref().map(expand_home).unwrap_or_default(),
            implementation: ssh.implementation.clone().unwrap_or_default(),
            bypass_host_verification: false,
            alive_interval: TUNNEL_ALIVE_INTERVAL_MS,
        }
    }
}
