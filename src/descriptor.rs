//! Connection Descriptors
//!
//! Input records describing one database connection each. The descriptor list
//! arrives as a single JSON array:
//!
//! ```json
//! [{
//!   "name": "My DB",
//!   "driver": "mysql8",
//!   "host": "db.internal",
//!   "port": "3306",
//!   "database": "app",
//!   "user": "app",
//!   "password": "secret",
//!   "ssh": { "host": "bastion", "port": 22, "user": "deploy",
//!            "authType": "PUBLIC_KEY", "keyPath": "~/.ssh/id_ed25519",
//!            "implementation": "sshj" }
//! }]
//! ```
//!
//! Parsing is structural only. Missing or null text fields become empty
//! strings, and unknown drivers, auth types and tunnel implementations are
//! kept verbatim; the mapper decides what to do with them.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ProvisionError, Result};

/// Database driver identifier as understood by DBeaver
///
/// Only three drivers are recognized; any other value is preserved in
/// [`Driver::Other`] and falls back to MySQL semantics downstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Driver {
    /// `mysql8`
    MySql8,
    /// `postgres-jdbc`
    PostgresJdbc,
    /// `mariaDB`
    MariaDb,
    /// Anything else, kept as given
    Other(String),
}

impl Driver {
    /// Get the driver identifier as a string
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::MySql8 => "mysql8",
            Self::PostgresJdbc => "postgres-jdbc",
            Self::MariaDb => "mariaDB",
            Self::Other(raw) => raw,
        }
    }

    /// Whether this is one of the recognized driver identifiers
    #[must_use]
    pub const fn is_recognized(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl Default for Driver {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<String> for Driver {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "mysql8" => Self::MySql8,
            "postgres-jdbc" => Self::PostgresJdbc,
            "mariaDB" => Self::MariaDb,
            _ => Self::Other(raw),
        }
    }
}

impl From<&str> for Driver {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<Driver> for String {
    fn from(driver: Driver) -> Self {
        match driver {
            Driver::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// SSH authentication method
///
/// Values other than `PUBLIC_KEY` and `AGENT` (e.g. `PASSWORD`) are written
/// back unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum AuthType {
    /// Private key file (`PUBLIC_KEY`)
    #[default]
    PublicKey,
    /// Running SSH agent (`AGENT`)
    Agent,
    Other(String),
}

impl AuthType {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::PublicKey => "PUBLIC_KEY",
            Self::Agent => "AGENT",
            Self::Other(raw) => raw,
        }
    }

    #[must_use]
    pub const fn is_recognized(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for AuthType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "PUBLIC_KEY" => Self::PublicKey,
            "AGENT" => Self::Agent,
            _ => Self::Other(raw),
        }
    }
}

impl From<AuthType> for String {
    fn from(auth_type: AuthType) -> Self {
        match auth_type {
            AuthType::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// SSH client implementation DBeaver uses for the tunnel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum TunnelImplementation {
    #[default]
    Sshj,
    Jsch,
    Other(String),
}

impl TunnelImplementation {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Sshj => "sshj",
            Self::Jsch => "jsch",
            Self::Other(raw) => raw,
        }
    }

    #[must_use]
    pub const fn is_recognized(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for TunnelImplementation {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "sshj" => Self::Sshj,
            "jsch" => Self::Jsch,
            _ => Self::Other(raw),
        }
    }
}

impl From<TunnelImplementation> for String {
    fn from(implementation: TunnelImplementation) -> Self {
        match implementation {
            TunnelImplementation::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

/// A port as written in the input, number or string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PortValue {
    Number(serde_json::Number),
    Text(String),
}

impl PortValue {
    /// Whether the value counts as "not given" (`0` or an empty string)
    #[must_use]
    pub fn is_unset(&self) -> bool {
        match self {
            Self::Number(n) => n.as_f64() == Some(0.0),
            Self::Text(s) => s.is_empty(),
        }
    }
}

impl From<u16> for PortValue {
    fn from(port: u16) -> Self {
        Self::Number(port.into())
    }
}

impl std::fmt::Display for PortValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Optional SSH tunnel parameters of a descriptor
///
/// Defaults (port 22, public-key auth, sshj) are applied when the tunnel
/// handler is built, so absent values stay `None` here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SshTunnel {
    /// SSH server host
    #[serde(default, deserialize_with = "null_as_empty")]
    pub host: String,

    /// SSH server port as given (missing, `0` or `""` means default)
    #[serde(default, deserialize_with = "ssh_port")]
    pub port: Option<PortValue>,

    /// SSH login user
    #[serde(default, deserialize_with = "null_as_empty")]
    pub user: String,

    #[serde(default, deserialize_with = "non_empty")]
    pub auth_type: Option<AuthType>,

    /// Private key path, `~/` is expanded against the home directory
    #[serde(default, deserialize_with = "non_empty")]
    pub key_path: Option<String>,

    #[serde(default, deserialize_with = "non_empty")]
    pub implementation: Option<TunnelImplementation>,
}

/// One database connection to configure
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConnectionDescriptor {
    /// Display name, also the source of the connection id
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,

    #[serde(default, deserialize_with = "driver_or_default")]
    pub driver: Driver,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub host: String,

    /// Port in textual form (accepts a JSON string or number)
    #[serde(default, deserialize_with = "port_text")]
    pub port: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub database: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub user: String,

    /// WARNING: Sensitive data, do not log or include in error messages
    #[serde(default, deserialize_with = "null_as_empty")]
    pub password: String,

    #[serde(default)]
    pub ssh: Option<SshTunnel>,
}

impl ConnectionDescriptor {
    /// Create a descriptor with the connection target set and everything else empty
    pub fn new(
        name: impl Into<String>,
        driver: impl Into<Driver>,
        host: impl Into<String>,
        port: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            driver: driver.into(),
            host: host.into(),
            port: port.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    #[must_use]
    pub fn with_credentials(
        mut self,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.user = user.into();
        self.password = password.into();
        self
    }

    #[must_use]
    pub fn with_ssh(mut self, ssh: SshTunnel) -> Self {
        self.ssh = Some(ssh);
        self
    }
}

/// Parse the serialized descriptor list
///
/// Fails with `InvalidInput` if the text is not JSON, is not an array, or an
/// element is not an object with string-like fields. No other validation is done.
pub fn parse_descriptors(text: &str) -> Result<Vec<ConnectionDescriptor>> {
    let value: serde_json::Value = serde_json::from_str(text).map_err(|e| {
        ProvisionError::invalid_input(format!("Connections are not valid JSON: {e}"))
    })?;

    let serde_json::Value::Array(items) = value else {
        return Err(ProvisionError::invalid_input("Connections must be a JSON array"));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).map_err(|e| {
                ProvisionError::invalid_input(format!("Connection #{index} is malformed: {e}"))
            })
        })
        .collect()
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn driver_or_default<'de, D>(deserializer: D) -> std::result::Result<Driver, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(Driver::from).unwrap_or_default())
}

fn non_empty<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: From<String>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.is_empty()).map(T::from))
}

fn port_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<PortValue>::deserialize(deserializer)?
        .map(|port| port.to_string())
        .unwrap_or_default())
}

fn ssh_port<'de, D>(deserializer: D) -> std::result::Result<Option<PortValue>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<PortValue>::deserialize(deserializer)?.filter(|port| !port.is_unset()))
}
