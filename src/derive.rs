//! Identifier and URL Derivation
//!
//! Pure helpers shared by the mapper:
//! - connection ids (`{driver}-{slug(name)}`)
//! - DBeaver provider names
//! - JDBC connection URLs
//! - `~/` expansion for SSH key paths
//!
//! Unrecognized drivers never fail here; they fall back to MySQL semantics.

use serde::Serialize;
use std::borrow::Borrow;
use std::path::{Component, Path};

use crate::descriptor::Driver;

/// Stable connection identifier, the key in both output documents
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ConnectionId(String);

impl ConnectionId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ConnectionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// DBeaver driver-family classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Mysql,
    Postgresql,
}

impl Provider {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mysql => "mysql",
            Self::Postgresql => "postgresql",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower-case `name` and collapse every run of non `[a-z0-9]` characters into one hyphen
///
/// The result never starts or ends with a hyphen. Non-ASCII letters count as
/// separators.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for ch in name.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Derive the connection id for a descriptor
///
/// An empty name yields `{driver}-`.
#[must_use]
pub fn derive_id(driver: &Driver, name: &str) -> ConnectionId {
    ConnectionId(format!("{}-{}", driver.as_str(), slugify(name)))
}

/// Resolve the DBeaver provider for a driver
#[must_use]
pub const fn resolve_provider(driver: &Driver) -> Provider {
    match driver {
        Driver::PostgresJdbc => Provider::Postgresql,
        _ => Provider::Mysql,
    }
}

/// JDBC sub-protocol used in connection URLs
#[must_use]
pub const fn url_scheme(driver: &Driver) -> &'static str {
    match driver {
        Driver::PostgresJdbc => "postgresql",
        Driver::MariaDb => "mariadb",
        _ => "mysql",
    }
}

/// Build the JDBC connection URL, `jdbc:{scheme}://{host}:{port}/{database}`
///
/// An empty database leaves a trailing slash.
#[must_use]
pub fn build_connection_url(driver: &Driver, host: &str, port: &str, database: &str) -> String {
    format!("jdbc:{}://{host}:{port}/{database}", url_scheme(driver))
}

/// Expand a leading `~/` against the current user's home directory
#[must_use]
pub fn expand_home(path: &str) -> String {
    expand_home_with(path, dirs::home_dir().as_deref())
}

/// Expand a leading `~/` against `home`
///
/// The remainder is normalized lexically: empty and `.` segments are dropped
/// and `..` removes the previous segment. A trailing slash on a non-empty
/// remainder is kept, so `~/` alone becomes `home` itself. Paths without the
/// prefix, or any path when `home` is unknown, are returned unchanged.
#[must_use]
pub fn expand_home_with(path: &str, home: Option<&Path>) -> String {
    let (Some(rest), Some(home)) = (path.strip_prefix("~/"), home) else {
        return path.to_string();
    };

    let mut expanded = home.to_path_buf();
    for component in Path::new(rest).components() {
        match component {
            Component::ParentDir => {
                expanded.pop();
            }
            Component::Normal(segment) => expanded.push(segment),
            Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
        }
    }

    let mut expanded = expanded.to_string_lossy().into_owned();
    if rest.ends_with('/') && !expanded.ends_with('/') {
        expanded.push('/');
    }
    expanded
}
