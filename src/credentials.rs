//! Credential Registry (`credentials-config.json`)
//!
//! DBeaver keeps connection secrets in a separate file, encrypted with
//! AES-192-CBC under a key that is hardcoded in DBeaver itself
//! (`SecuredPasswordEncryptor`). The key below is that public constant; it
//! exists for interoperability, it does not protect anything and must not be
//! changed or rotated.
//!
//! # File Layout
//! `IV (16 bytes) || AES-192-CBC(PKCS#7, compact JSON)`
//!
//! A fresh IV is drawn from the OS random source for every file.

use aes::cipher::{block_padding::Pkcs7, BlockEncryptMut, KeyIvInit};
use indexmap::IndexMap;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::Serialize;

use crate::derive::ConnectionId;
use crate::error::{ProvisionError, Result};

type Aes192CbcEnc = cbc::Encryptor<aes::Aes192>;

/// Initialization vector size, also the length of the file prefix
pub const IV_SIZE: usize = 16;

/// DBeaver's credentials-store key (`babb4a9f774ab853c96c2d653dfe544a0b87c80ef1505c10`)
pub const CREDENTIALS_KEY: [u8; 24] = [
    0xba, 0xbb, 0x4a, 0x9f, 0x77, 0x4a, 0xb8, 0x53, 0xc9, 0x6c, 0x2d, 0x65, 0x3d, 0xfe, 0x54, 0x4a,
    0x0b, 0x87, 0xc8, 0x0e, 0xf1, 0x50, 0x5c, 0x10,
];

/// A user/password pair
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct CredentialPair {
    pub user: String,
    pub password: String,
}

impl CredentialPair {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialPair")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Secrets of one connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialEntry {
    #[serde(rename = "#connection")]
    pub connection: CredentialPair,

    /// Tunnel login; the password is always empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_tunnel: Option<CredentialPair>,
}

/// Credentials keyed by connection id, in first-insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CredentialRegistry(IndexMap<ConnectionId, CredentialEntry>);

impl CredentialRegistry {
    /// Insert or silently replace the entry for `id`
    ///
    /// Returns the replaced entry, if any.
    pub fn insert(&mut self, id: ConnectionId, entry: CredentialEntry) -> Option<CredentialEntry> {
        self.0.insert(id, entry)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&CredentialEntry> {
        self.0.get(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ConnectionId, &CredentialEntry)> {
        self.0.iter()
    }

    /// Compact JSON text, the plaintext of the credentials file
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            ProvisionError::serialization_error(format!("Could not serialize credentials: {e}"))
        })
    }
}

/// Draw a fresh IV from the OS random source
#[must_use]
pub fn generate_iv() -> [u8; IV_SIZE] {
    let mut iv = [0u8; IV_SIZE];
    OsRng.fill_bytes(&mut iv);
    iv
}

/// Encrypt under the fixed key with a fresh IV, returning `IV || ciphertext`
pub fn encrypt(plaintext: &[u8]) -> Result<Vec<u8>> {
    encrypt_with_iv(plaintext, &generate_iv())
}

/// Encrypt under the fixed key with the given IV, returning `IV || ciphertext`
pub fn encrypt_with_iv(plaintext: &[u8], iv: &[u8; IV_SIZE]) -> Result<Vec<u8>> {
    let cipher = Aes192CbcEnc::new_from_slices(&CREDENTIALS_KEY, iv).map_err(|e| {
        ProvisionError::encryption_error(format!("Could not initialize AES-192-CBC: {e}"))
    })?;
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    let mut out = Vec::with_capacity(IV_SIZE + ciphertext.len());
    out.extend_from_slice(iv);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Serialize the registry and encrypt it into the credentials file contents
pub fn encrypt_credentials(registry: &CredentialRegistry) -> Result<Vec<u8>> {
    let plaintext = registry.to_json()?;
    tracing::debug!(entries = registry.len(), "Encrypting credential registry");
    encrypt(plaintext.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::derive_id;
    use crate::descriptor::Driver;
    use aes::cipher::BlockDecryptMut;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn decrypt(blob: &[u8]) -> Vec<u8> {
        let (iv, ciphertext) = blob.split_at(IV_SIZE);
        cbc::Decryptor::<aes::Aes192>::new_from_slices(&CREDENTIALS_KEY, iv)
            .unwrap()
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .unwrap()
    }

    fn sample_registry() -> CredentialRegistry {
        let mut registry = CredentialRegistry::default();
        registry.insert(
            derive_id(&Driver::MySql8, "My DB"),
            CredentialEntry {
                connection: CredentialPair::new("u", "p"),
                ssh_tunnel: None,
            },
        );
        registry.insert(
            derive_id(&Driver::PostgresJdbc, "Other"),
            CredentialEntry {
                connection: CredentialPair::new("u2", "p2"),
                ssh_tunnel: Some(CredentialPair::new("sshuser", "")),
            },
        );
        registry
    }

    #[test]
    fn test_registry_json() {
        let expected = concat!(
            r##"{"mysql8-my-db":{"#connection":{"user":"u","password":"p"}},"##,
            r##""postgres-jdbc-other":{"#connection":{"user":"u2","password":"p2"},"##,
            r##""ssh_tunnel":{"user":"sshuser","password":""}}}"##,
        );
        assert_eq!(sample_registry().to_json().unwrap(), expected);
    }

    #[test]
    fn test_insert_replaces_silently() {
        let mut registry = sample_registry();
        let replaced = registry.insert(
            derive_id(&Driver::MySql8, "my db"),
            CredentialEntry {
                connection: CredentialPair::new("u3", "p3"),
                ssh_tunnel: None,
            },
        );

        assert!(replaced.is_some());
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("mysql8-my-db").unwrap().connection.user, "u3");
        // replaced key keeps its position
        assert_eq!(registry.iter().next().unwrap().0.as_str(), "mysql8-my-db");
    }

    #[test]
    fn test_layout_and_padding() {
        let iv = [7u8; IV_SIZE];

        let blob = encrypt_with_iv(b"", &iv).unwrap();
        assert_eq!(blob.len(), IV_SIZE + 16);
        assert_eq!(&blob[..IV_SIZE], &iv);

        // a full block of plaintext gets a full block of padding
        let blob = encrypt_with_iv(&[0u8; 16], &iv).unwrap();
        assert_eq!(blob.len(), IV_SIZE + 32);

        let blob = encrypt_with_iv(&[0u8; 17], &iv).unwrap();
        assert_eq!(blob.len(), IV_SIZE + 32);
    }

    #[test]
    fn test_same_iv_is_deterministic() {
        let iv = [1u8; IV_SIZE];
        assert_eq!(encrypt_with_iv(b"abc", &iv).unwrap(), encrypt_with_iv(b"abc", &iv).unwrap());
    }

    #[test]
    fn test_round_trip() {
        let registry = sample_registry();
        let blob = encrypt_credentials(&registry).unwrap();
        assert_eq!(decrypt(&blob), registry.to_json().unwrap().into_bytes());
    }

    proptest! {
        #[test]
        fn test_round_trip_any_credentials(
            name in any::<String>(),
            user in any::<String>(),
            password in any::<String>(),
            ssh_user in proptest::option::of(any::<String>()),
        ) {
            let mut registry = CredentialRegistry::default();
            registry.insert(
                derive_id(&Driver::MariaDb, &name),
                CredentialEntry {
                    connection: CredentialPair::new(user.clone(), password.clone()),
                    ssh_tunnel: ssh_user.map(|ssh_user| CredentialPair::new(ssh_user, "")),
                },
            );

            let plaintext = decrypt(&encrypt_credentials(&registry).unwrap());
            prop_assert_eq!(&plaintext, &registry.to_json().unwrap().into_bytes());

            let value: serde_json::Value = serde_json::from_slice(&plaintext).unwrap();
            let entry = &value[derive_id(&Driver::MariaDb, &name).as_str()];
            prop_assert_eq!(entry["#connection"]["user"].as_str(), Some(user.as_str()));
            prop_assert_eq!(entry["#connection"]["password"].as_str(), Some(password.as_str()));
        }
    }

    #[test]
    fn test_fresh_iv_per_call() {
        let first = encrypt(b"same plaintext").unwrap();
        let second = encrypt(b"same plaintext").unwrap();

        assert_ne!(&first[..IV_SIZE], &second[..IV_SIZE]);
        assert_ne!(first, second);
        assert_eq!(decrypt(&first), decrypt(&second));
    }

    #[test]
    fn test_debug_redacts_password() {
        let rendered = format!("{:?}", CredentialPair::new("alice", "hunter2"));
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("hunter2"));
    }
}
