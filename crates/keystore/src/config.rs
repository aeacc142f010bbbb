//! Key store configuration.

use crate::CertificateLoader;
use serde::{Deserialize, Serialize};
use shardline_types::{BlsScheme, KeyEncoding};
use std::path::PathBuf;

/// Configuration for the committee key store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyStoreConfig {
    /// Location of the trusted certificate bundle used by reset.
    pub certificate_path: PathBuf,

    /// Wire encoding of committee public keys.
    pub key_encoding: KeyEncoding,

    /// Subgroup-check decoded keys and reject the point at infinity.
    pub validate_keys: bool,
}

impl Default for KeyStoreConfig {
    fn default() -> Self {
        Self {
            certificate_path: PathBuf::from("cert/cert.json"),
            key_encoding: KeyEncoding::Compressed,
            validate_keys: true,
        }
    }
}

impl KeyStoreConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the certificate bundle location.
    pub fn with_certificate_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.certificate_path = path.into();
        self
    }

    /// Set the key encoding.
    pub fn with_key_encoding(mut self, encoding: KeyEncoding) -> Self {
        self.key_encoding = encoding;
        self
    }

    /// Enable or disable key validation.
    pub fn with_validate_keys(mut self, validate: bool) -> Self {
        self.validate_keys = validate;
        self
    }

    /// The signature scheme described by this config.
    pub fn scheme(&self) -> BlsScheme {
        BlsScheme::new(self.key_encoding, self.validate_keys)
    }

    /// A loader for the configured certificate bundle.
    pub fn loader(&self) -> CertificateLoader {
        CertificateLoader::new(self.certificate_path.clone())
    }
}
