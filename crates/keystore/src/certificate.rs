//! Trusted committee certificate bundle.

use serde::{Deserialize, Serialize};
use shardline_types::ValidatorId;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Authoritative snapshot of committee public keys.
///
/// Maps validator ids to hex-encoded public keys. On disk it is a flat JSON
/// object keyed by decimal ids:
///
/// ```json
/// { "0": "a1b2..", "1": "c3d4.." }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CertificateBundle {
    keys: BTreeMap<ValidatorId, String>,
}

impl CertificateBundle {
    /// Build a bundle from `(id, hex key)` pairs.
    pub fn from_entries(entries: impl IntoIterator<Item = (ValidatorId, String)>) -> Self {
        Self {
            keys: entries.into_iter().collect(),
        }
    }

    /// Decode a bundle from its JSON text.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: BTreeMap<u64, String> = serde_json::from_str(json)?;
        Ok(Self::from_entries(
            raw.into_iter().map(|(id, key)| (ValidatorId(id), key)),
        ))
    }

    /// Hex key recorded for `node`.
    pub fn key_for(&self, node: ValidatorId) -> Option<&str> {
        self.keys.get(&node).map(String::as_str)
    }

    /// Validator ids present in the bundle, ascending.
    pub fn node_ids(&self) -> impl Iterator<Item = ValidatorId> + '_ {
        self.keys.keys().copied()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if the bundle is empty.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Errors raised while reading a certificate bundle.
#[derive(Debug, thiserror::Error)]
pub enum CertificateError {
    /// The bundle file could not be read.
    #[error("failed to read certificate bundle {path}: {source}")]
    Io {
        /// Bundle location.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The bundle file is not a flat JSON object of id to hex key.
    #[error("failed to decode certificate bundle {path}: {source}")]
    Decode {
        /// Bundle location.
        path: PathBuf,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },
}

/// Reads the certificate bundle from a fixed location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateLoader {
    path: PathBuf,
}

impl CertificateLoader {
    /// Create a loader for the bundle at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the bundle.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and decode the bundle.
    ///
    /// Either the whole bundle is returned or an error; a partially decoded
    /// bundle is never produced.
    pub fn load(&self) -> Result<CertificateBundle, CertificateError> {
        self.read().inspect_err(|e| {
            warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to load certificate bundle"
            );
        })
    }

    fn read(&self) -> Result<CertificateBundle, CertificateError> {
        let contents =
            std::fs::read_to_string(&self.path).map_err(|source| CertificateError::Io {
                path: self.path.clone(),
                source,
            })?;

        CertificateBundle::from_json(&contents).map_err(|source| CertificateError::Decode {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn test_bundle_json_roundtrip() {
        let bundle = CertificateBundle::from_entries([
            (ValidatorId(2), "bb".to_string()),
            (ValidatorId(10), "aa".to_string()),
        ]);

        let json = serde_json::to_string_pretty(&bundle).unwrap();
        assert!(json.contains("\"10\": \"aa\""));

        let decoded = CertificateBundle::from_json(&json).unwrap();
        assert_eq!(decoded, bundle);
        assert_eq!(decoded.key_for(ValidatorId(2)), Some("bb"));
        assert_eq!(decoded.key_for(ValidatorId(3)), None);
        assert_eq!(
            decoded.node_ids().collect::<Vec<_>>(),
            vec![ValidatorId(2), ValidatorId(10)]
        );
    }

    #[test]
    fn test_bundle_rejects_non_numeric_ids() {
        assert!(CertificateBundle::from_json(r#"{"1": "aa", "node-2": "bb"}"#).is_err());
        assert!(CertificateBundle::from_json(r#"["aa", "bb"]"#).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cert.json");
        std::fs::write(&path, r#"{"0": "aa", "1": "bb"}"#).unwrap();

        let bundle = CertificateLoader::new(&path).load().unwrap();
        assert_eq!(bundle.len(), 2);
        assert_eq!(bundle.key_for(ValidatorId(1)), Some("bb"));
    }

    #[traced_test]
    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let loader = CertificateLoader::new(dir.path().join("missing.json"));

        let err = loader.load().unwrap_err();
        assert!(matches!(err, CertificateError::Io { .. }));
        assert!(logs_contain("Failed to load certificate bundle"));
    }

    #[traced_test]
    #[test]
    fn test_load_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cert.json");
        std::fs::write(&path, r#"{"0": "aa", "1": "#).unwrap();

        let err = CertificateLoader::new(&path).load().unwrap_err();
        assert!(matches!(err, CertificateError::Decode { .. }));
        assert!(logs_contain("Failed to load certificate bundle"));
    }
}
