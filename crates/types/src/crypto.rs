//! BLS12-381 keys, signatures and aggregation.
//!
//! All committee keys use the `min_pk` variant: public keys are G1 points
//! (48 bytes compressed, 96 bytes uncompressed) and signatures are G2 points.
//!
//! Curve and serialization settings are carried by an explicit [`BlsScheme`]
//! value created once at startup and passed to everything that decodes keys.

use blst::min_pk;
use blst::BLST_ERROR;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Domain separation tag used when signing and verifying.
pub const BLS_DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_POP_";

/// Compressed public key size in bytes.
pub const PUBLIC_KEY_COMPRESSED_LEN: usize = 48;

/// Uncompressed public key size in bytes.
pub const PUBLIC_KEY_UNCOMPRESSED_LEN: usize = 96;

/// Wire encoding of public keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyEncoding {
    /// 48-byte compressed G1 point.
    #[default]
    Compressed,
    /// 96-byte uncompressed G1 point.
    Uncompressed,
}

impl KeyEncoding {
    /// Expected length of an encoded public key.
    pub fn public_key_len(&self) -> usize {
        match self {
            KeyEncoding::Compressed => PUBLIC_KEY_COMPRESSED_LEN,
            KeyEncoding::Uncompressed => PUBLIC_KEY_UNCOMPRESSED_LEN,
        }
    }
}

/// Signature scheme parameters for committee keys.
///
/// The curve is always BLS12-381. The scheme fixes how keys are serialized
/// and whether decoded keys are subgroup-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlsScheme {
    encoding: KeyEncoding,
    validate_keys: bool,
}

impl BlsScheme {
    /// Create a scheme with the given key encoding and validation policy.
    pub fn new(encoding: KeyEncoding, validate_keys: bool) -> Self {
        Self {
            encoding,
            validate_keys,
        }
    }

    /// The configured key encoding.
    pub fn encoding(&self) -> KeyEncoding {
        self.encoding
    }

    /// Whether decoded keys are subgroup-checked and rejected at infinity.
    pub fn validates_keys(&self) -> bool {
        self.validate_keys
    }

    /// Decode a public key from its raw serialized bytes.
    pub fn decode_public_key(&self, bytes: &[u8]) -> Result<BlsPublicKey, KeyError> {
        let expected = self.encoding.public_key_len();
        if bytes.len() != expected {
            return Err(KeyError::InvalidLength {
                expected,
                actual: bytes.len(),
            });
        }

        let pk = match self.encoding {
            KeyEncoding::Compressed => min_pk::PublicKey::uncompress(bytes),
            KeyEncoding::Uncompressed => min_pk::PublicKey::deserialize(bytes),
        }
        .map_err(KeyError::InvalidPoint)?;

        if self.validate_keys {
            pk.validate().map_err(KeyError::InvalidPoint)?;
        }

        Ok(BlsPublicKey(pk))
    }

    /// Decode a public key from a hex string, with or without a `0x` prefix.
    pub fn decode_hex_public_key(&self, hex_str: &str) -> Result<BlsPublicKey, KeyError> {
        let trimmed = hex_str.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let bytes = hex::decode(digits).map_err(|e| KeyError::InvalidHex(e.to_string()))?;
        self.decode_public_key(&bytes)
    }

    /// Serialize a public key with the configured encoding.
    pub fn encode_public_key(&self, key: &BlsPublicKey) -> Vec<u8> {
        match self.encoding {
            KeyEncoding::Compressed => key.0.compress().to_vec(),
            KeyEncoding::Uncompressed => key.0.serialize().to_vec(),
        }
    }

    /// Serialize a public key as a lowercase hex string.
    pub fn encode_hex_public_key(&self, key: &BlsPublicKey) -> String {
        hex::encode(self.encode_public_key(key))
    }
}

impl Default for BlsScheme {
    fn default() -> Self {
        Self::new(KeyEncoding::Compressed, true)
    }
}

/// A BLS12-381 key pair.
#[derive(Clone)]
pub struct BlsKeyPair {
    secret: min_pk::SecretKey,
}

impl BlsKeyPair {
    /// Derive a key pair from a 32-byte seed (for tests and simulation).
    pub fn from_seed(seed: &[u8; 32]) -> Result<Self, KeyError> {
        let secret = min_pk::SecretKey::key_gen(seed, &[]).map_err(KeyError::KeyGeneration)?;
        Ok(Self { secret })
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> BlsSignature {
        BlsSignature(self.secret.sign(message, BLS_DST, &[]))
    }

    /// Get the public key.
    pub fn public_key(&self) -> BlsPublicKey {
        BlsPublicKey(self.secret.sk_to_pk())
    }
}

impl fmt::Debug for BlsKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlsKeyPair({:?})", self.public_key())
    }
}

/// A decoded BLS12-381 public key.
#[derive(Clone)]
pub struct BlsPublicKey(min_pk::PublicKey);

impl BlsPublicKey {
    /// Compressed 48-byte encoding.
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_COMPRESSED_LEN] {
        self.0.compress()
    }

    /// Verify a signature over `message`.
    pub fn verify(&self, message: &[u8], signature: &BlsSignature) -> bool {
        signature.0.verify(true, message, BLS_DST, &[], &self.0, true) == BLST_ERROR::BLST_SUCCESS
    }

    fn add(&self, other: &BlsPublicKey) -> BlsPublicKey {
        let mut sum = min_pk::AggregatePublicKey::from_public_key(&self.0);
        sum.add_aggregate(&min_pk::AggregatePublicKey::from_public_key(&other.0));
        BlsPublicKey(sum.to_public_key())
    }
}

impl PartialEq for BlsPublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for BlsPublicKey {}

impl fmt::Debug for BlsPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = hex::encode(self.to_bytes());
        write!(
            f,
            "BlsPublicKey({}..{})",
            &hex[..8],
            &hex[hex.len() - 8..]
        )
    }
}

/// Running point sum of committee public keys.
///
/// Starts at the identity element. Adding keys never fails; whether the
/// resulting set of signers is sufficient is for the caller to decide.
#[derive(Clone, Default)]
pub struct AggregatePublicKey {
    sum: Option<BlsPublicKey>,
    signers: usize,
}

impl AggregatePublicKey {
    /// The identity (empty) aggregate.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Aggregate a list of keys.
    pub fn from_keys<'a>(keys: impl IntoIterator<Item = &'a BlsPublicKey>) -> Self {
        let mut aggregate = Self::identity();
        for key in keys {
            aggregate.add(key);
        }
        aggregate
    }

    /// Add a key into the running sum.
    pub fn add(&mut self, key: &BlsPublicKey) {
        self.sum = Some(match self.sum.take() {
            None => key.clone(),
            Some(current) => current.add(key),
        });
        self.signers += 1;
    }

    /// Check if no keys have been added.
    pub fn is_identity(&self) -> bool {
        self.sum.is_none()
    }

    /// Number of keys folded into the sum.
    pub fn signers(&self) -> usize {
        self.signers
    }

    /// The aggregate as a single public key, or `None` for the identity.
    pub fn to_public_key(&self) -> Option<BlsPublicKey> {
        self.sum.clone()
    }

    /// Verify an aggregated signature over `message`.
    ///
    /// The identity aggregate verifies nothing.
    pub fn verify(&self, message: &[u8], signature: &BlsSignature) -> bool {
        self.sum
            .as_ref()
            .is_some_and(|key| key.verify(message, signature))
    }
}

impl PartialEq for AggregatePublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.sum == other.sum
    }
}

impl Eq for AggregatePublicKey {}

impl fmt::Debug for AggregatePublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sum {
            None => write!(f, "AggregatePublicKey(identity)"),
            Some(key) => write!(
                f,
                "AggregatePublicKey({:?}, signers={})",
                key, self.signers
            ),
        }
    }
}

/// A BLS12-381 signature.
#[derive(Clone)]
pub struct BlsSignature(min_pk::Signature);

impl BlsSignature {
    /// Compressed 96-byte encoding.
    pub fn to_bytes(&self) -> [u8; 96] {
        self.0.compress()
    }

    /// Aggregate multiple signatures over the same message.
    pub fn aggregate(signatures: &[BlsSignature]) -> Result<Self, AggregateError> {
        if signatures.is_empty() {
            return Err(AggregateError::Empty);
        }

        let refs: Vec<&min_pk::Signature> = signatures.iter().map(|s| &s.0).collect();
        let agg = min_pk::AggregateSignature::aggregate(&refs, false)
            .map_err(|_| AggregateError::AggregationFailed)?;

        Ok(BlsSignature(agg.to_signature()))
    }
}

impl fmt::Debug for BlsSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlsSignature({}..)", &hex::encode(self.to_bytes())[..16])
    }
}

/// Errors raised when decoding or generating keys.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    /// Encoded key has the wrong size for the configured encoding.
    #[error("invalid public key length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// Bytes do not describe a valid curve point.
    #[error("invalid public key point: {0:?}")]
    InvalidPoint(BLST_ERROR),

    /// Hex string could not be decoded.
    #[error("invalid hex public key: {0}")]
    InvalidHex(String),

    /// Secret key derivation failed.
    #[error("key generation failed: {0:?}")]
    KeyGeneration(BLST_ERROR),
}

/// Errors that can occur during signature aggregation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AggregateError {
    /// Empty list provided.
    #[error("Cannot aggregate empty list")]
    Empty,

    /// Aggregation operation failed.
    #[error("Aggregation failed")]
    AggregationFailed,
}
