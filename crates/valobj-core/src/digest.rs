//! # Fingerprints — Content Hashes of Instances
//!
//! A `Fingerprint` is the SHA-256 digest of an instance's canonical bytes.
//! Equal instances have equal fingerprints; the first eight bytes serve as
//! the instance's hash value.
//!
//! `Fingerprint` can only be computed from [`CanonicalBytes`], so every
//! fingerprint goes through the same sorted, storage-order independent
//! encoding.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::ObjectError;
use crate::instance::Instance;

/// SHA-256 digest of an instance's canonical encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hash value: the first eight digest bytes, big-endian.
    pub fn as_u64(&self) -> u64 {
        let mut head = [0u8; 8];
        head.copy_from_slice(&self.0[..8]);
        u64::from_be_bytes(head)
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sha256:{}", self.to_hex())
    }
}

/// Compute the SHA-256 fingerprint of canonical bytes.
pub fn sha256_fingerprint(data: &CanonicalBytes) -> Fingerprint {
    let hash = Sha256::digest(data.as_bytes());
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    Fingerprint(bytes)
}

impl Instance {
    /// Fingerprint of the currently set fields.
    ///
    /// # Errors
    ///
    /// Returns `ObjectError::Unhashable` if a field holds a list, set or
    /// mapping, directly or inside a tuple or nested instance.
    pub fn fingerprint(&self) -> Result<Fingerprint, ObjectError> {
        Ok(sha256_fingerprint(&CanonicalBytes::of_instance(self)?))
    }

    /// Hash value derived from [`Instance::fingerprint`].
    ///
    /// # Errors
    ///
    /// Same as [`Instance::fingerprint`].
    pub fn try_hash(&self) -> Result<u64, ObjectError> {
        self.fingerprint().map(|f| f.as_u64())
    }
}
