//! # Content Digests
//!
//! SHA-256 digests used to hash-chain the alias event log. Every log entry
//! commits to its predecessor's digest, so an edited or deleted entry is
//! detected when the log is replayed.
//!
//! Digests serialize as lowercase hex strings.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

/// A 32-byte SHA-256 digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// The all-zero digest that precedes the first entry of a chain.
    pub const GENESIS: ContentDigest = ContentDigest([0u8; 32]);

    /// Wrap raw digest bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse a 64-character hex string.
    pub fn from_hex(s: &str) -> Option<Self> {
        if s.len() != 64 || !s.is_ascii() {
            return None;
        }
        let mut bytes = [0u8; 32];
        for (i, slot) in bytes.iter_mut().enumerate() {
            *slot = u8::from_str_radix(&s[2 * i..2 * i + 2], 16).ok()?;
        }
        Some(Self(bytes))
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sha256:{}", self.to_hex())
    }
}

impl Serialize for ContentDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_hex(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid sha256 hex digest: {raw:?}")))
    }
}

/// Compute the SHA-256 digest of `data`.
pub fn sha256_digest(data: &[u8]) -> ContentDigest {
    let hash = Sha256::digest(data);
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hash);
    ContentDigest(bytes)
}

/// Compute the digest of `prev` followed by `data`: the link function of
/// a hash chain.
pub fn chain_digest(prev: &ContentDigest, data: &[u8]) -> ContentDigest {
    let mut hasher = Sha256::new();
    hasher.update(prev.as_bytes());
    hasher.update(data);
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hasher.finalize());
    ContentDigest(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_sha256_vector() {
        assert_eq!(
            sha256_digest(b"{}").to_hex(),
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
    }

    #[test]
    fn hex_roundtrip() {
        let d = sha256_digest(b"kate");
        assert_eq!(ContentDigest::from_hex(&d.to_hex()), Some(d));
    }

    #[test]
    fn from_hex_rejects_bad_input() {
        assert!(ContentDigest::from_hex("abc").is_none());
        assert!(ContentDigest::from_hex(&"zz".repeat(32)).is_none());
    }

    #[test]
    fn chain_depends_on_predecessor() {
        let a = chain_digest(&ContentDigest::GENESIS, b"event");
        let b = chain_digest(&sha256_digest(b"other"), b"event");
        assert_ne!(a, b);
    }

    #[test]
    fn display_is_prefixed() {
        let s = ContentDigest::GENESIS.to_string();
        assert!(s.starts_with("sha256:"));
        assert_eq!(s.len(), 7 + 64);
    }

    #[test]
    fn serde_as_hex_string() {
        let d = sha256_digest(b"x");
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, format!("\"{}\"", d.to_hex()));
        let back: ContentDigest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
    }
}
