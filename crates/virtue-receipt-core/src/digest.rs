//! Hash primitives: SHA-256 digests over bytes, text and files.
//!
//! A [`Digest`] renders either as 64 lowercase hex characters or as a URN
//! of the form `sha256:<hex>`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest as _, Sha256};
use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;
use std::str::FromStr;

use crate::error::CoreError;

/// Algorithm label used in the URN form.
pub const ALGORITHM: &str = "sha256";

/// Length of a digest in hex characters.
pub const HEX_LEN: usize = 64;

/// A 32-byte SHA-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest(pub [u8; 32]);

impl Digest {
    /// Compute the SHA-256 digest of the given bytes.
    pub fn of(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Convert to the URN form `sha256:<hex>`.
    pub fn to_urn(&self) -> String {
        format!("{}:{}", ALGORITHM, self.to_hex())
    }

    /// Parse from hex (either case).
    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        let bytes = hex::decode(s).map_err(|e| CoreError::MalformedDigest(e.to_string()))?;
        let arr: [u8; 32] = bytes.try_into().map_err(|_| {
            CoreError::MalformedDigest(format!("expected {} hex characters", HEX_LEN))
        })?;
        Ok(Self(arr))
    }

    /// Parse from the URN form. Bare hex is accepted as well.
    pub fn from_urn(s: &str) -> Result<Self, CoreError> {
        match s.split_once(':') {
            Some((alg, hex)) if alg.eq_ignore_ascii_case(ALGORITHM) => Self::from_hex(hex),
            Some((alg, _)) => Err(CoreError::UnsupportedAlgorithm(alg.to_string())),
            None => Self::from_hex(s),
        }
    }

    /// The zero digest.
    pub const ZERO: Self = Self([0u8; 32]);
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({}...)", &self.to_hex()[..16])
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Digest {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_urn(s)
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Digest {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_urn(&s).map_err(serde::de::Error::custom)
    }
}

/// Digest of UTF-8 text.
pub fn hash_text(text: &str) -> Digest {
    Digest::of(text.as_bytes())
}

/// Digest of a file's full contents.
///
/// The file handle is released on every return path.
pub fn hash_file(path: impl AsRef<Path>) -> Result<Digest, CoreError> {
    let path = path.as_ref();
    let io_err = |source: io::Error| CoreError::Io {
        path: path.display().to_string(),
        source,
    };

    let mut file = File::open(path).map_err(io_err)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).map_err(io_err)?;
    Ok(Digest(hasher.finalize().into()))
}

/// Check whether `s` is a bare 64-character hex digest (either case).
pub fn is_hex_digest(s: &str) -> bool {
    s.len() == HEX_LEN && s.bytes().all(|b| b.is_ascii_hexdigit())
}
