//! Opaque principal identities.
//!
//! A [`Principal`] is a fixed-width (32 byte) identity value. The registry
//! compares principals but never interprets their contents.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{PrincipalError, PrincipalResult};

/// Width of a principal in bytes.
pub const PRINCIPAL_LEN: usize = 32;

/// Key-derivation context for [`Principal::derive`].
const DERIVE_CONTEXT: &str = "steward 2026-10 principal label";

/// An opaque, comparable identity that can hold or be denied authorization.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Principal([u8; PRINCIPAL_LEN]);

impl Principal {
    /// Create a principal from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; PRINCIPAL_LEN]) -> Self {
        Self(bytes)
    }

    /// Try to create a principal from a slice.
    ///
    /// # Errors
    ///
    /// Returns [`PrincipalError::InvalidLength`] if the slice is not exactly
    /// [`PRINCIPAL_LEN`] bytes.
    pub fn try_from_slice(slice: &[u8]) -> PrincipalResult<Self> {
        let bytes: [u8; PRINCIPAL_LEN] =
            slice
                .try_into()
                .map_err(|_| PrincipalError::InvalidLength {
                    expected: PRINCIPAL_LEN,
                    actual: slice.len(),
                })?;
        Ok(Self(bytes))
    }

    /// Derive a principal from a human-readable label.
    ///
    /// The same label always yields the same principal. Labels live outside
    /// the registry; only the derived value is ever stored.
    ///
    /// ```
    /// use steward_core::Principal;
    ///
    /// assert_eq!(Principal::derive("alice"), Principal::derive("alice"));
    /// assert_ne!(Principal::derive("alice"), Principal::derive("bob"));
    /// ```
    #[must_use]
    pub fn derive(label: &str) -> Self {
        let mut hasher = blake3::Hasher::new_derive_key(DERIVE_CONTEXT);
        hasher.update(label.as_bytes());
        Self(*hasher.finalize().as_bytes())
    }

    /// Get the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; PRINCIPAL_LEN] {
        &self.0
    }

    /// Encode as a lowercase hex string.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Decode from a hex string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid hex or does not decode to
    /// exactly [`PRINCIPAL_LEN`] bytes.
    pub fn from_hex(s: &str) -> PrincipalResult<Self> {
        let bytes = hex::decode(s).map_err(|e| PrincipalError::InvalidHex(e.to_string()))?;
        Self::try_from_slice(&bytes)
    }

    /// Short form used in log lines and tables (first 8 hex digits).
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Principal({})", self.short())
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for Principal {
    type Err = PrincipalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s.trim())
    }
}

impl Serialize for Principal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Principal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl AsRef<[u8]> for Principal {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; PRINCIPAL_LEN]> for Principal {
    fn from(bytes: [u8; PRINCIPAL_LEN]) -> Self {
        Self(bytes)
    }
}

impl From<Principal> for [u8; PRINCIPAL_LEN] {
    fn from(principal: Principal) -> Self {
        principal.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_is_deterministic() {
        let a = Principal::derive("alice");
        assert_eq!(a, Principal::derive("alice"));
        assert_ne!(a, Principal::derive("Alice"));
    }

    #[test]
    fn test_hex_parse() {
        let p = Principal::derive("carol");
        let parsed: Principal = p.to_hex().parse().unwrap();
        assert_eq!(parsed, p);
        assert_eq!(p.to_hex().len(), 64);
    }

    #[test]
    fn test_from_hex_rejects_wrong_length() {
        let err = Principal::from_hex("abcd").unwrap_err();
        assert!(matches!(
            err,
            PrincipalError::InvalidLength {
                expected: 32,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_from_hex_rejects_garbage() {
        assert!(matches!(
            Principal::from_hex("not hex at all"),
            Err(PrincipalError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_serde_as_hex_string() {
        let p = Principal::from_bytes([7u8; PRINCIPAL_LEN]);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, format!("\"{}\"", "07".repeat(PRINCIPAL_LEN)));

        let decoded: Principal = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, p);
    }

    #[test]
    fn test_debug_is_short() {
        let p = Principal::from_bytes([0xab; PRINCIPAL_LEN]);
        assert_eq!(format!("{p:?}"), "Principal(abababab)");
    }
}
