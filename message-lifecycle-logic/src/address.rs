use alloy::primitives::{Address, B256};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PaddedError {
    #[error("identifier is {0} bytes long, at most 32 expected")]
    TooLong(usize),
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

/// Chain-agnostic 32-byte identifier.
///
/// EVM addresses are stored left-padded with zeros, so an address and its
/// 32-byte form compare equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Padded([u8; 32]);

impl Padded {
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn from_slice(bytes: &[u8]) -> Result<Self, PaddedError> {
        if bytes.len() > 32 {
            return Err(PaddedError::TooLong(bytes.len()));
        }
        let mut inner = [0u8; 32];
        inner[32 - bytes.len()..].copy_from_slice(bytes);
        Ok(Self(inner))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns the trailing 20 bytes if the identifier is an EVM address.
    pub fn as_address(&self) -> Option<Address> {
        self.is_address()
            .then(|| Address::from_slice(&self.0[12..]))
    }

    fn is_address(&self) -> bool {
        self.0[..12].iter().all(|b| *b == 0)
    }

    /// Checksummed address when the identifier fits 20 bytes, full hex otherwise.
    pub fn pretty(&self) -> String {
        match self.as_address() {
            Some(address) => address.to_checksum(None),
            None => format!("0x{}", hex::encode(self.0)),
        }
    }
}

impl fmt::Display for Padded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pretty())
    }
}

impl fmt::Debug for Padded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Padded({})", self.pretty())
    }
}

impl FromStr for Padded {
    type Err = PaddedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let bytes = hex::decode(s)?;
        Self::from_slice(&bytes)
    }
}

impl From<Address> for Padded {
    fn from(address: Address) -> Self {
        let mut inner = [0u8; 32];
        inner[12..].copy_from_slice(address.as_slice());
        Self(inner)
    }
}

impl From<B256> for Padded {
    fn from(value: B256) -> Self {
        Self(value.0)
    }
}

impl From<Padded> for B256 {
    fn from(value: Padded) -> Self {
        B256::from(value.0)
    }
}

impl Serialize for Padded {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.pretty())
    }
}

impl<'de> Deserialize<'de> for Padded {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Padded::from_str(&s).map_err(serde::de::Error::custom)
    }
}
