//! Chain account address with EIP-55 checksum validation.

use crate::error::TypeError;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;

/// A validated 20-byte chain account address.
///
/// The only ways to obtain one are [`Address::validate`] (for untrusted input)
/// and [`Address::from_bytes`]. Equality and hashing operate on the raw bytes,
/// so two spellings of the same account always compare equal.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; 20]);

impl Address {
    /// Number of raw bytes in an address.
    pub const LEN: usize = 20;

    /// Required textual prefix.
    pub const PREFIX: &'static str = "0x";

    /// Validate an untrusted address string.
    ///
    /// Accepts `0x` (or `0X`) followed by exactly 40 hex digits.
    /// All-lowercase and all-uppercase digits are accepted as-is; mixed case
    /// must carry a correct EIP-55 checksum.
    pub fn validate(candidate: &str) -> Result<Self, TypeError> {
        let digits = candidate
            .strip_prefix(Self::PREFIX)
            .or_else(|| candidate.strip_prefix("0X"))
            .ok_or_else(|| TypeError::InvalidAddress(format!("{candidate}: missing 0x prefix")))?;

        if digits.len() != Self::LEN * 2 {
            return Err(TypeError::InvalidAddress(format!(
                "{candidate}: expected 40 hex digits, got {}",
                digits.len()
            )));
        }

        let decoded = hex::decode(digits)
            .map_err(|e| TypeError::InvalidAddress(format!("{candidate}: {e}")))?;
        let mut bytes = [0u8; Self::LEN];
        bytes.copy_from_slice(&decoded);
        let address = Self(bytes);

        let has_lower = digits.bytes().any(|b| b.is_ascii_lowercase());
        let has_upper = digits.bytes().any(|b| b.is_ascii_uppercase());
        if has_lower && has_upper && address.checksum_digits() != digits {
            return Err(TypeError::InvalidAddress(format!(
                "{candidate}: checksum mismatch"
            )));
        }

        Ok(address)
    }

    /// Build an address from raw bytes.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Lowercase `0x`-prefixed form, used as the storage key.
    pub fn to_lower_hex(&self) -> String {
        format!("{}{}", Self::PREFIX, hex::encode(self.0))
    }

    /// EIP-55 mixed-case form, used for display.
    pub fn to_checksum(&self) -> String {
        format!("{}{}", Self::PREFIX, self.checksum_digits())
    }

    fn checksum_digits(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = Keccak256::digest(lower.as_bytes());
        lower
            .char_indices()
            .map(|(i, c)| {
                let byte = hash[i / 2];
                let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
                if c.is_ascii_alphabetic() && nibble >= 8 {
                    c.to_ascii_uppercase()
                } else {
                    c
                }
            })
            .collect()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}

impl TryFrom<String> for Address {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::validate(&s)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_checksum()
    }
}
