//! Shared types for the Tron signing core
//!
//! Data structures that cross module boundaries are defined here for
//! consistent serialization between the keystore, the digest builders
//! and the host application.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Length of a recoverable ECDSA signature: R(32) + S(32) + V(1).
pub const SIGNATURE_LEN: usize = 65;

/// A 65-byte recoverable ECDSA signature.
///
/// The keystore produces the recovery indicator in the Ethereum-style
/// `{27, 28}` convention; [`Signature::normalize`] maps it to the `{0, 1}`
/// convention Tron's verification logic expects.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature([u8; SIGNATURE_LEN]);

impl Signature {
    pub fn new(bytes: [u8; SIGNATURE_LEN]) -> Self {
        Self(bytes)
    }

    /// Assemble from compact R || S and a recovery indicator.
    pub fn from_parts(compact: &[u8; 64], v: u8) -> Self {
        let mut bytes = [0u8; SIGNATURE_LEN];
        bytes[..64].copy_from_slice(compact);
        bytes[64] = v;
        Self(bytes)
    }

    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        let bytes: [u8; SIGNATURE_LEN] = slice.try_into().ok()?;
        Some(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }

    /// The recovery indicator V (last byte).
    pub fn recovery_byte(&self) -> u8 {
        self.0[64]
    }

    /// Canonicalize the recovery indicator: `{27, 28}` becomes `{0, 1}`.
    /// A no-op on an already-canonical signature.
    pub fn normalize(mut self) -> Self {
        if self.0[64] >= 27 {
            self.0[64] -= 27;
        }
        self
    }

    /// Lowercase hex, no 0x prefix, 130 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature(0x{})", self.to_hex())
    }
}

impl Serialize for Signature {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(s.trim_start_matches("0x")).map_err(serde::de::Error::custom)?;
        Signature::from_slice(&bytes)
            .ok_or_else(|| serde::de::Error::custom("expected 65 bytes"))
    }
}

/// Payload encodings accepted by message signing v2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageEncoding {
    /// The message string's UTF-8 bytes.
    Utf8String,
    /// The message is hex; its decoded bytes are the payload.
    HexString,
    /// Comma-separated decimal byte values, e.g. `"1,2,255"`.
    ByteArrayCsv,
}

/// One contract entry inside a transaction's raw data.
///
/// The signing core only needs to know how many entries there are;
/// parameters stay opaque.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    pub contract_type: String,
    #[serde(with = "crate::serde_bytes::hex_vec", default)]
    pub parameter: Vec<u8>,
}

impl Contract {
    pub fn new(contract_type: impl Into<String>) -> Self {
        Self {
            contract_type: contract_type.into(),
            parameter: Vec::new(),
        }
    }
}

/// A Tron transaction as the signing core sees it: serialized raw data,
/// the contract list inside it, and the signatures collected so far.
///
/// Signatures grow by append; this is the only state the core mutates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(with = "crate::serde_bytes::hex_vec")]
    pub raw_data: Vec<u8>,
    pub contracts: Vec<Contract>,
    #[serde(default)]
    pub signatures: Vec<Signature>,
}

impl Transaction {
    pub fn new(raw_data: Vec<u8>, contracts: Vec<Contract>) -> Self {
        Self {
            raw_data,
            contracts,
            signatures: Vec::new(),
        }
    }
}
