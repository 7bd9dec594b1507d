//! Signing-digest construction
//!
//! Pure functions that turn a transaction or a user message into the exact
//! 32 bytes handed to the keystore's signing primitive:
//! - transaction ids use double SHA-256, optionally chain-bound
//! - signed messages use keccak256 over a domain-separation prefix
//!
//! Nothing here performs I/O or touches key material; two equal payloads
//! always produce equal digests.

use crate::error::{SignError, SignResult};
use crate::types::MessageEncoding;
use sha2::{Digest, Sha256};
use tiny_keccak::{Hasher, Keccak};

/// Domain-separation prefix for Tron signed messages. Keeps a message
/// digest from ever colliding with a transaction digest.
const MESSAGE_PREFIX: &str = "\x19TRON Signed Message:\n";

/// Announced payload length in the legacy (v1) prefix. Always "32"
/// regardless of the actual payload length; existing verifiers expect
/// exactly these prefix bytes.
const LEGACY_ANNOUNCED_LEN: &str = "32";

/// Double SHA-256, Tron's canonical transaction-id hash.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    Sha256::digest(first).into()
}

/// Compute keccak256 hash
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut output);
    output
}

/// Digest for raw transaction bytes, with optional chain binding.
///
/// `chain_id` is a hex string (0x prefix accepted). When non-empty and
/// decodable, its bytes are mixed into the digest so the signature only
/// verifies on the intended network. Undecodable hex is treated as absent
/// rather than rejected; use [`decode_chain_id`] first when a hard failure
/// is wanted.
pub fn transaction_digest(raw: &[u8], chain_id: &str) -> [u8; 32] {
    let hash = sha256d(raw);
    if chain_id.is_empty() {
        return hash;
    }
    match hex::decode(chain_id.trim_start_matches("0x")) {
        Ok(chain_bytes) => bind_chain(hash, &chain_bytes),
        Err(_) => hash,
    }
}

/// Strict chain-id decoding for callers that want undecodable hex to fail
/// instead of being skipped.
pub fn decode_chain_id(chain_id: &str) -> SignResult<Option<Vec<u8>>> {
    if chain_id.is_empty() {
        return Ok(None);
    }
    hex::decode(chain_id.trim_start_matches("0x"))
        .map(Some)
        .map_err(|_| SignError::InvalidChainId(chain_id.to_owned()))
}

/// Mix decoded chain-id bytes into a transaction digest. Applied once per
/// signing call, never per contract.
fn bind_chain(hash: [u8; 32], chain_bytes: &[u8]) -> [u8; 32] {
    let mut bound = Vec::with_capacity(hash.len() + chain_bytes.len());
    bound.extend_from_slice(&hash);
    bound.extend_from_slice(chain_bytes);
    sha256d(&bound)
}

/// Legacy (v1) message digest.
///
/// The payload round-trips through hex the way the original wallet did;
/// the re-decoded bytes equal the message's UTF-8 bytes. The announced
/// length in the prefix is the fixed literal "32", not the payload length.
pub fn message_digest_v1(message: &str) -> [u8; 32] {
    let person_data = hex::decode(hex::encode(message.as_bytes())).unwrap_or_default();

    let mut data =
        Vec::with_capacity(MESSAGE_PREFIX.len() + LEGACY_ANNOUNCED_LEN.len() + person_data.len());
    data.extend_from_slice(MESSAGE_PREFIX.as_bytes());
    data.extend_from_slice(LEGACY_ANNOUNCED_LEN.as_bytes());
    data.extend_from_slice(&person_data);
    keccak256(&data)
}

/// Versioned (v2) message digest. Unlike v1, the prefix announces the true
/// decimal payload length.
pub fn message_digest_v2(message: &str, encoding: MessageEncoding) -> [u8; 32] {
    let payload = decode_message_payload(message, encoding);
    let prefix = format!("{}{}", MESSAGE_PREFIX, payload.len());

    let mut data = Vec::with_capacity(prefix.len() + payload.len());
    data.extend_from_slice(prefix.as_bytes());
    data.extend_from_slice(&payload);
    keccak256(&data)
}

/// Payload bytes for a v2 message under the given encoding.
///
/// Lenient by contract: undecodable hex yields an empty payload, and CSV
/// tokens that do not parse as 0-255 are dropped. Dapps in the field rely
/// on both behaviors.
pub fn decode_message_payload(message: &str, encoding: MessageEncoding) -> Vec<u8> {
    match encoding {
        MessageEncoding::Utf8String => message.as_bytes().to_vec(),
        MessageEncoding::HexString => {
            hex::decode(message.trim_start_matches("0x")).unwrap_or_default()
        }
        MessageEncoding::ByteArrayCsv => message
            .split(',')
            .filter_map(|token| token.parse::<u8>().ok())
            .collect(),
    }
}
