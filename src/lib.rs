//! Tron Wallet Signing Core
//!
//! Digest construction and signature normalization for a Tron wallet
//! backed by a password-protected key store.
//!
//! # Architecture
//!
//! - **digest**: the byte sequences that actually get signed — double-SHA256
//!   transaction ids with optional chain binding, and keccak256 message
//!   digests behind the `"\x19TRON Signed Message:\n"` domain prefix
//! - **keystore**: encrypted-at-rest account store (AES-256-GCM + Argon2id)
//!   exposing the 32-byte-digest signing primitive
//! - **signer**: the public operations — sign raw/structured transactions,
//!   sign messages (legacy v1 and v2 encodings), create and export accounts
//! - **types**: signatures, transactions and message encodings
//!
//! # Security
//!
//! Passwords and exported key material are held in `zeroize`-backed buffers
//! scrubbed on every exit path. Log output redacts secrets by field name.
//!
//! # Example
//!
//! ```rust,ignore
//! use tron_wallet_core::{sign_message, KeyStore};
//!
//! let mut keystore = KeyStore::new();
//! let mut address = String::new();
//! tron_wallet_core::create_wallet_account(&mut keystore, "password", |result| {
//!     address = result.expect("account created").address().to_owned();
//! });
//!
//! let sig = sign_message(&keystore, "hello", "password", &address);
//! println!("signature: {sig}");
//! ```

pub mod digest;
pub mod error;
pub mod keystore;
pub mod logging;
pub mod serde_bytes;
pub mod signer;
pub mod types;

// Re-export key types for convenience
pub use error::{SignError, SignResult};
pub use keystore::{Account, DerivationKind, KdfParams, KeyStore, KeystoreError};
pub use types::{Contract, MessageEncoding, Signature, Transaction, SIGNATURE_LEN};

// Re-export the signing operations at crate root
pub use signer::{
    create_wallet_account, export_mnemonic, export_private_key, find_account, sign_message,
    sign_message_v2, sign_raw_transaction, sign_transaction,
};

// Digest builders are part of the public surface; verifiers need them
pub use digest::{keccak256, message_digest_v1, message_digest_v2, sha256d, transaction_digest};
