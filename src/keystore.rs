//! Password-protected key store
//!
//! In-memory store of Tron accounts whose secret material sits encrypted at
//! rest:
//! - AES-256-GCM for authenticated encryption
//! - Argon2id for key derivation from the password
//! - random salts and nonces per entry
//!
//! The signing core only ever exchanges 32-byte digests and 65-byte
//! signatures with this module; plaintext keys exist for the duration of a
//! single call and are zeroized on every exit path.

#![allow(deprecated)] // GenericArray::from_slice deprecated in generic-array 1.x

use crate::digest::{keccak256, sha256d};
use crate::types::Signature;
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use bitcoin::base58;
use rand::RngCore;
use secp256k1::{ecdsa::RecoveryId, Message, PublicKey, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use zeroize::{Zeroize, Zeroizing};

/// Tron mainnet address prefix byte.
const ADDRESS_PREFIX: u8 = 0x41;

/// Errors surfaced by keystore operations.
#[derive(Debug, Error)]
pub enum KeystoreError {
    #[error("decryption failed - incorrect password or corrupted key entry")]
    WrongPassword,

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("invalid key material: {0}")]
    InvalidKey(String),

    #[error("account has no mnemonic (imported key)")]
    NoMnemonic,

    #[error("unknown account {0}")]
    UnknownAccount(String),

    #[error("crypto error: {0}")]
    Crypto(String),
}

/// Opaque account handle. Exposes the canonical base58check address and
/// nothing else; key material never leaves the store through it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    address: String,
}

impl Account {
    pub fn address(&self) -> &str {
        &self.address
    }
}

/// How an account's key material was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DerivationKind {
    /// BIP-39 mnemonic, BIP-32 path m/44'/195'/0'/0/0.
    HierarchicalDeterministic,
    /// Freshly generated or imported raw private key; no mnemonic.
    PrivateKeyOnly,
}

/// Key derivation parameters for the password KDF.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB
    pub memory_cost: u32,
    /// Time cost (iterations)
    pub time_cost: u32,
    /// Parallelism
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            // 64 MiB memory, 3 iterations, 4 parallel lanes
            memory_cost: 65536,
            time_cost: 3,
            parallelism: 4,
        }
    }
}

/// An encrypted secret: ciphertext plus the salt/nonce needed to open it.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EncryptedBlob {
    salt: [u8; 32],
    nonce: [u8; 12],
    #[serde(with = "crate::serde_bytes::hex_vec")]
    ciphertext: Vec<u8>,
}

/// Stored material for one account.
#[derive(Debug, Clone)]
struct KeyEntry {
    key: EncryptedBlob,
    mnemonic: Option<EncryptedBlob>,
}

/// In-memory password-protected key store.
pub struct KeyStore {
    accounts: Vec<Account>,
    entries: HashMap<String, KeyEntry>,
    kdf_params: KdfParams,
}

impl Default for KeyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyStore {
    pub fn new() -> Self {
        Self::with_kdf_params(KdfParams::default())
    }

    /// Tests and constrained hosts can lower the KDF cost.
    pub fn with_kdf_params(kdf_params: KdfParams) -> Self {
        Self {
            accounts: Vec::new(),
            entries: HashMap::new(),
            kdf_params,
        }
    }

    /// All accounts, in creation order.
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    /// Create a new account protected by `password`.
    ///
    /// `HierarchicalDeterministic` generates a BIP-39 mnemonic and derives
    /// the key at m/44'/195'/0'/0/0; `PrivateKeyOnly` draws a random key.
    pub fn create_account(
        &mut self,
        password: &str,
        kind: DerivationKind,
    ) -> Result<Account, KeystoreError> {
        match kind {
            DerivationKind::HierarchicalDeterministic => {
                let mut entropy = [0u8; 16];
                OsRng.fill_bytes(&mut entropy);
                let mnemonic = bip39::Mnemonic::from_entropy(&entropy)
                    .map_err(|e| KeystoreError::KeyDerivation(e.to_string()))?;
                entropy.zeroize();

                let seed = Zeroizing::new(mnemonic.to_seed_normalized(""));
                let secret = derive_tron_key(&seed[..])?;

                let mut phrase = mnemonic.to_string();
                let mnemonic_blob = seal(phrase.as_bytes(), password, &self.kdf_params)?;
                phrase.zeroize();

                self.insert(secret, Some(mnemonic_blob), password)
            }
            DerivationKind::PrivateKeyOnly => {
                let secret = SecretKey::new(&mut rand::thread_rng());
                self.insert(secret, None, password)
            }
        }
    }

    /// Import an existing raw private key.
    pub fn import_private_key(
        &mut self,
        secret_bytes: &[u8],
        password: &str,
    ) -> Result<Account, KeystoreError> {
        let secret = SecretKey::from_slice(secret_bytes)
            .map_err(|e| KeystoreError::InvalidKey(e.to_string()))?;
        self.insert(secret, None, password)
    }

    /// Sign a 32-byte digest with the account's key.
    ///
    /// Returns a 65-byte recoverable signature with V in the `{27, 28}`
    /// convention; callers normalize it to `{0, 1}`.
    pub fn sign_hash(
        &self,
        hash: &[u8; 32],
        account: &Account,
        password: &str,
    ) -> Result<Signature, KeystoreError> {
        let entry = self.entry(account)?;
        let secret_bytes = open(&entry.key, password, &self.kdf_params)?;
        let secret = SecretKey::from_slice(&secret_bytes)
            .map_err(|e| KeystoreError::InvalidKey(e.to_string()))?;

        let message = Message::from_digest_slice(hash)
            .map_err(|e| KeystoreError::Crypto(e.to_string()))?;
        let secp = Secp256k1::new();
        let (recovery_id, compact) = secp
            .sign_ecdsa_recoverable(&message, &secret)
            .serialize_compact();

        let v = 27 + recovery_id.to_i32() as u8;
        Ok(Signature::from_parts(&compact, v))
    }

    /// Decrypt and return the account's 32-byte private key. The returned
    /// buffer zeroizes itself on drop.
    pub fn export_private_key(
        &self,
        account: &Account,
        password: &str,
    ) -> Result<Zeroizing<Vec<u8>>, KeystoreError> {
        let entry = self.entry(account)?;
        open(&entry.key, password, &self.kdf_params)
    }

    /// Decrypt and return the account's mnemonic phrase. Fails for accounts
    /// created from a raw key.
    pub fn export_mnemonic(
        &self,
        account: &Account,
        password: &str,
    ) -> Result<Zeroizing<String>, KeystoreError> {
        let entry = self.entry(account)?;
        let blob = entry.mnemonic.as_ref().ok_or(KeystoreError::NoMnemonic)?;
        let bytes = open(blob, password, &self.kdf_params)?;
        let phrase = std::str::from_utf8(&bytes)
            .map_err(|_| KeystoreError::Crypto("mnemonic is not valid UTF-8".into()))?;
        Ok(Zeroizing::new(phrase.to_owned()))
    }

    fn entry(&self, account: &Account) -> Result<&KeyEntry, KeystoreError> {
        self.entries
            .get(account.address())
            .ok_or_else(|| KeystoreError::UnknownAccount(account.address().to_owned()))
    }

    fn insert(
        &mut self,
        secret: SecretKey,
        mnemonic: Option<EncryptedBlob>,
        password: &str,
    ) -> Result<Account, KeystoreError> {
        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret);
        let address = tron_address(&public_key);

        let mut secret_bytes = secret.secret_bytes();
        let key_blob = seal(&secret_bytes, password, &self.kdf_params);
        secret_bytes.zeroize();
        let key = key_blob?;

        let account = Account {
            address: address.clone(),
        };
        self.accounts.push(account.clone());
        self.entries.insert(address, KeyEntry { key, mnemonic });
        Ok(account)
    }
}

/// Recover the public key from a digest and a normalized 65-byte signature.
///
/// Used by callers that verify a signature really came from an account.
pub fn recover_public_key(
    hash: &[u8; 32],
    signature: &Signature,
) -> Result<PublicKey, KeystoreError> {
    let v = signature.recovery_byte();
    let recovery_id = if v >= 27 { v - 27 } else { v };
    let rec_id = RecoveryId::from_i32(recovery_id as i32)
        .map_err(|e| KeystoreError::Crypto(e.to_string()))?;

    let message = Message::from_digest_slice(hash)
        .map_err(|e| KeystoreError::Crypto(e.to_string()))?;
    let recoverable =
        secp256k1::ecdsa::RecoverableSignature::from_compact(&signature.as_bytes()[..64], rec_id)
            .map_err(|e| KeystoreError::Crypto(e.to_string()))?;

    Secp256k1::new()
        .recover_ecdsa(&message, &recoverable)
        .map_err(|e| KeystoreError::Crypto(e.to_string()))
}

/// Encode a Tron base58check address from a public key: keccak256 of the
/// uncompressed key, last 20 bytes, 0x41 prefix, double-SHA256 checksum.
pub fn tron_address(public_key: &PublicKey) -> String {
    let uncompressed = public_key.serialize_uncompressed();
    let hash = keccak256(&uncompressed[1..]); // skip the 04 prefix

    let mut payload = vec![ADDRESS_PREFIX];
    payload.extend_from_slice(&hash[12..]);

    let checksum = sha256d(&payload);
    payload.extend_from_slice(&checksum[..4]);

    base58::encode(&payload)
}

/// Derive the Tron key at m/44'/195'/0'/0/0 from a BIP-39 seed.
fn derive_tron_key(seed: &[u8]) -> Result<SecretKey, KeystoreError> {
    use bitcoin::bip32::{DerivationPath, Xpriv};
    use std::str::FromStr;

    let secp = Secp256k1::new();

    let master = Xpriv::new_master(bitcoin::Network::Bitcoin, seed)
        .map_err(|e| KeystoreError::KeyDerivation(e.to_string()))?;

    let path = DerivationPath::from_str("m/44'/195'/0'/0/0")
        .map_err(|e| KeystoreError::KeyDerivation(e.to_string()))?;

    let derived = master
        .derive_priv(&secp, &path)
        .map_err(|e| KeystoreError::KeyDerivation(e.to_string()))?;

    Ok(derived.private_key)
}

/// Encrypt a secret under a password-derived key.
fn seal(
    plaintext: &[u8],
    password: &str,
    params: &KdfParams,
) -> Result<EncryptedBlob, KeystoreError> {
    let mut salt = [0u8; 32];
    OsRng.fill_bytes(&mut salt);

    let mut nonce_bytes = [0u8; 12];
    OsRng.fill_bytes(&mut nonce_bytes);

    let mut key = derive_key(password, &salt, params)?;
    let cipher = Aes256Gcm::new_from_slice(&key)
        .map_err(|e| KeystoreError::Crypto(format!("failed to create cipher: {}", e)))?;
    key.zeroize();

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|e| KeystoreError::Crypto(format!("encryption failed: {}", e)))?;

    Ok(EncryptedBlob {
        salt,
        nonce: nonce_bytes,
        ciphertext,
    })
}

/// Decrypt a secret. A wrong password fails the GCM tag check and maps to
/// [`KeystoreError::WrongPassword`].
fn open(
    blob: &EncryptedBlob,
    password: &str,
    params: &KdfParams,
) -> Result<Zeroizing<Vec<u8>>, KeystoreError> {
    let mut key = derive_key(password, &blob.salt, params)?;
    let cipher = Aes256Gcm::new_from_slice(&key)
        .map_err(|e| KeystoreError::Crypto(format!("failed to create cipher: {}", e)))?;
    key.zeroize();

    let plaintext = cipher
        .decrypt(Nonce::from_slice(&blob.nonce), blob.ciphertext.as_ref())
        .map_err(|_| KeystoreError::WrongPassword)?;

    Ok(Zeroizing::new(plaintext))
}

/// Derive a 32-byte encryption key from the password using Argon2id.
fn derive_key(
    password: &str,
    salt: &[u8],
    params: &KdfParams,
) -> Result<[u8; 32], KeystoreError> {
    use argon2::{Algorithm, Argon2, Params, Version};

    let argon2_params = Params::new(
        params.memory_cost,
        params.time_cost,
        params.parallelism,
        Some(32),
    )
    .map_err(|e| KeystoreError::KeyDerivation(e.to_string()))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut key = [0u8; 32];
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut key)
        .map_err(|e| KeystoreError::KeyDerivation(e.to_string()))?;
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> KeyStore {
        // Cheap KDF so the suite stays fast
        KeyStore::with_kdf_params(KdfParams {
            memory_cost: 1024,
            time_cost: 1,
            parallelism: 1,
        })
    }

    const TEST_KEY: [u8; 32] = [0x11; 32];

    #[test]
    fn test_create_hd_account() {
        let mut store = test_store();
        let account = store
            .create_account("hunter22", DerivationKind::HierarchicalDeterministic)
            .unwrap();

        assert!(account.address().starts_with('T'));
        assert_eq!(store.accounts().len(), 1);
    }

    #[test]
    fn test_export_mnemonic_roundtrip() {
        let mut store = test_store();
        let account = store
            .create_account("hunter22", DerivationKind::HierarchicalDeterministic)
            .unwrap();

        let phrase = store.export_mnemonic(&account, "hunter22").unwrap();
        let mnemonic = bip39::Mnemonic::parse_normalized(phrase.as_str()).unwrap();
        assert_eq!(mnemonic.word_count(), 12);
    }

    #[test]
    fn test_wrong_password_fails() {
        let mut store = test_store();
        let account = store
            .create_account("hunter22", DerivationKind::PrivateKeyOnly)
            .unwrap();

        let result = store.sign_hash(&[0u8; 32], &account, "wrong");
        assert!(matches!(result, Err(KeystoreError::WrongPassword)));

        let result = store.export_private_key(&account, "wrong");
        assert!(matches!(result, Err(KeystoreError::WrongPassword)));
    }

    #[test]
    fn test_no_mnemonic_for_imported_key() {
        let mut store = test_store();
        let account = store.import_private_key(&TEST_KEY, "pw").unwrap();

        let result = store.export_mnemonic(&account, "pw");
        assert!(matches!(result, Err(KeystoreError::NoMnemonic)));
    }

    #[test]
    fn test_export_private_key_roundtrip() {
        let mut store = test_store();
        let account = store.import_private_key(&TEST_KEY, "pw").unwrap();

        let exported = store.export_private_key(&account, "pw").unwrap();
        assert_eq!(&exported[..], &TEST_KEY);
    }

    #[test]
    fn test_sign_hash_is_deterministic_and_recoverable() {
        let mut store = test_store();
        let account = store.import_private_key(&TEST_KEY, "pw").unwrap();
        let hash = crate::digest::sha256d(b"payload");

        let first = store.sign_hash(&hash, &account, "pw").unwrap();
        let second = store.sign_hash(&hash, &account, "pw").unwrap();
        assert_eq!(first.as_bytes(), second.as_bytes());

        // Keystore output carries the legacy {27, 28} recovery convention
        assert!(first.recovery_byte() == 27 || first.recovery_byte() == 28);

        let public_key = recover_public_key(&hash, &first).unwrap();
        assert_eq!(tron_address(&public_key), account.address());
    }

    #[test]
    fn test_import_rejects_invalid_key() {
        let mut store = test_store();
        assert!(store.import_private_key(&[0u8; 31], "pw").is_err());
        // All-zero scalar is not a valid secp256k1 key
        assert!(store.import_private_key(&[0u8; 32], "pw").is_err());
    }
}
