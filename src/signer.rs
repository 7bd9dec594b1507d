//! Signing orchestration
//!
//! Composes account lookup, digest construction, the keystore's signing
//! primitive and recovery-byte normalization into the wallet's public
//! signing operations.
//!
//! Error surfaces are deliberately asymmetric: transaction signing returns
//! a typed [`SignError`], while message signing collapses every failure to
//! an empty string. Host apps ship against the empty-string contract, so it
//! stays.

use crate::digest;
use crate::error::{SignError, SignResult};
use crate::keystore::{Account, DerivationKind, KeyStore, KeystoreError};
use crate::types::{MessageEncoding, Signature, Transaction};
use zeroize::Zeroizing;

/// Exact-match account lookup.
///
/// Linear scan is fine at wallet account counts. No case folding or other
/// normalization; callers pass the canonical base58 form the keystore uses.
pub fn find_account<'a>(accounts: &'a [Account], address: &str) -> Option<&'a Account> {
    accounts.iter().find(|account| account.address() == address)
}

/// Sign raw transaction bytes.
///
/// The digest is the double-SHA256 transaction id, chain-bound when
/// `chain_id` is a non-empty hex string. The returned signature carries a
/// canonical recovery byte in `{0, 1}`.
pub fn sign_raw_transaction(
    keystore: &KeyStore,
    raw: &[u8],
    password: &str,
    address: &str,
    chain_id: &str,
) -> SignResult<Signature> {
    // In-call copy of the password, scrubbed on every exit path.
    let password = Zeroizing::new(password.to_owned());

    let account = find_account(keystore.accounts(), address)
        .ok_or_else(|| SignError::AccountNotFound(address.to_owned()))?;

    let hash = digest::transaction_digest(raw, chain_id);
    let signature = keystore.sign_hash(&hash, account, &password)?;

    crate::log_debug!("signer", "raw transaction signed", address = address);
    Ok(signature.normalize())
}

/// Sign a structured transaction, appending the signature to its list.
///
/// A transaction with no contracts is malformed. Only the first contract is
/// signed even when several are present; every entry would get the same
/// chain-bound digest anyway, and downstream consumers rely on the
/// single-entry signature array (see DESIGN.md).
pub fn sign_transaction(
    keystore: &KeyStore,
    mut tx: Transaction,
    password: &str,
    address: &str,
    chain_id: &str,
) -> SignResult<Transaction> {
    let password = Zeroizing::new(password.to_owned());

    let account = find_account(keystore.accounts(), address)
        .ok_or_else(|| SignError::AccountNotFound(address.to_owned()))?;

    if tx.contracts.is_empty() {
        return Err(SignError::MalformedTransaction(
            "empty contract list".to_owned(),
        ));
    }

    let hash = digest::transaction_digest(&tx.raw_data, chain_id);
    let signature = keystore.sign_hash(&hash, account, &password)?;
    tx.signatures.push(signature.normalize());

    crate::log_debug!(
        "signer",
        "transaction signed",
        address = address,
        contracts = tx.contracts.len(),
        signatures = tx.signatures.len(),
    );
    Ok(tx)
}

/// Sign a message with the legacy (v1) digest.
///
/// Returns 130 lowercase hex characters, or `""` on any failure (unknown
/// address, wrong password, keystore error alike).
pub fn sign_message(keystore: &KeyStore, message: &str, password: &str, address: &str) -> String {
    let hash = digest::message_digest_v1(message);
    match sign_message_hash(keystore, &hash, password, address) {
        Ok(signature) => signature.to_hex(),
        Err(e) => {
            crate::log_warn!("signer", "message signing failed", address = address, error = e);
            String::new()
        }
    }
}

/// Sign a message with the v2 digest under the given payload encoding.
///
/// Returns `"0x"` plus 130 hex characters, or `""` on any failure.
pub fn sign_message_v2(
    keystore: &KeyStore,
    message: &str,
    password: &str,
    address: &str,
    encoding: MessageEncoding,
) -> String {
    let hash = digest::message_digest_v2(message, encoding);
    match sign_message_hash(keystore, &hash, password, address) {
        Ok(signature) => format!("0x{}", signature.to_hex()),
        Err(e) => {
            crate::log_warn!("signer", "message signing failed", address = address, error = e);
            String::new()
        }
    }
}

fn sign_message_hash(
    keystore: &KeyStore,
    hash: &[u8; 32],
    password: &str,
    address: &str,
) -> SignResult<Signature> {
    let password = Zeroizing::new(password.to_owned());

    let account = find_account(keystore.accounts(), address)
        .ok_or_else(|| SignError::AccountNotFound(address.to_owned()))?;

    let signature = keystore.sign_hash(hash, account, &password)?;
    Ok(signature.normalize())
}

/// Create a new HD wallet account, delivering the result through a
/// completion callback.
///
/// The callback fires on the same call stack; the keystore finishes its
/// work before this function returns.
pub fn create_wallet_account<F>(keystore: &mut KeyStore, password: &str, completion: F)
where
    F: FnOnce(Result<Account, KeystoreError>),
{
    let password = Zeroizing::new(password.to_owned());
    let result = keystore.create_account(&password, DerivationKind::HierarchicalDeterministic);
    if let Ok(account) = &result {
        crate::log_info!("keystore", "account created", address = account.address());
    }
    completion(result);
}

/// Export an account's private key as hex, or `""` on any failure.
///
/// The decrypted key copy is zeroized before this returns; the hex string
/// handed back is the caller's to scrub.
pub fn export_private_key(keystore: &KeyStore, password: &str, address: &str) -> String {
    let password = Zeroizing::new(password.to_owned());

    let Some(account) = find_account(keystore.accounts(), address) else {
        return String::new();
    };
    match keystore.export_private_key(account, &password) {
        Ok(key) => hex::encode(&key[..]),
        Err(_) => String::new(),
    }
}

/// Export an account's mnemonic phrase, or `""` on any failure (including
/// accounts created from a raw key).
pub fn export_mnemonic(keystore: &KeyStore, password: &str, address: &str) -> String {
    let password = Zeroizing::new(password.to_owned());

    let Some(account) = find_account(keystore.accounts(), address) else {
        return String::new();
    };
    match keystore.export_mnemonic(account, &password) {
        Ok(phrase) => phrase.as_str().to_owned(),
        Err(_) => String::new(),
    }
}
