//! End-to-end signing scenarios against a real keystore.

use tron_wallet_core::digest::{message_digest_v1, message_digest_v2, transaction_digest};
use tron_wallet_core::keystore::{recover_public_key, tron_address};
use tron_wallet_core::{
    create_wallet_account, sign_message, sign_message_v2, sign_raw_transaction, sign_transaction,
    Contract, KdfParams, KeyStore, MessageEncoding, SignError, Signature, Transaction,
};

const PASSWORD: &str = "correct horse battery staple";

fn cheap_kdf() -> KdfParams {
    KdfParams {
        memory_cost: 1024,
        time_cost: 1,
        parallelism: 1,
    }
}

fn wallet() -> (KeyStore, String) {
    let mut keystore = KeyStore::with_kdf_params(cheap_kdf());
    let mut address = String::new();
    create_wallet_account(&mut keystore, PASSWORD, |result| {
        address = result.expect("account creation succeeds").address().to_owned();
    });
    assert!(address.starts_with('T'));
    (keystore, address)
}

#[test]
fn message_signature_recovers_to_signer() {
    let (keystore, address) = wallet();

    let hex_sig = sign_message(&keystore, "hello", PASSWORD, &address);
    assert_eq!(hex_sig.len(), 130);

    let bytes = hex::decode(&hex_sig).unwrap();
    let signature = Signature::from_slice(&bytes).unwrap();
    assert!(signature.recovery_byte() <= 1);

    let hash = message_digest_v1("hello");
    let public_key = recover_public_key(&hash, &signature).unwrap();
    assert_eq!(tron_address(&public_key), address);
}

#[test]
fn message_signing_is_deterministic_end_to_end() {
    let (keystore, address) = wallet();

    let first = sign_message(&keystore, "hello", PASSWORD, &address);
    let second = sign_message(&keystore, "hello", PASSWORD, &address);
    assert_eq!(first, second);
    assert!(!first.is_empty());
}

#[test]
fn v2_signature_recovers_under_each_encoding() {
    let (keystore, address) = wallet();

    for (message, encoding) in [
        ("hello", MessageEncoding::Utf8String),
        ("48656c6c6f", MessageEncoding::HexString),
        ("1,2,3", MessageEncoding::ByteArrayCsv),
    ] {
        let hex_sig = sign_message_v2(&keystore, message, PASSWORD, &address, encoding);
        assert!(hex_sig.starts_with("0x"), "{encoding:?}");

        let bytes = hex::decode(hex_sig.trim_start_matches("0x")).unwrap();
        let signature = Signature::from_slice(&bytes).unwrap();

        let hash = message_digest_v2(message, encoding);
        let public_key = recover_public_key(&hash, &signature).unwrap();
        assert_eq!(tron_address(&public_key), address, "{encoding:?}");
    }
}

#[test]
fn transaction_signature_recovers_with_chain_binding() {
    let (keystore, address) = wallet();
    let raw = b"serialized transaction raw data";

    let signature = sign_raw_transaction(&keystore, raw, PASSWORD, &address, "c0de").unwrap();

    let hash = transaction_digest(raw, "c0de");
    let public_key = recover_public_key(&hash, &signature).unwrap();
    assert_eq!(tron_address(&public_key), address);
}

#[test]
fn structured_transaction_collects_signature() {
    let (keystore, address) = wallet();
    let tx = Transaction::new(
        b"serialized transaction raw data".to_vec(),
        vec![Contract::new("TransferContract")],
    );

    let signed = sign_transaction(&keystore, tx, PASSWORD, &address, "").unwrap();
    assert_eq!(signed.signatures.len(), 1);

    let hash = transaction_digest(&signed.raw_data, "");
    let public_key = recover_public_key(&hash, &signed.signatures[0]).unwrap();
    assert_eq!(tron_address(&public_key), address);
}

#[test]
fn unknown_multibyte_address_collapses_to_empty_string() {
    let (keystore, _) = wallet();

    // The failure path logs the caller-supplied address; a multibyte
    // lookup string must still come back as "", never a panic
    assert_eq!(sign_message(&keystore, "hello", PASSWORD, "TT世界世界"), "");
    assert_eq!(
        sign_message_v2(&keystore, "hello", PASSWORD, "TT世界世界", MessageEncoding::Utf8String),
        ""
    );
}

#[test]
fn failures_follow_the_surface_contract() {
    let (keystore, address) = wallet();

    // Transaction surface: typed errors
    let err = sign_raw_transaction(&keystore, b"tx", PASSWORD, "TUnknownAddr", "").unwrap_err();
    assert!(matches!(err, SignError::AccountNotFound(_)));

    let err = sign_raw_transaction(&keystore, b"tx", "bad password", &address, "").unwrap_err();
    assert!(matches!(err, SignError::WrongPassword));

    // Message surface: everything collapses to ""
    assert_eq!(sign_message(&keystore, "hello", "bad password", &address), "");
    assert_eq!(sign_message(&keystore, "hello", PASSWORD, "TUnknownAddr"), "");
    assert_eq!(
        sign_message_v2(&keystore, "hello", "bad password", &address, MessageEncoding::Utf8String),
        ""
    );
}
