//! tests/codec_tests.rs
//! Key, scheme and signature blobs

mod common;
use common::{fixed_scheme, pattern, TEST_MAC_KEY};

use serde_json::Value;
use std::io::Cursor;
use symcrypt_rs::codec::{
    deserialize_key, deserialize_scheme, deserialize_signature, serialize_key, serialize_scheme,
    serialize_signature,
};
use symcrypt_rs::{
    decrypt_with_scheme, encrypt_with_scheme, CipherAlgorithm, CryptError, EncryptionScheme,
    KeyMetadata, SchemeAlgorithm, Signature, StreamOptions, SymmetricKey,
};

fn edit_scheme_json(scheme: &EncryptionScheme, edit: impl FnOnce(&mut Value)) -> Vec<u8> {
    let mut json: Value = serde_json::from_slice(&serialize_scheme(scheme).unwrap()).unwrap();
    edit(&mut json);
    serde_json::to_vec(&json).unwrap()
}

#[test]
fn key_blob_preserves_material_and_metadata() {
    for alg in [
        CipherAlgorithm::AES_192,
        CipherAlgorithm::TWOFISH_128,
        CipherAlgorithm::SIMON_128,
        CipherAlgorithm::TEA_128,
        CipherAlgorithm::RC4_128,
    ] {
        let meta = KeyMetadata::new()
            .with_name("archive")
            .with_purpose("backups")
            .with_owner("ops");
        let key = SymmetricKey::generate(alg, meta).unwrap();
        let back = deserialize_key(&serialize_key(&key).unwrap()).unwrap();
        assert_eq!(back.algorithm(), alg);
        assert_eq!(back.expose_key(), key.expose_key());
        assert_eq!(back.metadata().name(), "archive");
        assert_eq!(back.metadata().purpose(), "backups");
        assert_eq!(back.metadata().owner(), "ops");
        assert_eq!(back.metadata().not_after(), key.metadata().not_after());
    }
}

#[test]
fn reloaded_scheme_decrypts_original_ciphertext() {
    for alg in common::BOTH_SCHEMES {
        let scheme = EncryptionScheme::generate_scheme(alg, "reload").unwrap();
        let plain = pattern(1234);
        let mut sealed: Vec<u8> = Vec::new();
        encrypt_with_scheme(&scheme, Cursor::new(&plain), &mut sealed, &StreamOptions::new())
            .unwrap();

        let reloaded = deserialize_scheme(&serialize_scheme(&scheme).unwrap()).unwrap();
        assert_eq!(reloaded.algorithm(), alg);
        assert_eq!(reloaded.name(), "reload");
        let mut opened: Vec<u8> = Vec::new();
        decrypt_with_scheme(&reloaded, Cursor::new(&sealed), &mut opened, &StreamOptions::new())
            .unwrap();
        assert_eq!(opened, plain, "{alg}");
    }
}

#[test]
fn scheme_blob_names_mode_and_pad() {
    let cbc = fixed_scheme(SchemeAlgorithm::Aes128CbcHmacSha256Sympad, &TEST_MAC_KEY);
    let json: Value = serde_json::from_slice(&serialize_scheme(&cbc).unwrap()).unwrap();
    assert_eq!(json["mode"], "cbc");
    assert_eq!(json["pad"], "sympad");
    assert_eq!(json["name"], "fixed");
    assert!(json.get("message_id").is_none());

    let ctr = fixed_scheme(SchemeAlgorithm::Aes128CtrHmacSha256Sympad, &TEST_MAC_KEY);
    let json: Value = serde_json::from_slice(&serialize_scheme(&ctr).unwrap()).unwrap();
    assert_eq!(json["mode"], "ctr");
    assert_eq!(json["pad"], "none");
}

#[test]
fn inconsistent_scheme_blobs_are_rejected() {
    let scheme = fixed_scheme(SchemeAlgorithm::Aes128CbcHmacSha256Sympad, &TEST_MAC_KEY);
    let cases: Vec<(&str, Vec<u8>)> = vec![
        ("mode", edit_scheme_json(&scheme, |j| j["mode"] = "ctr".into())),
        ("pad", edit_scheme_json(&scheme, |j| j["pad"] = "pkcs7".into())),
        ("algorithm", edit_scheme_json(&scheme, |j| j["algorithm"] = "des-ecb".into())),
    ];
    for (desc, blob) in cases {
        let err = deserialize_scheme(&blob).err().unwrap();
        assert!(matches!(err, CryptError::Codec(_)), "{desc}: {err:?}");
    }

    let short_iv = edit_scheme_json(&scheme, |j| j["iv"] = "AAAA".into());
    assert!(matches!(deserialize_scheme(&short_iv), Err(CryptError::Init(_))));
}

#[test]
fn ctr_blob_written_with_sympad_pad_still_loads() {
    let scheme = fixed_scheme(SchemeAlgorithm::Aes128CtrHmacSha256Sympad, &TEST_MAC_KEY);
    let plain = pattern(777);
    let mut sealed: Vec<u8> = Vec::new();
    encrypt_with_scheme(&scheme, Cursor::new(&plain), &mut sealed, &StreamOptions::new()).unwrap();

    let blob = edit_scheme_json(&scheme, |j| j["pad"] = "sympad".into());
    let reloaded = deserialize_scheme(&blob).unwrap();
    assert_eq!(reloaded.algorithm(), SchemeAlgorithm::Aes128CtrHmacSha256Sympad);
    let mut opened: Vec<u8> = Vec::new();
    decrypt_with_scheme(&reloaded, Cursor::new(&sealed), &mut opened, &StreamOptions::new())
        .unwrap();
    assert_eq!(opened, plain);

    // re-serializing normalizes to the pad actually applied
    let json: Value = serde_json::from_slice(&serialize_scheme(&reloaded).unwrap()).unwrap();
    assert_eq!(json["pad"], "none");
}

#[test]
fn cbc_blob_with_pad_none_is_rejected() {
    let scheme = fixed_scheme(SchemeAlgorithm::Aes128CbcHmacSha256Sympad, &TEST_MAC_KEY);
    let blob = edit_scheme_json(&scheme, |j| j["pad"] = "none".into());
    assert!(matches!(deserialize_scheme(&blob), Err(CryptError::Codec(_))));

    let ctr = fixed_scheme(SchemeAlgorithm::Aes128CtrHmacSha256Sympad, &TEST_MAC_KEY);
    let blob = edit_scheme_json(&ctr, |j| j["pad"] = "pkcs7".into());
    assert!(matches!(deserialize_scheme(&blob), Err(CryptError::Codec(_))));
}

#[test]
fn scheme_requires_aes128_key() {
    let scheme = fixed_scheme(SchemeAlgorithm::Aes128CtrHmacSha256Sympad, &TEST_MAC_KEY);
    let twofish = SymmetricKey::generate(CipherAlgorithm::TWOFISH_128, KeyMetadata::new()).unwrap();
    let swapped = edit_scheme_json(&scheme, |j| {
        j["key"] = serde_json::from_slice(&serialize_key(&twofish).unwrap()).unwrap();
    });
    assert!(matches!(deserialize_scheme(&swapped), Err(CryptError::Init(_))));
}

#[test]
fn signature_blob() {
    let sig = Signature {
        signer: "release-bot".into(),
        algorithm: "ed25519".into(),
        signature: vec![0xde, 0xad, 0xbe, 0xef],
    };
    let blob = serialize_signature(&sig).unwrap();
    let json: Value = serde_json::from_slice(&blob).unwrap();
    assert_eq!(json["signature"], "3q2+7w==");
    assert_eq!(deserialize_signature(&blob).unwrap(), sig);

    let anonymous = br#"{"signer":"","algorithm":"ed25519","signature":""}"#;
    assert!(matches!(
        deserialize_signature(anonymous),
        Err(CryptError::Codec(_))
    ));
}
