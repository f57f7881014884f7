//! tests/session_state_tests.rs
//! Session life cycle: ordering, buffer sizing, init validation, and the
//! generic constructor over other cipher ports

mod common;
use common::{TEST_ENC_KEY, TEST_IV, TEST_MAC_KEY};

use std::io::Cursor;
use symcrypt_rs::{
    decrypt_with_session, encrypt_with_session, Aes128HmacSha256Session, ChainMode,
    CipherAlgorithm, CipherPort, CryptError, Direction, EncryptThenMac, HmacSha256Port,
    SessionState, StreamOptions,
};

fn encrypting(mode: ChainMode) -> Aes128HmacSha256Session {
    let mut s = Aes128HmacSha256Session::new(mode);
    s.init_enc(&TEST_ENC_KEY, &TEST_MAC_KEY, &TEST_IV).unwrap();
    s
}

fn decrypting(mode: ChainMode) -> Aes128HmacSha256Session {
    let mut s = Aes128HmacSha256Session::new(mode);
    s.init_dec(&TEST_ENC_KEY, &TEST_MAC_KEY, &TEST_IV).unwrap();
    s
}

#[test]
fn lifecycle_states() {
    let mut s = Aes128HmacSha256Session::new(ChainMode::Cbc);
    assert_eq!(s.state(), SessionState::Uninitialized);
    s.init_enc(&TEST_ENC_KEY, &TEST_MAC_KEY, &TEST_IV).unwrap();
    assert_eq!(s.state(), SessionState::Encrypting);
    let mut out = [0u8; 64];
    s.final_plain_in(b"abc", &mut out).unwrap();
    assert_eq!(s.state(), SessionState::Finalized);
}

#[test]
fn out_of_order_calls() {
    let mut out = [0u8; 128];
    // (description, call) pairs, each on a fresh session
    let cases: Vec<(&str, Box<dyn Fn() -> Result<usize, CryptError>>)> = vec![
        ("plain_in before init", Box::new(|| {
            Aes128HmacSha256Session::new(ChainMode::Cbc).plain_in(b"x", &mut [0u8; 16])
        })),
        ("cipher_in on encrypting", Box::new(|| {
            encrypting(ChainMode::Cbc).cipher_in(&[0; 16], &mut [0u8; 16])
        })),
        ("plain_in on decrypting", Box::new(|| {
            decrypting(ChainMode::Ctr).plain_in(&[0; 16], &mut [0u8; 16])
        })),
        ("final_plain_in on decrypting", Box::new(|| {
            decrypting(ChainMode::Cbc).final_plain_in(b"", &mut [0u8; 64])
        })),
        ("final_cipher_in on encrypting", Box::new(|| {
            encrypting(ChainMode::Ctr).final_cipher_in(&[0; 48], &mut [0u8; 64])
        })),
    ];
    for (desc, call) in cases {
        assert!(matches!(call(), Err(CryptError::State(_))), "{desc}");
    }

    let mut s = encrypting(ChainMode::Cbc);
    s.final_plain_in(b"", &mut out).unwrap();
    assert!(matches!(s.final_plain_in(b"", &mut out), Err(CryptError::State(_))));
    assert!(matches!(
        s.init_dec(&TEST_ENC_KEY, &TEST_MAC_KEY, &TEST_IV),
        Err(CryptError::State(_))
    ));
}

#[test]
fn second_init_is_state_error() {
    let mut s = decrypting(ChainMode::Ctr);
    assert!(matches!(
        s.init_enc(&TEST_ENC_KEY, &TEST_MAC_KEY, &TEST_IV),
        Err(CryptError::State(_))
    ));
}

#[test]
fn undersized_outputs_are_crypto_errors() {
    let mut s = encrypting(ChainMode::Cbc);
    let mut small = [0u8; 16];
    assert!(matches!(
        s.plain_in(&[0u8; 32], &mut small),
        Err(CryptError::Crypto(_))
    ));
    assert_eq!(s.plain_in_len(32), 32);
    let mut fits = [0u8; 32];
    assert_eq!(s.plain_in(&[0u8; 32], &mut fits).unwrap(), 32);

    let mut d = decrypting(ChainMode::Cbc);
    assert_eq!(d.final_cipher_in_len(64), 32);
    assert!(matches!(
        d.final_cipher_in(&[0u8; 64], &mut [0u8; 31]),
        Err(CryptError::Crypto(_))
    ));
    assert_eq!(d.state(), SessionState::Decrypting);
}

#[test]
fn init_rejects_bad_lengths() {
    let cases: [(&[u8], &[u8], &[u8], &str); 3] = [
        (&[0; 24], &TEST_MAC_KEY, &TEST_IV, "aes-192 key"),
        (&TEST_ENC_KEY, &[0; 64], &TEST_IV, "long mac key"),
        (&TEST_ENC_KEY, &TEST_MAC_KEY, &[0; 12], "short iv"),
    ];
    for (key, mac, iv, desc) in cases {
        let mut s = Aes128HmacSha256Session::new(ChainMode::Ctr);
        assert!(matches!(s.init_enc(key, mac, iv), Err(CryptError::Init(_))), "{desc}");
        assert_eq!(s.state(), SessionState::Uninitialized, "{desc}");
    }
}

#[test]
fn minimum_final_sizes() {
    for mode in [ChainMode::Cbc, ChainMode::Ctr] {
        let s = encrypting(mode);
        assert_eq!(s.minimum_final_encrypt_in(), 16);
        assert_eq!(s.minimum_final_decrypt_in(), 48);
    }
}

#[test]
fn message_valid_is_false_until_verified() {
    let mut enc = encrypting(ChainMode::Cbc);
    assert!(!enc.message_valid());
    let mut sealed = [0u8; 64];
    let n = enc.final_plain_in(b"hi", &mut sealed).unwrap();
    assert!(!enc.message_valid());

    let mut dec = decrypting(ChainMode::Cbc);
    assert!(!dec.message_valid());
    let mut out = [0u8; 64];
    let m = dec.final_cipher_in(&sealed[..n], &mut out).unwrap();
    assert_eq!(&out[..m], b"hi");
    assert!(dec.message_valid());
}

#[test]
fn generic_session_over_tea() {
    // CBC over TEA: 8-byte blocks, 8-byte IV
    let key = [0x77u8; 16];
    let iv = [0x01u8; 8];
    let mac_key = [0x99u8; 32];
    let plain = b"sixty-four bit blocks work the same way".to_vec();

    let cipher = CipherPort::init(CipherAlgorithm::TEA_128, &key, Direction::Encrypt).unwrap();
    let mac = HmacSha256Port::new(&mac_key).unwrap();
    let mut enc = EncryptThenMac::with_ports(ChainMode::Cbc, Direction::Encrypt, cipher, mac, &iv)
        .unwrap();
    assert_eq!(enc.minimum_final_decrypt_in(), 8 + 32);
    let mut sealed: Vec<u8> = Vec::new();
    encrypt_with_session(&mut enc, Cursor::new(&plain), &mut sealed, &StreamOptions::new())
        .unwrap();
    assert_eq!(sealed.len(), 40 + 32);

    let cipher = CipherPort::init(CipherAlgorithm::TEA_128, &key, Direction::Decrypt).unwrap();
    let mac = HmacSha256Port::new(&mac_key).unwrap();
    let mut dec = EncryptThenMac::with_ports(ChainMode::Cbc, Direction::Decrypt, cipher, mac, &iv)
        .unwrap();
    let mut opened: Vec<u8> = Vec::new();
    let summary =
        decrypt_with_session(&mut dec, Cursor::new(&sealed), &mut opened, &StreamOptions::new())
            .unwrap();
    assert_eq!(opened, plain);
    assert_eq!(summary.message_valid, Some(true));
}

#[test]
fn with_ports_checks_iv_against_block_size() {
    let cipher = CipherPort::init(CipherAlgorithm::TEA_128, &[0; 16], Direction::Encrypt).unwrap();
    let mac = HmacSha256Port::new(&[0; 32]).unwrap();
    let err = EncryptThenMac::with_ports(ChainMode::Ctr, Direction::Encrypt, cipher, mac, &[0; 16])
        .err()
        .unwrap();
    assert!(matches!(err, CryptError::Init(_)));
}
