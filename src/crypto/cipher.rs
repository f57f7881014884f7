//! src/crypto/cipher.rs
//! Block-cipher port: one uniform keyed transform over AES, Twofish, Simon, TEA and RC4
//!
//! The port exposes whole-block transforms only. Partial blocks, padding and
//! chaining are the caller's business (see `padding`, `stream` and `scheme`).

use crate::consts::{BLOCK_SIZE_16, BLOCK_SIZE_8};
use crate::crypto::simon::Simon128;
use crate::crypto::tea::Tea;
use crate::error::CryptError;
use aes::cipher::consts::U16;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit, StreamCipher};
use aes::{Aes128, Aes192, Aes256};
use rc4::Rc4;
use std::fmt;
use std::str::FromStr;
use twofish::Twofish;

/// Uniform capability over a keyed block transform.
///
/// `encrypt_block` / `decrypt_block` transform exactly [`block_size`](Self::block_size)
/// bytes in place. Any other length is rejected.
pub trait BlockCipher {
    /// Fixed block size B in bytes.
    fn block_size(&self) -> usize;

    /// Encrypt one block in place.
    fn encrypt_block(&mut self, block: &mut [u8]) -> Result<(), CryptError>;

    /// Decrypt one block in place.
    fn decrypt_block(&mut self, block: &mut [u8]) -> Result<(), CryptError>;
}

/// Which way a port was keyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

/// Cipher family, independent of key size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipherFamily {
    Aes,
    Twofish,
    Simon,
    Tea,
    Rc4,
}

impl CipherFamily {
    pub const fn name(self) -> &'static str {
        match self {
            CipherFamily::Aes => "aes",
            CipherFamily::Twofish => "twofish",
            CipherFamily::Simon => "simon",
            CipherFamily::Tea => "tea",
            CipherFamily::Rc4 => "rc4",
        }
    }

    /// Block size B. RC4 is a stream cipher; 8 is its buffering unit only.
    pub const fn block_size(self) -> usize {
        match self {
            CipherFamily::Aes | CipherFamily::Twofish | CipherFamily::Simon => BLOCK_SIZE_16,
            CipherFamily::Tea | CipherFamily::Rc4 => BLOCK_SIZE_8,
        }
    }

    /// Key sizes (bits) this family can be keyed with.
    pub const fn supported_key_bits(self) -> &'static [u32] {
        match self {
            CipherFamily::Aes | CipherFamily::Twofish => &[128, 192, 256],
            CipherFamily::Simon | CipherFamily::Tea | CipherFamily::Rc4 => &[128],
        }
    }
}

/// Algorithm tag: family plus key size, printed as e.g. `aes-128`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CipherAlgorithm {
    family: CipherFamily,
    key_bits: u32,
}

impl CipherAlgorithm {
    pub const AES_128: Self = Self::known(CipherFamily::Aes, 128);
    pub const AES_192: Self = Self::known(CipherFamily::Aes, 192);
    pub const AES_256: Self = Self::known(CipherFamily::Aes, 256);
    pub const TWOFISH_128: Self = Self::known(CipherFamily::Twofish, 128);
    pub const TWOFISH_192: Self = Self::known(CipherFamily::Twofish, 192);
    pub const TWOFISH_256: Self = Self::known(CipherFamily::Twofish, 256);
    pub const SIMON_128: Self = Self::known(CipherFamily::Simon, 128);
    pub const TEA_128: Self = Self::known(CipherFamily::Tea, 128);
    pub const RC4_128: Self = Self::known(CipherFamily::Rc4, 128);

    const fn known(family: CipherFamily, key_bits: u32) -> Self {
        Self { family, key_bits }
    }

    /// Build a tag, rejecting key sizes the family does not support.
    pub fn new(family: CipherFamily, key_bits: u32) -> Result<Self, CryptError> {
        if !family.supported_key_bits().contains(&key_bits) {
            return Err(CryptError::Init(format!(
                "{} does not support {key_bits}-bit keys",
                family.name()
            )));
        }
        Ok(Self { family, key_bits })
    }

    pub const fn family(&self) -> CipherFamily {
        self.family
    }

    pub const fn key_bits(&self) -> u32 {
        self.key_bits
    }

    /// Key length in bytes (`key_bits / 8`).
    pub const fn key_len(&self) -> usize {
        (self.key_bits / 8) as usize
    }

    pub const fn block_size(&self) -> usize {
        self.family.block_size()
    }
}

impl fmt::Display for CipherAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.family.name(), self.key_bits)
    }
}

impl FromStr for CipherAlgorithm {
    type Err = CryptError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let unsupported = || CryptError::Init(format!("unsupported cipher algorithm '{tag}'"));
        let (family, bits) = tag.rsplit_once('-').ok_or_else(unsupported)?;
        let family = match family.to_ascii_lowercase().as_str() {
            "aes" => CipherFamily::Aes,
            "twofish" => CipherFamily::Twofish,
            "simon" => CipherFamily::Simon,
            "tea" => CipherFamily::Tea,
            "rc4" => CipherFamily::Rc4,
            _ => return Err(unsupported()),
        };
        let bits: u32 = bits.parse().map_err(|_| unsupported())?;
        CipherAlgorithm::new(family, bits)
    }
}

enum Engine {
    Aes128(Box<Aes128>),
    Aes192(Box<Aes192>),
    Aes256(Box<Aes256>),
    Twofish(Box<Twofish>),
    Simon(Box<Simon128>),
    Tea(Tea),
    Rc4(Box<Rc4<U16>>),
}

/// A keyed block transform for one [`CipherAlgorithm`] and one [`Direction`].
pub struct CipherPort {
    algorithm: CipherAlgorithm,
    direction: Direction,
    engine: Engine,
}

impl fmt::Debug for CipherPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherPort")
            .field("algorithm", &self.algorithm)
            .field("direction", &self.direction)
            .finish_non_exhaustive()
    }
}

impl CipherPort {
    /// Key the transform. Fails with [`CryptError::Init`] if `key.len()` is not
    /// `algorithm.key_bits() / 8`.
    pub fn init(
        algorithm: CipherAlgorithm,
        key: &[u8],
        direction: Direction,
    ) -> Result<Self, CryptError> {
        if key.len() != algorithm.key_len() {
            return Err(CryptError::Init(format!(
                "{algorithm}: expected {}-byte key, got {}",
                algorithm.key_len(),
                key.len()
            )));
        }
        let bad_key = |_| CryptError::Init(format!("{algorithm}: key rejected by cipher"));

        let engine = match (algorithm.family(), algorithm.key_bits()) {
            (CipherFamily::Aes, 128) => Engine::Aes128(Box::new(
                Aes128::new_from_slice(key).map_err(bad_key)?,
            )),
            (CipherFamily::Aes, 192) => Engine::Aes192(Box::new(
                Aes192::new_from_slice(key).map_err(bad_key)?,
            )),
            (CipherFamily::Aes, 256) => Engine::Aes256(Box::new(
                Aes256::new_from_slice(key).map_err(bad_key)?,
            )),
            (CipherFamily::Twofish, _) => Engine::Twofish(Box::new(
                Twofish::new_from_slice(key).map_err(bad_key)?,
            )),
            (CipherFamily::Simon, 128) => {
                let key: &[u8; 16] = key
                    .try_into()
                    .map_err(|_| CryptError::Init("simon: key must be 16 bytes".into()))?;
                Engine::Simon(Box::new(Simon128::new(key)))
            }
            (CipherFamily::Tea, _) => {
                let key: &[u8; 16] = key
                    .try_into()
                    .map_err(|_| CryptError::Init("tea: key must be 16 bytes".into()))?;
                Engine::Tea(Tea::new(key))
            }
            (CipherFamily::Rc4, _) => Engine::Rc4(Box::new(
                Rc4::<U16>::new_from_slice(key).map_err(bad_key)?,
            )),
            (family, bits) => {
                return Err(CryptError::Init(format!(
                    "{} does not support {bits}-bit keys",
                    family.name()
                )))
            }
        };

        tracing::trace!(%algorithm, ?direction, "cipher port keyed");
        Ok(Self {
            algorithm,
            direction,
            engine,
        })
    }

    pub fn algorithm(&self) -> CipherAlgorithm {
        self.algorithm
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    fn check(&self, block: &[u8], wanted: Direction) -> Result<(), CryptError> {
        if block.len() != self.algorithm.block_size() {
            return Err(CryptError::Crypto(format!(
                "{}: block must be {} bytes, got {}",
                self.algorithm,
                self.algorithm.block_size(),
                block.len()
            )));
        }
        // RC4 is a keystream XOR: one state serves both directions.
        if self.direction != wanted && self.algorithm.family() != CipherFamily::Rc4 {
            return Err(CryptError::State(format!(
                "{}: port keyed for {:?}, called for {wanted:?}",
                self.algorithm, self.direction
            )));
        }
        Ok(())
    }

    fn transform(&mut self, block: &mut [u8], direction: Direction) -> Result<(), CryptError> {
        self.check(block, direction)?;
        let encrypt = direction == Direction::Encrypt;
        match &mut self.engine {
            Engine::Aes128(c) => aes_like(c.as_ref(), block, encrypt),
            Engine::Aes192(c) => aes_like(c.as_ref(), block, encrypt),
            Engine::Aes256(c) => aes_like(c.as_ref(), block, encrypt),
            Engine::Twofish(c) => aes_like(c.as_ref(), block, encrypt),
            Engine::Simon(simon) => {
                let block: &mut [u8; 16] = block
                    .try_into()
                    .map_err(|_| CryptError::Crypto("simon: block must be 16 bytes".into()))?;
                if encrypt {
                    simon.encrypt_block(block);
                } else {
                    simon.decrypt_block(block);
                }
            }
            Engine::Tea(tea) => {
                let block: &mut [u8; 8] = block
                    .try_into()
                    .map_err(|_| CryptError::Crypto("tea: block must be 8 bytes".into()))?;
                if encrypt {
                    tea.encrypt_block(block);
                } else {
                    tea.decrypt_block(block);
                }
            }
            Engine::Rc4(rc4) => rc4.apply_keystream(block),
        }
        Ok(())
    }
}

#[inline(always)]
fn aes_like<C>(cipher: &C, block: &mut [u8], encrypt: bool)
where
    C: BlockEncrypt + BlockDecrypt<BlockSize = U16>,
{
    let block = GenericArray::from_mut_slice(block);
    if encrypt {
        cipher.encrypt_block(block);
    } else {
        cipher.decrypt_block(block);
    }
}

impl BlockCipher for CipherPort {
    fn block_size(&self) -> usize {
        self.algorithm.block_size()
    }

    fn encrypt_block(&mut self, block: &mut [u8]) -> Result<(), CryptError> {
        self.transform(block, Direction::Encrypt)
    }

    fn decrypt_block(&mut self, block: &mut [u8]) -> Result<(), CryptError> {
        self.transform(block, Direction::Decrypt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_print_tags() {
        for tag in ["aes-128", "aes-256", "twofish-192", "simon-128", "tea-128", "rc4-128"] {
            let alg: CipherAlgorithm = tag.parse().unwrap();
            assert_eq!(alg.to_string(), tag);
        }
        assert!(matches!(
            "aes-100".parse::<CipherAlgorithm>(),
            Err(CryptError::Init(_))
        ));
        assert!(matches!(
            "simon-256".parse::<CipherAlgorithm>(),
            Err(CryptError::Init(_))
        ));
        assert!(matches!(
            "serpent-128".parse::<CipherAlgorithm>(),
            Err(CryptError::Init(_))
        ));
        assert!(matches!("aes".parse::<CipherAlgorithm>(), Err(CryptError::Init(_))));
    }

    #[test]
    fn aes128_fips197_vector() {
        let key = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let mut block = hex::decode("00112233445566778899aabbccddeeff").unwrap();
        let mut enc = CipherPort::init(CipherAlgorithm::AES_128, &key, Direction::Encrypt).unwrap();
        enc.encrypt_block(&mut block).unwrap();
        assert_eq!(hex::encode(&block), "69c4e0d86a7b0430d8cdb78070b4c55a");

        let mut dec = CipherPort::init(CipherAlgorithm::AES_128, &key, Direction::Decrypt).unwrap();
        dec.decrypt_block(&mut block).unwrap();
        assert_eq!(hex::encode(&block), "00112233445566778899aabbccddeeff");
    }

    #[test]
    fn simon128_through_the_port() {
        let key: Vec<u8> = (0u8..16).collect();
        let mut block = *b" travellers desc";
        let mut enc = CipherPort::init(CipherAlgorithm::SIMON_128, &key, Direction::Encrypt).unwrap();
        enc.encrypt_block(&mut block).unwrap();
        assert_eq!(hex::encode(block), "bc0b4ef82a83aa653ffe541e1e1b6849");
        assert!(matches!(enc.decrypt_block(&mut block), Err(CryptError::State(_))));

        let mut dec = CipherPort::init(CipherAlgorithm::SIMON_128, &key, Direction::Decrypt).unwrap();
        dec.decrypt_block(&mut block).unwrap();
        assert_eq!(&block, b" travellers desc");
    }

    #[test]
    fn every_family_roundtrips_one_block() {
        let key32 = [0x5Au8; 32];
        for alg in [
            CipherAlgorithm::AES_128,
            CipherAlgorithm::AES_192,
            CipherAlgorithm::AES_256,
            CipherAlgorithm::TWOFISH_128,
            CipherAlgorithm::TWOFISH_256,
            CipherAlgorithm::SIMON_128,
            CipherAlgorithm::TEA_128,
            CipherAlgorithm::RC4_128,
        ] {
            let key = &key32[..alg.key_len()];
            let original: Vec<u8> = (0..alg.block_size() as u8).collect();
            let mut block = original.clone();
            CipherPort::init(alg, key, Direction::Encrypt)
                .unwrap()
                .encrypt_block(&mut block)
                .unwrap();
            assert_ne!(block, original, "{alg}");
            CipherPort::init(alg, key, Direction::Decrypt)
                .unwrap()
                .decrypt_block(&mut block)
                .unwrap();
            assert_eq!(block, original, "{alg}");
        }
    }

    #[test]
    fn key_length_mismatch_is_init_error() {
        let err = CipherPort::init(CipherAlgorithm::AES_128, &[0u8; 15], Direction::Encrypt)
            .unwrap_err();
        assert!(matches!(err, CryptError::Init(_)));
        let err = CipherPort::init(CipherAlgorithm::TEA_128, &[0u8; 32], Direction::Encrypt)
            .unwrap_err();
        assert!(matches!(err, CryptError::Init(_)));
    }

    #[test]
    fn wrong_block_length_and_direction() {
        let mut port =
            CipherPort::init(CipherAlgorithm::AES_128, &[0u8; 16], Direction::Encrypt).unwrap();
        let mut short = [0u8; 15];
        assert!(matches!(
            port.encrypt_block(&mut short),
            Err(CryptError::Crypto(_))
        ));
        let mut block = [0u8; 16];
        assert!(matches!(
            port.decrypt_block(&mut block),
            Err(CryptError::State(_))
        ));
    }
}
