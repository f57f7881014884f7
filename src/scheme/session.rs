//! src/scheme/session.rs
//! Encrypt-then-MAC session: CBC or CTR over a [`BlockCipher`], MAC over `IV || C`
//!
//! A session drives exactly one message:
//!
//! ```text
//! Uninitialized ── init_enc ──▶ Encrypting ── plain_in* ── final_plain_in ──▶ Finalized
//!               └─ init_dec ──▶ Decrypting ── cipher_in* ── final_cipher_in ─▶ Finalized
//! ```
//!
//! Input chunks may be any length. Whole blocks are processed immediately; a
//! remainder shorter than one block is carried into the next call. Every call
//! writes into a caller-supplied buffer and returns the bytes written.
//!
//! The IV is absorbed into the MAC at init and never emitted, so the tag
//! covers `IV || ciphertext` in both modes.

use crate::aliases::{Block16, ChainBlock16, Tag32};
use crate::consts::{
    HMAC_SHA256_TAG_SIZE, MAX_BLOCK_SIZE, SCHEME_ENC_KEY_SIZE, SCHEME_IV_SIZE,
    SCHEME_MAC_KEY_SIZE,
};
use crate::crypto::cipher::{BlockCipher, CipherAlgorithm, CipherPort, Direction};
use crate::crypto::mac::{HmacSha256Port, MacPort};
use crate::error::CryptError;
use crate::padding::{pad_final, padded_len, unpad_final};
use crate::utils::{align_down, ensure_output_len, tags_match, xor_in_place};

/// Block chaining used by the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainMode {
    /// `c_i = E(p_i ^ c_{i-1})`, `c_0 = IV`, sympad on the last block.
    Cbc,
    /// `c_i = p_i ^ E(IV + i)`, big-endian counter, no padding.
    Ctr,
}

impl ChainMode {
    pub const fn name(self) -> &'static str {
        match self {
            ChainMode::Cbc => "cbc",
            ChainMode::Ctr => "ctr",
        }
    }

    /// Direction the cipher port must be keyed for when decrypting.
    pub const fn decrypt_direction(self) -> Direction {
        match self {
            ChainMode::Cbc => Direction::Decrypt,
            // keystream is always produced by the forward transform
            ChainMode::Ctr => Direction::Encrypt,
        }
    }
}

/// Where a session is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Encrypting,
    Decrypting,
    Finalized,
}

/// Bytes short of a whole block, held between calls.
struct Carry {
    buf: Block16,
    len: usize,
}

impl Carry {
    fn new() -> Self {
        Self {
            buf: Block16::new([0u8; MAX_BLOCK_SIZE]),
            len: 0,
        }
    }

    fn bytes(&self) -> &[u8] {
        &self.buf.expose_secret()[..self.len]
    }

    /// Move every whole block of `carry || input` to the front of `out`,
    /// keep the remainder, and return the number of bytes moved.
    fn gather(&mut self, mut input: &[u8], out: &mut [u8], bs: usize) -> usize {
        let mut written = 0;
        if self.len > 0 {
            let take = (bs - self.len).min(input.len());
            self.buf.expose_secret_mut()[self.len..self.len + take].copy_from_slice(&input[..take]);
            self.len += take;
            input = &input[take..];
            if self.len < bs {
                return 0;
            }
            out[..bs].copy_from_slice(&self.buf.expose_secret()[..bs]);
            written = bs;
            self.len = 0;
        }
        let whole = align_down(input.len(), bs);
        out[written..written + whole].copy_from_slice(&input[..whole]);
        written += whole;
        let rest = &input[whole..];
        self.buf.expose_secret_mut()[..rest.len()].copy_from_slice(rest);
        self.len = rest.len();
        written
    }

    fn clear(&mut self) {
        self.buf.expose_secret_mut().fill(0);
        self.len = 0;
    }
}

/// Keyed state that exists only between init and finalization.
struct Core<C, M> {
    cipher: C,
    mac: M,
    // CBC: previous ciphertext block. CTR: next counter block.
    chain: ChainBlock16,
    bs: usize,
}

impl<C: BlockCipher, M: MacPort> Core<C, M> {
    fn encrypt_blocks(&mut self, mode: ChainMode, data: &mut [u8]) -> Result<(), CryptError> {
        let bs = self.bs;
        for block in data.chunks_exact_mut(bs) {
            match mode {
                ChainMode::Cbc => {
                    xor_in_place(block, &self.chain.expose_secret()[..bs]);
                    self.cipher.encrypt_block(block)?;
                    self.chain.expose_secret_mut()[..bs].copy_from_slice(block);
                }
                ChainMode::Ctr => self.apply_keystream(block)?,
            }
            self.mac.update(block);
        }
        Ok(())
    }

    fn decrypt_blocks(&mut self, mode: ChainMode, data: &mut [u8]) -> Result<(), CryptError> {
        let bs = self.bs;
        let mut received = Block16::new([0u8; MAX_BLOCK_SIZE]);
        for block in data.chunks_exact_mut(bs) {
            self.mac.update(block);
            match mode {
                ChainMode::Cbc => {
                    received.expose_secret_mut()[..bs].copy_from_slice(block);
                    self.cipher.decrypt_block(block)?;
                    xor_in_place(block, &self.chain.expose_secret()[..bs]);
                    self.chain.expose_secret_mut()[..bs]
                        .copy_from_slice(&received.expose_secret()[..bs]);
                }
                ChainMode::Ctr => self.apply_keystream(block)?,
            }
        }
        Ok(())
    }

    /// XOR the next keystream block (truncated to `data.len()`) into `data`.
    #[inline(always)]
    fn apply_keystream(&mut self, data: &mut [u8]) -> Result<(), CryptError> {
        let bs = self.bs;
        let mut keystream = Block16::new([0u8; MAX_BLOCK_SIZE]);
        keystream.expose_secret_mut()[..bs].copy_from_slice(&self.chain.expose_secret()[..bs]);
        self.cipher
            .encrypt_block(&mut keystream.expose_secret_mut()[..bs])?;
        xor_in_place(data, &keystream.expose_secret()[..data.len()]);
        increment_be(&mut self.chain.expose_secret_mut()[..bs]);
        Ok(())
    }
}

/// Add one to a big-endian counter, wrapping at the block width.
#[inline(always)]
fn increment_be(counter: &mut [u8]) {
    for byte in counter.iter_mut().rev() {
        let (next, overflow) = byte.overflowing_add(1);
        *byte = next;
        if !overflow {
            break;
        }
    }
}

/// Encrypt-then-MAC session over any cipher port and MAC port.
///
/// See the module docs for the call sequence. Out-of-order calls fail with
/// [`CryptError::State`]. An output buffer shorter than the matching
/// `*_len` helper fails with [`CryptError::Crypto`] before anything changes.
pub struct EncryptThenMac<C, M> {
    mode: ChainMode,
    state: SessionState,
    core: Option<Core<C, M>>,
    carry: Carry,
    valid: bool,
}

/// The AES-128 + HMAC-SHA256 instantiation used by the composite schemes.
pub type Aes128HmacSha256Session = EncryptThenMac<CipherPort, HmacSha256Port>;

impl<C: BlockCipher, M: MacPort> EncryptThenMac<C, M> {
    /// A session waiting for `init_enc` / `init_dec`.
    pub fn new(mode: ChainMode) -> Self {
        Self {
            mode,
            state: SessionState::Uninitialized,
            core: None,
            carry: Carry::new(),
            valid: false,
        }
    }

    /// Build a session straight from keyed ports.
    ///
    /// For [`ChainMode::Ctr`] the cipher must be keyed for encryption in both
    /// directions (see [`ChainMode::decrypt_direction`]). `iv` must be one
    /// block long.
    pub fn with_ports(
        mode: ChainMode,
        direction: Direction,
        cipher: C,
        mac: M,
        iv: &[u8],
    ) -> Result<Self, CryptError> {
        let mut session = Self::new(mode);
        session.start(direction, cipher, mac, iv)?;
        Ok(session)
    }

    fn start(
        &mut self,
        direction: Direction,
        cipher: C,
        mut mac: M,
        iv: &[u8],
    ) -> Result<(), CryptError> {
        self.require_state(SessionState::Uninitialized, "init")?;
        let bs = cipher.block_size();
        if bs == 0 || bs > MAX_BLOCK_SIZE {
            return Err(CryptError::Init(format!("unsupported block size {bs}")));
        }
        if iv.len() != bs {
            return Err(CryptError::Init(format!(
                "IV must be {bs} bytes, got {}",
                iv.len()
            )));
        }
        if mac.tag_size() == 0 || mac.tag_size() > HMAC_SHA256_TAG_SIZE {
            return Err(CryptError::Init(format!(
                "unsupported tag size {}",
                mac.tag_size()
            )));
        }

        mac.update(iv);
        let mut chain = ChainBlock16::new([0u8; MAX_BLOCK_SIZE]);
        chain.expose_secret_mut()[..bs].copy_from_slice(iv);

        self.core = Some(Core {
            cipher,
            mac,
            chain,
            bs,
        });
        self.state = match direction {
            Direction::Encrypt => SessionState::Encrypting,
            Direction::Decrypt => SessionState::Decrypting,
        };
        tracing::debug!(mode = self.mode.name(), ?direction, "session initialized");
        Ok(())
    }

    pub fn mode(&self) -> ChainMode {
        self.mode
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Block size of the bound cipher, or 0 before init.
    pub fn block_size(&self) -> usize {
        self.core.as_ref().map_or(0, |core| core.bs)
    }

    /// Tag size of the bound MAC, or 0 before init.
    pub fn tag_size(&self) -> usize {
        self.core.as_ref().map_or(0, |core| core.mac.tag_size())
    }

    /// Least input the terminal encrypt call is planned with: one block.
    pub fn minimum_final_encrypt_in(&self) -> usize {
        self.block_size()
    }

    /// Least input the terminal decrypt call is planned with: one block plus the tag.
    pub fn minimum_final_decrypt_in(&self) -> usize {
        self.block_size() + self.tag_size()
    }

    /// Output bytes `plain_in(input)` will write.
    pub fn plain_in_len(&self, input_len: usize) -> usize {
        self.whole_blocks_len(input_len)
    }

    /// Output bytes `final_plain_in(input)` will write, tag included.
    pub fn final_plain_in_len(&self, input_len: usize) -> usize {
        let total = self.carry.len + input_len;
        let body = match self.mode {
            ChainMode::Cbc => padded_len(total, self.block_size().max(1)),
            ChainMode::Ctr => total,
        };
        body + self.tag_size()
    }

    /// Output bytes `cipher_in(input)` will write.
    pub fn cipher_in_len(&self, input_len: usize) -> usize {
        self.whole_blocks_len(input_len)
    }

    /// Output space `final_cipher_in(input)` needs: the ciphertext body
    /// before unpadding. The returned count can be smaller.
    pub fn final_cipher_in_len(&self, input_len: usize) -> usize {
        (self.carry.len + input_len).saturating_sub(self.tag_size())
    }

    fn whole_blocks_len(&self, input_len: usize) -> usize {
        match self.block_size() {
            0 => 0,
            bs => align_down(self.carry.len + input_len, bs),
        }
    }

    /// Tag comparison result. `false` before `final_cipher_in` and on encrypt sessions.
    pub fn message_valid(&self) -> bool {
        self.state == SessionState::Finalized && self.valid
    }

    fn require_state(&self, wanted: SessionState, call: &str) -> Result<(), CryptError> {
        if self.state != wanted {
            return Err(CryptError::State(format!(
                "{call} called while session is {:?}",
                self.state
            )));
        }
        Ok(())
    }

    fn core_mut(&mut self) -> Result<&mut Core<C, M>, CryptError> {
        self.core
            .as_mut()
            .ok_or_else(|| CryptError::State("session has no keyed state".into()))
    }

    fn finish(&mut self) {
        self.carry.clear();
        self.core = None;
        self.state = SessionState::Finalized;
    }

    /// Encrypt the whole blocks of `carry || input` into `out`.
    pub fn plain_in(&mut self, input: &[u8], out: &mut [u8]) -> Result<usize, CryptError> {
        self.require_state(SessionState::Encrypting, "plain_in")?;
        ensure_output_len(out, self.plain_in_len(input.len()), "plain_in")?;
        let mode = self.mode;
        let bs = self.block_size();
        let n = self.carry.gather(input, out, bs);
        self.core_mut()?.encrypt_blocks(mode, &mut out[..n])?;
        Ok(n)
    }

    /// Encrypt the rest of the message and append the tag.
    pub fn final_plain_in(&mut self, input: &[u8], out: &mut [u8]) -> Result<usize, CryptError> {
        self.require_state(SessionState::Encrypting, "final_plain_in")?;
        let total = self.final_plain_in_len(input.len());
        ensure_output_len(out, total, "final_plain_in")?;

        let mode = self.mode;
        let bs = self.block_size();
        let n = self.carry.gather(input, out, bs);
        let tail = self.carry.len;
        let body = match mode {
            ChainMode::Cbc => n + pad_final(self.carry.bytes(), bs, &mut out[n..])?,
            ChainMode::Ctr => {
                out[n..n + tail].copy_from_slice(self.carry.bytes());
                n + tail
            }
        };

        let core = self.core_mut()?;
        let whole = align_down(body, bs);
        core.encrypt_blocks(mode, &mut out[..whole])?;
        if whole < body {
            core.apply_keystream(&mut out[whole..body])?;
            core.mac.update(&out[whole..body]);
        }
        let tag_size = core.mac.tag_size();
        core.mac.finalize_into(&mut out[body..body + tag_size])?;

        self.finish();
        Ok(body + tag_size)
    }

    /// Decrypt the whole blocks of `carry || input` into `out`.
    ///
    /// Bytes that may belong to the tag must be held back for
    /// `final_cipher_in`; the stream drivers do this by planning with
    /// [`minimum_final_decrypt_in`](Self::minimum_final_decrypt_in).
    pub fn cipher_in(&mut self, input: &[u8], out: &mut [u8]) -> Result<usize, CryptError> {
        self.require_state(SessionState::Decrypting, "cipher_in")?;
        ensure_output_len(out, self.cipher_in_len(input.len()), "cipher_in")?;
        let mode = self.mode;
        let bs = self.block_size();
        let n = self.carry.gather(input, out, bs);
        self.core_mut()?.decrypt_blocks(mode, &mut out[..n])?;
        Ok(n)
    }

    /// Decrypt the rest of the message, check the tag and strip the padding.
    ///
    /// The last `tag_size` bytes of `carry || input` are the received tag. The
    /// tag result is stored for [`message_valid`](Self::message_valid) before
    /// unpadding, so it is available even when this returns
    /// [`CryptError::Framing`]. The plaintext is written either way; whether it
    /// may be released is the caller's decision.
    pub fn final_cipher_in(&mut self, input: &[u8], out: &mut [u8]) -> Result<usize, CryptError> {
        self.require_state(SessionState::Decrypting, "final_cipher_in")?;
        let bs = self.block_size();
        let tag_size = self.tag_size();
        let total = self.carry.len + input.len();
        if total < tag_size {
            return Err(CryptError::Framing(format!(
                "final input of {total} bytes is shorter than the {tag_size}-byte tag"
            )));
        }
        let body = total - tag_size;
        if self.mode == ChainMode::Cbc && (body == 0 || body % bs != 0) {
            return Err(CryptError::Framing(format!(
                "ciphertext body of {body} bytes is not a positive multiple of {bs}"
            )));
        }
        ensure_output_len(out, body, "final_cipher_in")?;

        // split carry || input into body and received tag
        let carry_len = self.carry.len;
        let from_carry = carry_len.min(body);
        out[..from_carry].copy_from_slice(&self.carry.bytes()[..from_carry]);
        out[from_carry..body].copy_from_slice(&input[..body - from_carry]);
        let mut received = Tag32::new([0u8; HMAC_SHA256_TAG_SIZE]);
        for (i, slot) in received.expose_secret_mut()[..tag_size].iter_mut().enumerate() {
            let at = body + i;
            *slot = if at < carry_len {
                self.carry.bytes()[at]
            } else {
                input[at - carry_len]
            };
        }

        let mode = self.mode;
        let core = self.core_mut()?;
        let whole = align_down(body, bs);
        core.decrypt_blocks(mode, &mut out[..whole])?;
        if whole < body {
            core.mac.update(&out[whole..body]);
            core.apply_keystream(&mut out[whole..body])?;
        }
        let mut computed = Tag32::new([0u8; HMAC_SHA256_TAG_SIZE]);
        core.mac
            .finalize_into(&mut computed.expose_secret_mut()[..tag_size])?;

        self.valid = tags_match(
            &computed.expose_secret()[..tag_size],
            &received.expose_secret()[..tag_size],
        );
        self.finish();

        match mode {
            ChainMode::Cbc => {
                let keep = unpad_final(&out[body - bs..body])?;
                Ok(body - bs + keep)
            }
            ChainMode::Ctr => Ok(body),
        }
    }
}

impl EncryptThenMac<CipherPort, HmacSha256Port> {
    /// Key an AES-128 + HMAC-SHA256 session for encryption.
    ///
    /// `enc_key` must be 16 bytes, `mac_key` 32 bytes, `iv` 16 bytes.
    pub fn init_enc(&mut self, enc_key: &[u8], mac_key: &[u8], iv: &[u8]) -> Result<(), CryptError> {
        self.require_state(SessionState::Uninitialized, "init_enc")?;
        let (cipher, mac) = aes_hmac_ports(enc_key, mac_key, iv, Direction::Encrypt)?;
        self.start(Direction::Encrypt, cipher, mac, iv)
    }

    /// Key an AES-128 + HMAC-SHA256 session for decryption.
    pub fn init_dec(&mut self, enc_key: &[u8], mac_key: &[u8], iv: &[u8]) -> Result<(), CryptError> {
        self.require_state(SessionState::Uninitialized, "init_dec")?;
        let direction = self.mode.decrypt_direction();
        let (cipher, mac) = aes_hmac_ports(enc_key, mac_key, iv, direction)?;
        self.start(Direction::Decrypt, cipher, mac, iv)
    }
}

fn aes_hmac_ports(
    enc_key: &[u8],
    mac_key: &[u8],
    iv: &[u8],
    direction: Direction,
) -> Result<(CipherPort, HmacSha256Port), CryptError> {
    if enc_key.len() != SCHEME_ENC_KEY_SIZE {
        return Err(CryptError::Init(format!(
            "encryption key must be {SCHEME_ENC_KEY_SIZE} bytes, got {}",
            enc_key.len()
        )));
    }
    if mac_key.len() != SCHEME_MAC_KEY_SIZE {
        return Err(CryptError::Init(format!(
            "MAC key must be {SCHEME_MAC_KEY_SIZE} bytes, got {}",
            mac_key.len()
        )));
    }
    if iv.len() != SCHEME_IV_SIZE {
        return Err(CryptError::Init(format!(
            "IV must be {SCHEME_IV_SIZE} bytes, got {}",
            iv.len()
        )));
    }
    let cipher = CipherPort::init(CipherAlgorithm::AES_128, enc_key, direction)?;
    let mac = HmacSha256Port::new(mac_key)?;
    Ok((cipher, mac))
}
