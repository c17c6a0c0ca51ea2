//! Key derivation and AES-256-CBC + PKCS#7 encryption.
//!
//! Header and payload are encrypted as two independent CBC streams that both
//! restart from the same `(key, iv)` — a known weakness (see spec notes),
//! replicated here bit-compatibly rather than fixed.

use aes::Aes256;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use hmac::Hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, Zeroizing};

use crate::error::StegoError;

const AES_BLOCK: usize = 16;
const KEY_LEN: usize = 32;
pub const PBKDF2_ITERATIONS: u32 = 20_000;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// `SHA-256(password)` — the GUI pre-hashes the raw password before it ever
/// reaches the core; the CLI does the same so both front ends agree.
pub fn hash_password(password: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(password);
    hasher.finalize().into()
}

/// A 32-byte AES key, zeroed best-effort when dropped.
pub struct Key(pub [u8; KEY_LEN]);

impl Drop for Key {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// `key = PBKDF2-HMAC-SHA-256(password_hash, salt, c=20000, dkLen=32)`.
///
/// The iteration count and HMAC choice are fixed format parameters; they
/// are never read from or written to the header.
pub fn derive_key(password_hash: &[u8; 32], salt: &[u8; 16]) -> Key {
    let mut key = [0u8; KEY_LEN];
    let _ = pbkdf2::pbkdf2::<Hmac<Sha256>>(password_hash, salt, PBKDF2_ITERATIONS, &mut key);
    log::debug!("derived key via PBKDF2-HMAC-SHA-256 ({} rounds)", PBKDF2_ITERATIONS);
    Key(key)
}

/// Draw `salt[16]` from the OS CSPRNG. Uses the fallible `OsRng` API
/// (rather than `thread_rng()`, which panics on RNG failure instead of
/// surfacing it) so a genuine RNG outage reaches the caller as
/// [`StegoError::RandomnessFailure`] instead of aborting the process.
pub fn generate_salt() -> Result<[u8; 16], StegoError> {
    let mut salt = [0u8; 16];
    OsRng.try_fill_bytes(&mut salt).map_err(|_| StegoError::RandomnessFailure)?;
    Ok(salt)
}

pub fn generate_iv() -> Result<[u8; 16], StegoError> {
    let mut iv = [0u8; 16];
    OsRng.try_fill_bytes(&mut iv).map_err(|_| StegoError::RandomnessFailure)?;
    Ok(iv)
}

/// Draw a raw 32-bit unsigned integer from the CSPRNG, for offset placement.
pub fn generate_u32() -> Result<u32, StegoError> {
    let mut buf = [0u8; 4];
    OsRng.try_fill_bytes(&mut buf).map_err(|_| StegoError::RandomnessFailure)?;
    Ok(u32::from_le_bytes(buf))
}

/// Pad `data` to a multiple of 16 using PKCS#7. At least one padding byte is
/// always appended; a length already a multiple of 16 gets a full block of
/// `0x10`. The result is zeroed on drop — it holds plaintext.
pub fn pad_pkcs7(data: &[u8]) -> Zeroizing<Vec<u8>> {
    let pad_len = AES_BLOCK - (data.len() % AES_BLOCK);
    let mut out = Vec::with_capacity(data.len() + pad_len);
    out.extend_from_slice(data);
    out.resize(data.len() + pad_len, pad_len as u8);
    Zeroizing::new(out)
}

/// Encrypt `plaintext` (whose length must already be a multiple of 16) with
/// AES-256-CBC under `(key, iv)`. The CBC chain restarts from `iv` — callers
/// encrypting header and payload each get their own fresh chain from the
/// same `(key, iv)` pair, per the format's design.
pub fn encrypt_cbc(key: &Key, iv: &[u8; 16], plaintext: &[u8]) -> Vec<u8> {
    debug_assert_eq!(plaintext.len() % AES_BLOCK, 0);
    let mut buf = plaintext.to_vec();
    let encryptor = Aes256CbcEnc::new(key.0.as_slice().into(), iv.into());
    encryptor.encrypt_blocks_mut(to_blocks_mut(&mut buf));
    buf
}

/// Decrypt `ciphertext` (whose length must already be a multiple of 16)
/// with AES-256-CBC under `(key, iv)`. The result is zeroed on drop — it
/// holds either the decrypted header or the decrypted payload plaintext.
pub fn decrypt_cbc(key: &Key, iv: &[u8; 16], ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>, StegoError> {
    if ciphertext.len() % AES_BLOCK != 0 || ciphertext.is_empty() {
        return Err(StegoError::InvalidOrCorrupt);
    }
    let mut buf = ciphertext.to_vec();
    let decryptor = Aes256CbcDec::new(key.0.as_slice().into(), iv.into());
    decryptor.decrypt_blocks_mut(to_blocks_mut(&mut buf));
    Ok(Zeroizing::new(buf))
}

/// Strip PKCS#7 padding from a decrypted payload buffer. The reference
/// behavior only inspects the final padding byte; it does not validate
/// that the preceding `pad` bytes all equal `pad`. Uses a saturating
/// subtraction: a tampered ciphertext block decrypts to an arbitrary pad
/// byte via CBC's avalanche effect, and that byte can easily exceed
/// `data.len()` for a small payload — this must report a short (or zero)
/// length rather than underflow and panic.
pub fn unpad_pkcs7_len(data: &[u8]) -> usize {
    let pad = data[data.len() - 1] as usize;
    data.len().saturating_sub(pad)
}

/// Reinterpret a mutable byte slice as mutable AES blocks.
#[allow(unsafe_code)]
fn to_blocks_mut(data: &mut [u8]) -> &mut [aes::Block] {
    assert!(data.len() % AES_BLOCK == 0);
    // SAFETY: aes::Block is [u8; 16] with the same alignment as u8.
    unsafe { std::slice::from_raw_parts_mut(data.as_mut_ptr() as *mut aes::Block, data.len() / AES_BLOCK) }
}
