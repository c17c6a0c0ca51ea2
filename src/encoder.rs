//! Encoder orchestrator: validates capacity, assembles salt+iv+header+
//! ciphertext, and places each block at its fixed or randomized offset.

use std::path::Path;
use std::sync::mpsc::Sender;

use crate::crypto;
use crate::error::StegoError;
use crate::header::{Header, HEADER_SIZE};
use crate::image::{encoded_size, EncodingLevel, Image};
use crate::integrity::crc32;
use crate::progress::{emit, ProgressEvent};

/// Embed `payload` into `image` at `level`, encrypted under `password_hash`,
/// and save the result to `output_path`. `payload_name` becomes the
/// recovered filename on decode (must be at most 32 ASCII bytes).
pub fn encode(
    image: &mut Image,
    password_hash: &[u8; 32],
    payload: &[u8],
    payload_name: &str,
    level: EncodingLevel,
    output_path: &Path,
    progress: Option<&Sender<ProgressEvent>>,
) -> Result<(), StegoError> {
    log::debug!(
        "encoding {} bytes into {}x{} image at level {:?}",
        payload.len(),
        image.w(),
        image.h(),
        level
    );

    // 1. Capacity check.
    let size = payload.len() as u64;
    let padded_size = next_padded_size(size);

    let base = encoded_size(HEADER_SIZE as u64 + 32, EncodingLevel::Low);
    let raw_capacity = image.capacity_bytes() / encoded_size(1, level);
    // `base` can exceed the image's raw capacity for small images; treat
    // that the same as "payload too large" rather than underflowing.
    let max_size = raw_capacity.saturating_sub(base);

    if padded_size > max_size {
        return Err(StegoError::PayloadTooLarge { max: max_size, got: padded_size });
    }
    emit(progress, ProgressEvent::CapacityChecked { max_size, padded_size });

    // 2. Read and pad (caller already supplied `payload` in memory; pad here).
    let padded = crypto::pad_pkcs7(payload);
    debug_assert_eq!(padded.len() as u64, padded_size);

    // 3. Randomness.
    let salt = crypto::generate_salt()?;
    let iv = crypto::generate_iv()?;
    let r = crypto::generate_u32()?;

    // 4. Offset placement: offset = (r + base) mod span. When the payload
    // exactly fills the image (max_size == padded_size), there is exactly
    // one valid slot and no room to randomize; place it right after the
    // preamble+header region.
    let span = encoded_size(max_size - padded_size, level);
    let offset = if span == 0 { base } else { (r as u64 + base) % span };

    // 5. Integrity.
    let hash = crc32(payload);

    // 6. Header assembly.
    let header = Header::new(level, offset as u32, padded_size as u32, hash, payload_name)?;

    // 7. Key derivation.
    let key = crypto::derive_key(password_hash, &salt);
    emit(progress, ProgressEvent::KeyDerived);

    // 8. Encryption: header and payload as two independent CBC streams,
    // both keyed from the same (key, iv).
    let encrypted_header = crypto::encrypt_cbc(&key, &iv, &header.write());
    let encrypted_payload = crypto::encrypt_cbc(&key, &iv, &padded);
    emit(progress, ProgressEvent::Ciphered);

    // 9. Embedding.
    image.encode(&salt, EncodingLevel::Low, 0)?;
    image.encode(&iv, EncodingLevel::Low, encoded_size(16, EncodingLevel::Low))?;
    image.encode(&encrypted_header, EncodingLevel::Low, encoded_size(32, EncodingLevel::Low))?;
    image.encode(&encrypted_payload, level, offset)?;
    emit(progress, ProgressEvent::Embedded);

    // 10. Persist.
    image.save(output_path)?;
    emit(progress, ProgressEvent::Done);

    log::debug!("embedded {} bytes at offset {}, output written to {}", padded_size, offset, output_path.display());
    Ok(())
}

/// Smallest multiple of 16 strictly greater than `size` when `size` is
/// already a multiple of 16, otherwise the smallest multiple of 16 that is
/// `> size` but may equal the next multiple (i.e. standard PKCS#7 sizing:
/// at least one padding byte is always added).
fn next_padded_size(size: u64) -> u64 {
    (size / 16 + 1) * 16
}
