//! Decoder orchestrator: extracts salt, IV, header; re-derives the key;
//! locates the ciphertext by the header's recorded offset; verifies CRC32.

use std::path::Path;
use std::sync::mpsc::Sender;

use crate::crypto;
use crate::error::StegoError;
use crate::header::{Header, HEADER_SIZE};
use crate::image::{encoded_size, EncodingLevel, Image};
use crate::integrity::crc32;
use crate::progress::{emit, ProgressEvent};

/// The recovered payload bytes and the filename embedded in the header.
pub struct Decoded {
    pub data: Vec<u8>,
    pub name: String,
}

/// Extract and decrypt the payload embedded in `image` under `password_hash`.
pub fn decode(
    image: &Image,
    password_hash: &[u8; 32],
    progress: Option<&Sender<ProgressEvent>>,
) -> Result<Decoded, StegoError> {
    // 1. Extract preamble.
    let salt: [u8; 16] = image
        .decode(16, EncodingLevel::Low, 0)?
        .try_into()
        .map_err(|_| StegoError::InvalidOrCorrupt)?;
    let iv: [u8; 16] = image
        .decode(16, EncodingLevel::Low, encoded_size(16, EncodingLevel::Low))?
        .try_into()
        .map_err(|_| StegoError::InvalidOrCorrupt)?;

    // 2. Derive key.
    let key = crypto::derive_key(password_hash, &salt);
    emit(progress, ProgressEvent::KeyDerived);

    // 3. Extract + decrypt header.
    let encrypted_header = image.decode(HEADER_SIZE as u64, EncodingLevel::Low, encoded_size(32, EncodingLevel::Low))?;
    let header_bytes = crypto::decrypt_cbc(&key, &iv, &encrypted_header)?;

    // 4. Validate header (signature/version/reserved collapsed uniformly).
    let header = Header::read(&header_bytes)?;
    log::debug!("header validated: level={:?} offset={} size={}", header.level, header.offset, header.size);

    // 5. Extract + decrypt payload.
    let encrypted_payload = image.decode(header.size as u64, header.level, header.offset as u64)?;
    let padded = crypto::decrypt_cbc(&key, &iv, &encrypted_payload)?;
    emit(progress, ProgressEvent::Ciphered);

    // 6. Strip padding.
    if padded.is_empty() {
        return Err(StegoError::InvalidOrCorrupt);
    }
    let plain_len = crypto::unpad_pkcs7_len(&padded);
    if plain_len > padded.len() {
        return Err(StegoError::InvalidOrCorrupt);
    }
    let plaintext = &padded[..plain_len];

    // 7. Verify CRC.
    let computed = crc32(plaintext);
    if computed != header.hash {
        log::warn!("CRC32 mismatch: expected {:#x}, computed {:#x}", header.hash, computed);
        return Err(StegoError::InvalidOrCorrupt);
    }
    emit(progress, ProgressEvent::ChecksumVerified);

    // 8. Recover filename.
    let name = header.name_str();

    Ok(Decoded { data: plaintext.to_vec(), name })
}

/// Write a decoded payload to `output_path` (or the recovered filename's
/// path, resolved by the caller, if none was supplied).
pub fn write_output(decoded: &Decoded, output_path: &Path) -> Result<(), StegoError> {
    std::fs::write(output_path, &decoded.data).map_err(|e| StegoError::OutputUnwritable {
        path: output_path.display().to_string(),
        source: e,
    })
}
