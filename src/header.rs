//! The fixed 64-byte little-endian container header.
//!
//! ```text
//! Offset  Size  Field
//!    0      4   signature      = "HIDE"
//!    4      2   version        = 1
//!    6      1   level
//!    7      1   flags          (reserved, must be 0)
//!    8      4   offset
//!   12      4   size
//!   16      4   hash            CRC32 of unpadded plaintext
//!   20     32   name            ASCII, zero-padded, may be unterminated
//!   52     12   reserved        must be all zero
//! ```
//!
//! Fields are marshalled explicitly in little-endian order; native struct
//! layout is never relied upon (the format is encrypted and shared across a
//! language boundary, so portability across hosts is mandatory).

use crate::error::StegoError;
use crate::image::EncodingLevel;

pub const HEADER_SIZE: usize = 64;
pub const SIGNATURE: &[u8; 4] = b"HIDE";
pub const VERSION: u16 = 1;
const NAME_LEN: usize = 32;
const RESERVED_LEN: usize = 12;

#[derive(Debug, Clone)]
pub struct Header {
    pub version: u16,
    pub level: EncodingLevel,
    pub offset: u32,
    pub size: u32,
    pub hash: u32,
    /// Original file basename, ASCII, at most 32 bytes.
    pub name: [u8; NAME_LEN],
}

impl Header {
    pub fn new(level: EncodingLevel, offset: u32, size: u32, hash: u32, name: &str) -> Result<Self, StegoError> {
        let bytes = name.as_bytes();
        if bytes.len() > NAME_LEN {
            return Err(StegoError::NameTooLong(name.to_string()));
        }
        let mut name_buf = [0u8; NAME_LEN];
        name_buf[..bytes.len()].copy_from_slice(bytes);
        Ok(Self { version: VERSION, level, offset, size, hash, name: name_buf })
    }

    /// Recover the original filename: ASCII up to the first zero byte, or
    /// all 32 bytes if no zero is present.
    pub fn name_str(&self) -> String {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
        String::from_utf8_lossy(&self.name[..end]).into_owned()
    }

    /// Serialize to exactly [`HEADER_SIZE`] bytes.
    pub fn write(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..4].copy_from_slice(SIGNATURE);
        buf[4..6].copy_from_slice(&self.version.to_le_bytes());
        buf[6] = self.level.as_u8();
        buf[7] = 0; // flags, reserved
        buf[8..12].copy_from_slice(&self.offset.to_le_bytes());
        buf[12..16].copy_from_slice(&self.size.to_le_bytes());
        buf[16..20].copy_from_slice(&self.hash.to_le_bytes());
        buf[20..52].copy_from_slice(&self.name);
        // buf[52..64] (reserved) stays zero.
        buf
    }

    /// Parse and validate a header. Signature mismatch, version mismatch,
    /// and nonzero reserved bytes are all reported uniformly as
    /// [`StegoError::InvalidOrCorrupt`] so a caller cannot distinguish
    /// "wrong password" from "tampered file".
    pub fn read(buf: &[u8]) -> Result<Self, StegoError> {
        if buf.len() != HEADER_SIZE {
            return Err(StegoError::InvalidOrCorrupt);
        }
        if &buf[0..4] != SIGNATURE {
            log::warn!("header signature mismatch");
            return Err(StegoError::InvalidOrCorrupt);
        }

        let version = u16::from_le_bytes(buf[4..6].try_into().unwrap());
        if version != VERSION {
            log::warn!("unsupported header version {version}");
            return Err(StegoError::InvalidOrCorrupt);
        }

        let level = EncodingLevel::try_from(buf[6]).map_err(|_| StegoError::InvalidOrCorrupt)?;
        let offset = u32::from_le_bytes(buf[8..12].try_into().unwrap());
        let size = u32::from_le_bytes(buf[12..16].try_into().unwrap());
        let hash = u32::from_le_bytes(buf[16..20].try_into().unwrap());
        let mut name = [0u8; NAME_LEN];
        name.copy_from_slice(&buf[20..52]);

        let reserved = &buf[52..52 + RESERVED_LEN];
        if reserved.iter().any(|&b| b != 0) {
            log::warn!("header reserved bytes are nonzero");
            return Err(StegoError::InvalidOrCorrupt);
        }

        Ok(Self { version, level, offset, size, hash, name })
    }
}
