//! RGBA image buffer plus the LSB bit codec.
//!
//! `Image` treats its pixel data as a flat sequence of channel bytes of
//! length `w*h*4`. Encoding never touches the high bits of a channel byte;
//! only the low `bits_per_channel()` bits are overwritten.

use std::path::Path;

use crate::error::StegoError;

/// Number of low bits of each channel byte overwritten per source bit-group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingLevel {
    Low = 0,
    Medium = 1,
    High = 2,
}

impl EncodingLevel {
    pub fn bits_per_channel(self) -> u32 {
        match self {
            EncodingLevel::Low => 1,
            EncodingLevel::Medium => 2,
            EncodingLevel::High => 4,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for EncodingLevel {
    type Error = StegoError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(EncodingLevel::Low),
            1 => Ok(EncodingLevel::Medium),
            2 => Ok(EncodingLevel::High),
            _ => Err(StegoError::InvalidOrCorrupt),
        }
    }
}

/// `ceil(8*n / bits(level))` — the number of image channel bytes consumed
/// to embed `n` logical payload bytes at the given level.
pub fn encoded_size(n: u64, level: EncodingLevel) -> u64 {
    let bits = level.bits_per_channel() as u64;
    (8 * n + bits - 1) / bits
}

/// A mutable RGBA pixel buffer, addressed as a flat byte sequence.
pub struct Image {
    width: u32,
    height: u32,
    /// Flat channel buffer, length `width*height*4`, in R,G,B,A,R,G,B,A,... order.
    channels: Vec<u8>,
}

impl Image {
    pub fn new(width: u32, height: u32, channels: Vec<u8>) -> Self {
        debug_assert_eq!(channels.len() as u64, width as u64 * height as u64 * 4);
        Self { width, height, channels }
    }

    pub fn load(path: &Path) -> Result<Self, StegoError> {
        let img = image::open(path).map_err(|e| match e {
            image::ImageError::IoError(io_err) => StegoError::InputUnreadable {
                path: path.display().to_string(),
                source: io_err,
            },
            other => StegoError::Image(other),
        })?;
        let rgba = img.to_rgba8();
        let (width, height) = (rgba.width(), rgba.height());
        Ok(Self { width, height, channels: rgba.into_raw() })
    }

    pub fn save(&self, path: &Path) -> Result<(), StegoError> {
        let buf = image::RgbaImage::from_raw(self.width, self.height, self.channels.clone())
            .ok_or_else(|| StegoError::Other("channel buffer does not match image dimensions".into()))?;
        buf.save(path).map_err(|e| match e {
            image::ImageError::IoError(io_err) => StegoError::OutputUnwritable {
                path: path.display().to_string(),
                source: io_err,
            },
            other => StegoError::Image(other),
        })
    }

    pub fn w(&self) -> u32 {
        self.width
    }

    pub fn h(&self) -> u32 {
        self.height
    }

    /// Total number of channel bytes (`w*h*4`).
    pub fn capacity_bytes(&self) -> u64 {
        self.width as u64 * self.height as u64 * 4
    }

    #[cfg(test)]
    pub fn channels(&self) -> &[u8] {
        &self.channels
    }

    #[cfg(test)]
    pub fn channels_mut(&mut self) -> &mut [u8] {
        &mut self.channels
    }

    /// Write `src` into the channel buffer starting at `start_offset`, at
    /// the given level. MSB-first group ordering: each source byte is split
    /// into `8/bits` groups of `bits` bits, most-significant-group first,
    /// and each group overwrites the low `bits` bits of the next channel byte.
    pub fn encode(&mut self, src: &[u8], level: EncodingLevel, start_offset: u64) -> Result<(), StegoError> {
        let bits = level.bits_per_channel();
        let needed = encoded_size(src.len() as u64, level);
        if start_offset + needed > self.capacity_bytes() {
            return Err(StegoError::Other(
                "encode: start_offset + encoded_size exceeds image capacity".into(),
            ));
        }

        let mask_keep = !((1u8 << bits) - 1);
        let groups_per_byte = 8 / bits;
        let mut pos = start_offset as usize;

        for &byte in src {
            for g in 0..groups_per_byte {
                let shift = 8 - bits * (g + 1);
                let group = (byte >> shift) & ((1u8 << bits) - 1) as u8;
                self.channels[pos] = (self.channels[pos] & mask_keep) | group;
                pos += 1;
            }
        }
        Ok(())
    }

    /// Read `n` bytes back out of the channel buffer starting at
    /// `start_offset`, at the given level.
    pub fn decode(&self, n: u64, level: EncodingLevel, start_offset: u64) -> Result<Vec<u8>, StegoError> {
        let bits = level.bits_per_channel();
        let needed = encoded_size(n, level);
        if start_offset + needed > self.capacity_bytes() {
            return Err(StegoError::Other(
                "decode: start_offset + encoded_size exceeds image capacity".into(),
            ));
        }

        let groups_per_byte = 8 / bits;
        let group_mask = (1u8 << bits) - 1;
        let mut out = Vec::with_capacity(n as usize);
        let mut pos = start_offset as usize;

        for _ in 0..n {
            let mut byte = 0u8;
            for _ in 0..groups_per_byte {
                let group = self.channels[pos] & group_mask;
                byte = (byte << bits) | group;
                pos += 1;
            }
            out.push(byte);
        }
        Ok(out)
    }
}
