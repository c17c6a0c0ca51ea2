//! CRC32 integrity check over unpadded plaintext.
//!
//! Not a cryptographic authenticator — it only detects accidental
//! corruption, never a tamperer who holds the key.

use crc32fast::Hasher;

pub fn crc32(data: &[u8]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc32_of_1024_zero_bytes() {
        let data = vec![0u8; 1024];
        assert_eq!(crc32(&data), 0xEFB5AF2E);
    }

    #[test]
    fn crc32_empty() {
        assert_eq!(crc32(&[]), 0);
    }
}
