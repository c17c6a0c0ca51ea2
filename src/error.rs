use thiserror::Error;

/// Errors the steganography core can report.
///
/// Per the format's design, signature mismatch, version mismatch,
/// reserved-nonzero, and CRC mismatch are all collapsed into
/// [`StegoError::InvalidOrCorrupt`] so a caller cannot distinguish "wrong
/// password" from "tampered file".
#[derive(Debug, Error)]
pub enum StegoError {
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("cannot read input '{path}': {source}")]
    InputUnreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write output '{path}': {source}")]
    OutputUnwritable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("payload too large: maximum embeddable size is {max} bytes, got {got}")]
    PayloadTooLarge { max: u64, got: u64 },

    #[error("file name '{0}' exceeds the 32-byte limit")]
    NameTooLong(String),

    #[error("system random number generator failed to produce bytes")]
    RandomnessFailure,

    #[error("invalid key or corrupt file")]
    InvalidOrCorrupt,

    #[error("{0}")]
    Other(String),
}
