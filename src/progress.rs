//! Coarse-grained stage events emitted during encode/decode, mirroring the
//! teacher's `ProgressMessage` channel pattern without coupling the core to
//! any particular UI.

#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Capacity check passed; `(max_size, padded_size)` in bytes.
    CapacityChecked { max_size: u64, padded_size: u64 },
    /// Key derived from salt and password hash.
    KeyDerived,
    /// Header and payload encrypted (encode) or decrypted (decode).
    Ciphered,
    /// Bits embedded into / extracted from the image buffer.
    Embedded,
    /// CRC32 verified (decode only).
    ChecksumVerified,
    /// Output written to disk.
    Done,
}

/// Send a progress event if a sender was supplied; silently drop the event
/// if the receiving end has gone away (mirrors the teacher's `let _ =
/// tx.send(...)` fire-and-forget style).
pub(crate) fn emit(tx: Option<&std::sync::mpsc::Sender<ProgressEvent>>, event: ProgressEvent) {
    if let Some(tx) = tx {
        let _ = tx.send(event);
    }
}
