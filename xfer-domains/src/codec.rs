//! Byte layout for abstract-value slots.
//!
//! Each slot is 12 bytes: a little-endian `u32` width followed by a
//! little-endian `u64` raw value whose high bits are zero. There is no
//! framing; readers know the slot count from the domain and the value count
//! from out-of-band metadata.

use xfer_types::Bits;

/// Serialized size of one slot.
pub const SLOT_BYTES: usize = 4 + 8;

/// Decoding failure for slot streams.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// The input ended inside a slot.
    #[error("truncated slot at byte offset {0}")]
    Truncated(usize),
    /// A slot carried a width outside `1..=64`.
    #[error("slot width {0} is outside 1..=64")]
    BadWidth(u32),
    /// Slots within one value disagreed on width.
    #[error("slot width {found} disagrees with expected width {expected}")]
    WidthMismatch {
        /// Width of the first slot of the value.
        expected: u32,
        /// Offending slot width.
        found: u32,
    },
}

pub(crate) fn write_slot(out: &mut Vec<u8>, slot: Bits) {
    out.extend_from_slice(&slot.width().to_le_bytes());
    out.extend_from_slice(&slot.to_u64().to_le_bytes());
}

pub(crate) fn read_slot(bytes: &[u8], offset: &mut usize) -> Result<Bits, CodecError> {
    let start = *offset;
    let end = start
        .checked_add(SLOT_BYTES)
        .ok_or(CodecError::Truncated(start))?;
    if end > bytes.len() {
        return Err(CodecError::Truncated(start));
    }

    let mut width_bytes = [0u8; 4];
    width_bytes.copy_from_slice(&bytes[start..start + 4]);
    let width = u32::from_le_bytes(width_bytes);
    if !(1..=64).contains(&width) {
        return Err(CodecError::BadWidth(width));
    }

    let mut raw_bytes = [0u8; 8];
    raw_bytes.copy_from_slice(&bytes[start + 4..end]);
    let raw = u64::from_le_bytes(raw_bytes);

    *offset = end;
    Ok(Bits::new(width, raw))
}
