//! Length-prefixed string primitives shared by every record kind's codec.
//!
//! A length-prefixed string is a `u32` byte length followed by that many
//! bytes. Zero length represents both an empty value and an absent one —
//! the wire format makes no distinction between them.

use bytes::{Buf, BufMut};

use crate::error::{ArchiveError, ArchiveResult};

pub fn put_str(buf: &mut impl BufMut, s: &str) {
    buf.put_u32(s.len() as u32);
    buf.put_slice(s.as_bytes());
}

pub fn get_str(buf: &mut impl Buf) -> ArchiveResult<String> {
    if buf.remaining() < 4 {
        return Err(truncated());
    }
    let len = buf.get_u32() as usize;
    if buf.remaining() < len {
        return Err(truncated());
    }
    let mut bytes = vec![0u8; len];
    buf.copy_to_slice(&mut bytes);
    String::from_utf8(bytes).map_err(|e| ArchiveError::CorruptArchive(e.to_string()))
}

/// A length prefix claiming more bytes than remain in the buffer.
fn truncated() -> ArchiveError {
    ArchiveError::CorruptArchive("length prefix exceeds buffer remainder".to_string())
}
