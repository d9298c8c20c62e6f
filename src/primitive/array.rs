//! Length-prefixed byte arrays and strings

use bytes::{Buf, BufMut};

use super::{ensure_remaining, estimate_vint_size, read_vint, write_vint};
use crate::error::{HotRodError, Result};

/// Default upper bound for a single array read (16 MB)
pub const DEFAULT_MAX_ARRAY_LENGTH: usize = 16 * 1024 * 1024;

/// Write a VInt length followed by the bytes
pub fn write_array<B: BufMut + ?Sized>(buf: &mut B, bytes: &[u8]) {
    write_vint(buf, bytes.len() as u32);
    buf.put_slice(bytes);
}

/// Write a UTF-8 string as an array
pub fn write_string<B: BufMut + ?Sized>(buf: &mut B, value: &str) {
    write_array(buf, value.as_bytes());
}

/// Read an array using [`DEFAULT_MAX_ARRAY_LENGTH`] as the limit
pub fn read_array<B: Buf + ?Sized>(buf: &mut B) -> Result<Vec<u8>> {
    read_array_limited(buf, DEFAULT_MAX_ARRAY_LENGTH)
}

/// Read an array, rejecting declared lengths above `max_length`
///
/// The length is validated against the remaining input before any
/// allocation happens.
pub fn read_array_limited<B: Buf + ?Sized>(buf: &mut B, max_length: usize) -> Result<Vec<u8>> {
    let length = read_vint(buf)? as usize;
    if length > max_length {
        return Err(HotRodError::ArrayTooLarge {
            length,
            max: max_length,
        });
    }
    ensure_remaining(buf, length)?;

    let mut bytes = vec![0u8; length];
    buf.copy_to_slice(&mut bytes);
    Ok(bytes)
}

/// Read a UTF-8 string written as an array
pub fn read_string<B: Buf + ?Sized>(buf: &mut B) -> Result<String> {
    let bytes = read_array(buf)?;
    Ok(String::from_utf8(bytes)?)
}

/// Exact encoded size of an array
pub fn estimate_array_size(bytes: &[u8]) -> usize {
    estimate_vint_size(bytes.len() as u32) + bytes.len()
}

/// Exact encoded size of a string
pub fn estimate_string_size(value: &str) -> usize {
    estimate_array_size(value.as_bytes())
}
