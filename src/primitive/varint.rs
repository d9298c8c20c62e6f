//! Variable-length integers
//!
//! 7 payload bits per byte, continuation flag in the high bit.

use bytes::{Buf, BufMut};

use super::ensure_remaining;
use crate::error::{HotRodError, Result};

/// Longest encoding of a 32-bit value
pub const MAX_VINT_BYTES: usize = 5;

/// Longest encoding of a 64-bit value
pub const MAX_VLONG_BYTES: usize = 10;

/// Write a 32-bit value as a varint
pub fn write_vint<B: BufMut + ?Sized>(buf: &mut B, value: u32) {
    write_vlong(buf, u64::from(value));
}

/// Write a 64-bit value as a varint
pub fn write_vlong<B: BufMut + ?Sized>(buf: &mut B, mut value: u64) {
    while value & !0x7F != 0 {
        buf.put_u8(((value & 0x7F) as u8) | 0x80);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

/// Read a 32-bit varint
///
/// Bits beyond the 32nd are dropped, as the server does.
pub fn read_vint<B: Buf + ?Sized>(buf: &mut B) -> Result<u32> {
    read_varint(buf, MAX_VINT_BYTES).map(|value| value as u32)
}

/// Read a 64-bit varint
pub fn read_vlong<B: Buf + ?Sized>(buf: &mut B) -> Result<u64> {
    read_varint(buf, MAX_VLONG_BYTES)
}

fn read_varint<B: Buf + ?Sized>(buf: &mut B, max_bytes: usize) -> Result<u64> {
    let mut result: u64 = 0;
    let mut shift = 0u32;

    for _ in 0..max_bytes {
        ensure_remaining(buf, 1)?;
        let byte = buf.get_u8();
        result |= u64::from(byte & 0x7F).checked_shl(shift).unwrap_or(0);
        if byte & 0x80 == 0 {
            return Ok(result);
        }
        shift += 7;
    }

    Err(HotRodError::MalformedVarint { max_bytes })
}

/// Exact number of bytes [`write_vint`] produces for `value`
pub fn estimate_vint_size(value: u32) -> usize {
    estimate_vlong_size(u64::from(value))
}

/// Exact number of bytes [`write_vlong`] produces for `value`
pub fn estimate_vlong_size(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.max(1).div_ceil(7)
}
