//! Binary Primitive Module
//!
//! Low-level readers and writers shared by every part of the codec.
//!
//! ## Encodings
//! - **VInt / VLong**: base-128, least significant group first, high bit set
//!   on every byte except the last. At most 5 bytes for 32-bit values and 10
//!   bytes for 64-bit values.
//! - **Array**: VInt length followed by the raw bytes.
//! - **String**: UTF-8 bytes written as an array.
//! - Fixed-width integers are big-endian.
//!
//! Readers work on any [`bytes::Buf`] and never panic on short input: every
//! read checks the remaining length first and fails with
//! `UnexpectedEndOfInput`.

mod array;
mod varint;

pub use array::{
    estimate_array_size, estimate_string_size, read_array, read_array_limited, read_string,
    write_array, write_string, DEFAULT_MAX_ARRAY_LENGTH,
};
pub use varint::{
    estimate_vint_size, estimate_vlong_size, read_vint, read_vlong, write_vint, write_vlong,
    MAX_VINT_BYTES, MAX_VLONG_BYTES,
};

use bytes::Buf;

use crate::error::{HotRodError, Result};

/// Fail unless at least `needed` bytes remain
#[inline]
pub fn ensure_remaining<B: Buf + ?Sized>(buf: &B, needed: usize) -> Result<()> {
    let remaining = buf.remaining();
    if remaining < needed {
        return Err(HotRodError::UnexpectedEndOfInput { needed, remaining });
    }
    Ok(())
}

/// Read one unsigned byte
#[inline]
pub fn read_u8<B: Buf + ?Sized>(buf: &mut B) -> Result<u8> {
    ensure_remaining(buf, 1)?;
    Ok(buf.get_u8())
}

/// Read a big-endian unsigned short
#[inline]
pub fn read_u16<B: Buf + ?Sized>(buf: &mut B) -> Result<u16> {
    ensure_remaining(buf, 2)?;
    Ok(buf.get_u16())
}

/// Read a big-endian signed long
#[inline]
pub fn read_i64<B: Buf + ?Sized>(buf: &mut B) -> Result<i64> {
    ensure_remaining(buf, 8)?;
    Ok(buf.get_i64())
}

/// Read a big-endian unsigned long
#[inline]
pub fn read_u64<B: Buf + ?Sized>(buf: &mut B) -> Result<u64> {
    ensure_remaining(buf, 8)?;
    Ok(buf.get_u64())
}
