//! Zig-zag + LEB128 signed varints.
//!
//! Small deltas (the common case between neighbouring vertices of a street)
//! pack into one or two bytes.

use crate::{GeometryError, GeometryResult};

#[inline]
fn zigzag(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}

#[inline]
fn unzigzag(v: u64) -> i64 {
    ((v >> 1) as i64) ^ -((v & 1) as i64)
}

/// Append `value` to `buf`.
pub fn write_i64(buf: &mut Vec<u8>, value: i64) {
    let mut v = zigzag(value);
    while v >= 0x80 {
        buf.push((v as u8) | 0x80);
        v >>= 7;
    }
    buf.push(v as u8);
}

/// Read one value starting at `*pos`, advancing `*pos` past it.
pub fn read_i64(buf: &[u8], pos: &mut usize) -> GeometryResult<i64> {
    let start = *pos;
    let mut result: u64 = 0;
    let mut shift = 0u32;
    loop {
        let Some(&byte) = buf.get(*pos) else {
            return Err(GeometryError::TruncatedVarint { offset: start });
        };
        *pos += 1;
        if shift >= 64 {
            return Err(GeometryError::VarintOverflow { offset: start });
        }
        result |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return Ok(unzigzag(result));
        }
        shift += 7;
    }
}
