//! Rice-Golomb coding: a parameterized unary quotient plus a fixed-width
//! remainder, cheaper than full Exp-Golomb when the caller already knows
//! roughly the right order of magnitude (the parameter `k`) for the
//! values being coded.

use crate::bitstream::{BitStreamReader, BitStreamWriter};
use crate::error::{KanziError, Result};
use std::io::{Read, Write};

/// Encode `value` with remainder width `k`: `value >> k` zero bits, a
/// terminating `1`, then the low `k` bits of `value`.
pub fn write<W: Write>(w: &mut BitStreamWriter<W>, value: u64, k: u32) -> Result<()> {
    let quotient = value >> k;
    if quotient > 1 << 20 {
        return Err(KanziError::invalid_argument("rice-golomb quotient too large for this k"));
    }
    for _ in 0..quotient {
        w.write_bits(0, 1)?;
    }
    w.write_bits(1, 1)?;
    if k > 0 {
        w.write_bits(value & ((1u64 << k) - 1), k)?;
    }
    Ok(())
}

/// Inverse of [`write`].
pub fn read<R: Read>(r: &mut BitStreamReader<R>, k: u32) -> Result<u64> {
    let mut quotient = 0u64;
    while r.read_bits(1)? == 0 {
        quotient += 1;
    }
    let remainder = if k > 0 { r.read_bits(k)? } else { 0 };
    Ok((quotient << k) | remainder)
}
