//! Exp-Golomb byte codec: the default fallback entropy code for bytes
//! that don't warrant a full ANS or TPAQ pass (small blocks, headers).
//!
//! Unsigned encode: `v = 0` is the single bit `1`; otherwise let
//! `L = floor(log2(v+1))`, emit `L-1` zero bits, a `0`, a `1`, then the
//! low `L` bits of `v+1`. Signed encode reuses the unsigned code on the
//! magnitude with an extra trailing sign bit.

use crate::bitstream::{BitStreamReader, BitStreamWriter};
use crate::error::Result;
use std::io::{Read, Write};

/// Encode one byte value `0..=255`.
pub fn write_unsigned<W: Write>(w: &mut BitStreamWriter<W>, v: u8) -> Result<()> {
    if v == 0 {
        return w.write_bits(1, 1);
    }
    let n = v as u32 + 1;
    let l = 31 - n.leading_zeros(); // floor(log2(n))
    for _ in 0..l.saturating_sub(1) {
        w.write_bits(0, 1)?;
    }
    if l > 0 {
        w.write_bits(0, 1)?;
    }
    w.write_bits(1, 1)?;
    w.write_bits(n as u64, l)?;
    Ok(())
}

/// Decode one byte value encoded by [`write_unsigned`].
pub fn read_unsigned<R: Read>(r: &mut BitStreamReader<R>) -> Result<u8> {
    if r.read_bits(1)? == 1 {
        return Ok(0);
    }
    let mut log2 = 1u32;
    loop {
        if r.read_bits(1)? == 1 {
            break;
        }
        log2 += 1;
    }
    let low = r.read_bits(log2)?;
    let v = (1u64 << log2) - 1 + low;
    Ok(v as u8)
}

/// Encode one signed byte value (`-128..=127`, carried as `i32` so the
/// caller isn't forced to widen magnitudes manually) as its Exp-Golomb
/// magnitude plus a trailing sign bit (`1` for negative).
pub fn write_signed<W: Write>(w: &mut BitStreamWriter<W>, v: i32) -> Result<()> {
    let sign = if v < 0 { 1u8 } else { 0u8 };
    let magnitude = v.unsigned_abs() as u8;
    write_unsigned(w, magnitude)?;
    w.write_bits(sign as u64, 1)?;
    Ok(())
}

/// Decode one signed byte value encoded by [`write_signed`].
pub fn read_signed<R: Read>(r: &mut BitStreamReader<R>) -> Result<i32> {
    let res = read_unsigned(r)? as i32;
    let sgn = r.read_bits(1)? as i32; // 0 or 1
    Ok((res - sgn) ^ (-sgn))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsigned_round_trips_every_byte_value() {
        let mut buf = Vec::new();
        {
            let mut w = BitStreamWriter::new(&mut buf);
            for v in 0..=255u8 {
                write_unsigned(&mut w, v).unwrap();
            }
            w.close().unwrap();
        }
        let mut r = BitStreamReader::new(&buf[..]);
        for v in 0..=255u8 {
            assert_eq!(read_unsigned(&mut r).unwrap(), v, "value {v}");
        }
    }

    #[test]
    fn signed_round_trips_every_byte_magnitude_and_sign() {
        let mut buf = Vec::new();
        let values: Vec<i32> = (-127..=127).collect();
        {
            let mut w = BitStreamWriter::new(&mut buf);
            for &v in &values {
                write_signed(&mut w, v).unwrap();
            }
            w.close().unwrap();
        }
        let mut r = BitStreamReader::new(&buf[..]);
        for &v in &values {
            assert_eq!(read_signed(&mut r).unwrap(), v, "value {v}");
        }
    }

    #[test]
    fn zero_is_a_single_bit() {
        let mut buf = Vec::new();
        {
            let mut w = BitStreamWriter::new(&mut buf);
            write_unsigned(&mut w, 0).unwrap();
            w.close().unwrap();
        }
        assert_eq!(buf, vec![0b1000_0000]);
    }
}
