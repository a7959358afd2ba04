//! Zero run-length transform.
//!
//! Splits the block into alternating (zero-run length, single non-zero
//! literal) segments, self-describing via a leading varint of the
//! original length so the inverse knows when to stop without needing an
//! external length channel. Effective after a transform (MTFT, BWT) that
//! concentrates the alphabet around zero.

use crate::error::{KanziError, Result};
use crate::transform::varint_bytes::{push_varint, read_varint};
use crate::transform::Transform;

#[derive(Default)]
pub struct ZrltTransform;

impl ZrltTransform {
    pub fn new() -> ZrltTransform {
        ZrltTransform
    }
}

impl Transform for ZrltTransform {
    fn forward(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(input.len() + 8);
        push_varint(&mut out, input.len() as u64);
        let mut i = 0usize;
        while i < input.len() {
            let mut run = 0u64;
            while i < input.len() && input[i] == 0 {
                run += 1;
                i += 1;
            }
            push_varint(&mut out, run);
            if i < input.len() {
                out.push(input[i]);
                i += 1;
            }
        }
        Ok(out)
    }

    fn inverse(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut pos = 0usize;
        let total = read_varint(input, &mut pos)? as usize;
        let mut out = Vec::with_capacity(total);
        while out.len() < total {
            let run = read_varint(input, &mut pos)?;
            out.resize(out.len() + run as usize, 0);
            if out.len() < total {
                let literal = *input
                    .get(pos)
                    .ok_or_else(|| KanziError::invalid_format("zrlt: truncated literal"))?;
                pos += 1;
                out.push(literal);
            }
        }
        if out.len() != total {
            return Err(KanziError::invalid_format("zrlt: decoded length mismatch"));
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "ZRLT"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_runs_of_zero() {
        let data = vec![0, 0, 0, 5, 0, 0, 9, 9, 0, 0, 0, 0, 0];
        let mut t = ZrltTransform::new();
        let fwd = t.forward(&data).unwrap();
        let inv = t.inverse(&fwd).unwrap();
        assert_eq!(inv, data);
    }

    #[test]
    fn round_trips_empty_and_no_zeros() {
        let mut t = ZrltTransform::new();
        assert_eq!(t.inverse(&t.forward(&[]).unwrap()).unwrap(), Vec::<u8>::new());
        let data = vec![1, 2, 3, 4, 5];
        assert_eq!(t.inverse(&t.forward(&data).unwrap()).unwrap(), data);
    }

    #[test]
    fn round_trips_all_zero_block() {
        let data = vec![0u8; 4096];
        let mut t = ZrltTransform::new();
        let fwd = t.forward(&data).unwrap();
        assert!(fwd.len() < 16, "a long zero run should compress to a few header bytes");
        assert_eq!(t.inverse(&fwd).unwrap(), data);
    }
}
