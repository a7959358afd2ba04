//! General byte run-length transform.
//!
//! Picks the least-frequent byte value in the block as an escape marker
//! (recorded as the first output byte), then emits `escape, byte, varint(run)`
//! for any run at or above [`MIN_RUN`] and for every literal occurrence of
//! the escape byte itself (which must always be escaped to stay
//! unambiguous), and passes shorter runs of any other byte through as
//! literals.

use crate::error::{KanziError, Result};
use crate::transform::varint_bytes::{push_varint, read_varint};
use crate::transform::Transform;

/// Runs shorter than this are left as literal bytes; it costs 3+ bytes
/// to escape a run, so escaping only pays off once it saves more than
/// it costs.
const MIN_RUN: usize = 4;

#[derive(Default)]
pub struct RltTransform;

impl RltTransform {
    pub fn new() -> RltTransform {
        RltTransform
    }
}

fn least_frequent_byte(input: &[u8]) -> u8 {
    let mut counts = [0u64; 256];
    for &b in input {
        counts[b as usize] += 1;
    }
    counts
        .iter()
        .enumerate()
        .min_by_key(|&(_, &count)| count)
        .map(|(b, _)| b as u8)
        .unwrap_or(0)
}

impl Transform for RltTransform {
    fn forward(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let escape = least_frequent_byte(input);
        let mut out = Vec::with_capacity(input.len() + 1);
        out.push(escape);

        let mut i = 0usize;
        while i < input.len() {
            let b = input[i];
            let mut run = 1usize;
            while i + run < input.len() && input[i + run] == b {
                run += 1;
            }
            if b == escape || run >= MIN_RUN {
                out.push(escape);
                out.push(b);
                push_varint(&mut out, run as u64);
            } else {
                out.extend(std::iter::repeat(b).take(run));
            }
            i += run;
        }
        Ok(out)
    }

    fn inverse(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let escape = *input
            .first()
            .ok_or_else(|| KanziError::invalid_format("rlt: missing escape byte header"))?;
        let mut pos = 1usize;
        let mut out = Vec::with_capacity(input.len());
        while pos < input.len() {
            let b = input[pos];
            if b == escape {
                pos += 1;
                let literal = *input
                    .get(pos)
                    .ok_or_else(|| KanziError::invalid_format("rlt: truncated escape sequence"))?;
                pos += 1;
                let run = read_varint(input, &mut pos)?;
                out.extend(std::iter::repeat(literal).take(run as usize));
            } else {
                out.push(b);
                pos += 1;
            }
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "RLT"
    }
}
