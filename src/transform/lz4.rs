//! LZ4-style literal/match block transform.
//!
//! Close to the real LZ4 block format: a token byte packs a literal-run
//! length nibble and a match-length nibble (each extended with
//! 255-valued continuation bytes when it overflows 15), followed by the
//! literal bytes themselves, a 2-byte little-endian back-reference
//! offset, and (after the final literal run) nothing — the decoder
//! knows to stop once it has produced `original_length` bytes, taken
//! from a leading varint header rather than from LZ4's own frame
//! format, since this transform is a standalone stage rather than a
//! full LZ4 frame.

use crate::error::{KanziError, Result};
use crate::transform::lz_common::{MatchFinder, MIN_MATCH};
use crate::transform::varint_bytes::{push_varint, read_varint};
use crate::transform::Transform;

fn write_length_extra(out: &mut Vec<u8>, mut remaining: usize) {
    while remaining >= 255 {
        out.push(255);
        remaining -= 255;
    }
    out.push(remaining as u8);
}

fn read_length_extra(input: &[u8], pos: &mut usize) -> Result<usize> {
    let mut total = 0usize;
    loop {
        let b = *input
            .get(*pos)
            .ok_or_else(|| KanziError::invalid_format("lz4: truncated length extension"))?;
        *pos += 1;
        total += b as usize;
        if b != 255 {
            break;
        }
    }
    Ok(total)
}

#[derive(Default)]
pub struct Lz4Transform;

impl Lz4Transform {
    pub fn new() -> Lz4Transform {
        Lz4Transform
    }
}

impl Transform for Lz4Transform {
    fn forward(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(input.len() + 8);
        push_varint(&mut out, input.len() as u64);

        let mut finder = MatchFinder::new(input);
        let mut literal_start = 0usize;
        let mut pos = 0usize;
        while pos < input.len() {
            match finder.find(pos) {
                Some(m) => {
                    let lit_len = pos - literal_start;
                    let token_idx = out.len();
                    out.push(0);
                    let lit_nibble = lit_len.min(15);
                    if lit_len >= 15 {
                        write_length_extra(&mut out, lit_len - 15);
                    }
                    out.extend_from_slice(&input[literal_start..pos]);

                    let offset = (pos - m.match_pos) as u16;
                    out.extend_from_slice(&offset.to_le_bytes());
                    let match_extra = m.len - MIN_MATCH;
                    let match_nibble = match_extra.min(15);
                    if match_extra >= 15 {
                        write_length_extra(&mut out, match_extra - 15);
                    }
                    out[token_idx] = ((lit_nibble as u8) << 4) | (match_nibble as u8);

                    for p in pos + 1..pos + m.len {
                        finder.insert(p);
                    }
                    pos += m.len;
                    literal_start = pos;
                }
                None => pos += 1,
            }
        }

        let lit_len = input.len() - literal_start;
        let token_idx = out.len();
        out.push(0);
        let lit_nibble = lit_len.min(15);
        if lit_len >= 15 {
            write_length_extra(&mut out, lit_len - 15);
        }
        out.extend_from_slice(&input[literal_start..]);
        out[token_idx] = (lit_nibble as u8) << 4;

        Ok(out)
    }

    fn inverse(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut pos = 0usize;
        let total = read_varint(input, &mut pos)? as usize;
        let mut out = Vec::with_capacity(total);

        while out.len() < total {
            let token = *input
                .get(pos)
                .ok_or_else(|| KanziError::invalid_format("lz4: truncated token"))?;
            pos += 1;
            let mut lit_len = (token >> 4) as usize;
            if lit_len == 15 {
                lit_len += read_length_extra(input, &mut pos)?;
            }
            let lit_end = pos + lit_len;
            let literal = input
                .get(pos..lit_end)
                .ok_or_else(|| KanziError::invalid_format("lz4: truncated literal run"))?;
            out.extend_from_slice(literal);
            pos = lit_end;

            if out.len() == total {
                break;
            }

            let offset_bytes = input
                .get(pos..pos + 2)
                .ok_or_else(|| KanziError::invalid_format("lz4: truncated offset"))?;
            let offset = u16::from_le_bytes([offset_bytes[0], offset_bytes[1]]) as usize;
            pos += 2;
            if offset == 0 || offset > out.len() {
                return Err(KanziError::invalid_format("lz4: offset out of range"));
            }

            let mut match_len = (token & 0x0F) as usize;
            if match_len == 15 {
                match_len += read_length_extra(input, &mut pos)?;
            }
            match_len += MIN_MATCH;

            let start = out.len() - offset;
            for i in 0..match_len {
                let b = out[start + i];
                out.push(b);
            }
        }

        if out.len() != total {
            return Err(KanziError::invalid_format("lz4: decoded length mismatch"));
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "LZ4"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_repetitive_text() {
        let data = b"the quick brown fox the quick brown fox the quick brown fox".to_vec();
        let mut t = Lz4Transform::new();
        let fwd = t.forward(&data).unwrap();
        assert_eq!(t.inverse(&fwd).unwrap(), data);
    }

    #[test]
    fn round_trips_long_literal_run_with_no_matches() {
        let data: Vec<u8> = (0..=255u8).cycle().take(40).collect();
        let mut t = Lz4Transform::new();
        let fwd = t.forward(&data).unwrap();
        assert_eq!(t.inverse(&fwd).unwrap(), data);
    }

    #[test]
    fn round_trips_long_run_needing_length_extension() {
        let data = vec![b'z'; 1000];
        let mut t = Lz4Transform::new();
        let fwd = t.forward(&data).unwrap();
        assert!(fwd.len() < data.len());
        assert_eq!(t.inverse(&fwd).unwrap(), data);
    }

    #[test]
    fn round_trips_empty() {
        let mut t = Lz4Transform::new();
        let fwd = t.forward(&[]).unwrap();
        assert_eq!(t.inverse(&fwd).unwrap(), Vec::<u8>::new());
    }
}
