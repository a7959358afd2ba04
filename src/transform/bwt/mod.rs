//! Burrows-Wheeler Transform and its parallel inverse, plus the
//! bijective variant (BWTS).

mod bwts;
mod suffix_array;

pub use bwts::BwtsTransform;

use crate::error::{KanziError, Result};
use crate::transform::varint_bytes::{push_varint, read_varint};
use crate::transform::{Transform, TransformContext};
use suffix_array::build_suffix_array;

/// Deterministic chunk count for a block of `size` bytes: a power of
/// two in `{1,2,4,8}` chosen to keep chunk size at or above 1 MiB
/// where possible.
pub fn get_bwt_chunks(size: usize) -> usize {
    const MIB: usize = 1 << 20;
    if size < MIB {
        1
    } else if size < 4 * MIB {
        2
    } else if size < 16 * MIB {
        4
    } else {
        8
    }
}

/// Bucket base offsets: `base[c]` is the count of bytes `< c` in `l`,
/// i.e. the start of `c`'s block in the sorted column F.
fn bucket_base(l: &[u8]) -> [u64; 256] {
    let mut counts = [0u64; 256];
    for &b in l {
        counts[b as usize] += 1;
    }
    let mut base = [0u64; 256];
    let mut sum = 0u64;
    for c in 0..256 {
        base[c] = sum;
        sum += counts[c];
    }
    base
}

/// Packs, for each position `i` in `l`, `(rank_in_bucket(l, i) << 8) |
/// l[i]` into a `u64`, uniformly rather than splitting a regular vs.
/// big-block 32-bit layout. `rank_in_bucket` is the number of earlier
/// occurrences of `l[i]`'s byte value in `l[0..i)`, which is exactly
/// what the LF mapping needs together with [`bucket_base`].
fn pack_rank_and_byte(l: &[u8]) -> Vec<u64> {
    let mut seen = [0u64; 256];
    let mut buf = Vec::with_capacity(l.len());
    for &b in l {
        let rank = seen[b as usize];
        buf.push((rank << 8) | b as u64);
        seen[b as usize] += 1;
    }
    buf
}

#[inline]
fn lf(buf: &[u64], base: &[u64; 256], row: usize) -> usize {
    let entry = buf[row];
    let byte = (entry & 0xFF) as usize;
    let rank = entry >> 8;
    (base[byte] + rank) as usize
}

pub struct BwtTransform {
    jobs: usize,
}

impl BwtTransform {
    pub fn new(ctx: &TransformContext) -> BwtTransform {
        BwtTransform { jobs: ctx.jobs() }
    }
}

impl Transform for BwtTransform {
    fn forward(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let n = input.len();
        if n == 0 {
            return Ok(Vec::new());
        }
        if n > (1 << 30) - 4 {
            return Err(KanziError::invalid_argument(format!(
                "bwt: block of {n} bytes exceeds the 2^30 - 4 byte limit"
            )));
        }

        let sa = build_suffix_array(input);
        let mut pos_to_row = vec![0u32; n];
        for (row, &pos) in sa.iter().enumerate() {
            pos_to_row[pos as usize] = row as u32;
        }
        let l: Vec<u8> = sa.iter().map(|&p| input[(p as usize + n - 1) % n]).collect();

        let chunks = get_bwt_chunks(n);
        let seg = n / chunks;
        let mut out = Vec::with_capacity(n + chunks * 5);
        for k in 0..chunks {
            let end = if k + 1 == chunks { n } else { (k + 1) * seg };
            let primary = pos_to_row[end % n];
            push_varint(&mut out, primary as u64);
        }
        out.extend_from_slice(&l);
        Ok(out)
    }

    fn inverse(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        if input.is_empty() {
            return Ok(Vec::new());
        }

        // The number of chunks is re-derived from `n`, not transmitted;
        // `n` itself is only known once the header's been stripped, so
        // probe candidate chunk counts against the remaining length.
        let mut pos = 0usize;
        let mut primaries: Vec<u64> = Vec::new();
        let (chunks, n) = probe_header(input, &mut pos, &mut primaries)?;
        let l = &input[pos..];
        if l.len() != n {
            return Err(KanziError::invalid_format(
                "bwt: decoded body length does not match derived block size",
            ));
        }

        let base = bucket_base(l);
        let buf = pack_rank_and_byte(l);
        let mut out = vec![0u8; n];
        let seg = n / chunks;

        let bounds: Vec<(usize, usize, usize)> = (0..chunks)
            .map(|k| {
                let start = k * seg;
                let end = if k + 1 == chunks { n } else { (k + 1) * seg };
                (start, end, primaries[k] as usize)
            })
            .collect();

        if chunks == 1 || self.jobs <= 1 {
            for &(start, end, primary) in &bounds {
                reconstruct_chunk(&buf, &base, l, start, end, primary, &mut out[start..end]);
            }
        } else {
            let chunks_out: Vec<&mut [u8]> = {
                let mut rest = out.as_mut_slice();
                let mut slices = Vec::with_capacity(bounds.len());
                let mut prev_end = 0usize;
                for &(start, end, _) in &bounds {
                    debug_assert_eq!(start, prev_end);
                    let (head, tail) = rest.split_at_mut(end - start);
                    slices.push(head);
                    rest = tail;
                    prev_end = end;
                }
                slices
            };
            std::thread::scope(|scope| {
                for ((start, end, primary), slice) in bounds.iter().copied().zip(chunks_out) {
                    let buf = &buf;
                    let base = &base;
                    scope.spawn(move || {
                        reconstruct_chunk(buf, base, l, start, end, primary, slice);
                    });
                }
            });
        }

        Ok(out)
    }

    fn name(&self) -> &'static str {
        "BWT"
    }
}

fn probe_header(input: &[u8], pos: &mut usize, primaries: &mut Vec<u64>) -> Result<(usize, usize)> {
    // Try each possible chunk count in increasing order; the correct
    // one is the first whose `get_bwt_chunks(remaining_len)` reproduces
    // the count we just read, since a primary-index varint can itself
    // range over many byte lengths.
    for candidate_chunks in [1usize, 2, 4, 8] {
        let mut p = *pos;
        let mut values = Vec::with_capacity(candidate_chunks);
        let mut ok = true;
        for _ in 0..candidate_chunks {
            match read_varint(input, &mut p) {
                Ok(v) => values.push(v),
                Err(_) => {
                    ok = false;
                    break;
                }
            }
        }
        if !ok {
            continue;
        }
        let remaining = input.len().saturating_sub(p);
        if remaining == 0 {
            continue;
        }
        if get_bwt_chunks(remaining) == candidate_chunks {
            *pos = p;
            *primaries = values;
            return Ok((candidate_chunks, remaining));
        }
    }
    Err(KanziError::invalid_format("bwt: could not recover chunk count from header"))
}

fn reconstruct_chunk(
    buf: &[u64],
    base: &[u64; 256],
    l: &[u8],
    start: usize,
    end: usize,
    primary: usize,
    out: &mut [u8],
) {
    let mut row = primary;
    for i in (start..end).rev() {
        out[i - start] = l[row];
        row = lf(buf, base, row);
    }
}
