//! Chunked order-0/order-1 rANS entropy codec.
//!
//! A block is split into one or more chunks (`chunkSize` bytes each, the
//! final chunk taking the remainder); each chunk carries its own
//! normalized frequency tables and is encoded independently, so chunks
//! can in principle be processed in parallel (this module processes
//! them sequentially — the BWT inverse is the corpus's parallel hot
//! spot, see [`crate::transform::bwt`]).
//!
//! Built on the encoder/decoder symbol tables in [`symbol`], the
//! normalization and sparse-alphabet helpers in
//! [`crate::entropy_utils`], and the histograms in [`crate::histogram`].

pub mod symbol;

use crate::bitstream::{BitStreamReader, BitStreamWriter};
use crate::entropy_utils::{decode_alphabet, encode_alphabet, normalize_frequencies, read_varint, write_varint};
use crate::error::{KanziError, Result};
use crate::histogram::{Histogram0, Histogram1};
use symbol::{DecodeTable, EncSymbol, ANS_TOP};
use std::io::{Read, Write};

/// Order-0: one context for the whole chunk. Order-1: 256 contexts
/// keyed by the previous byte; the first byte of a chunk has no
/// predecessor, so it is coded under a fixed virtual context of 0
/// rather than a separate unconditional table (resolves the spec's
/// "anchor" wording — see `DESIGN.md` — while keeping exactly 256
/// context tables for order-1, matching "k in [0, 255*order]").
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    Zero,
    One,
}

impl Order {
    fn as_u8(self) -> u8 {
        match self {
            Order::Zero => 0,
            Order::One => 1,
        }
    }

    fn from_u8(v: u8) -> Result<Order> {
        match v {
            0 => Ok(Order::Zero),
            1 => Ok(Order::One),
            _ => Err(KanziError::invalid_format("unsupported ANS order")),
        }
    }
}

/// Encode `block` as a chunked rANS stream. `chunk_size == 0` means
/// "whole block as one chunk". `log_range` is clamped to `8..=15` (the
/// header's 3-bit `lr-8` field cannot represent more).
pub fn encode(block: &[u8], order: Order, chunk_size: usize, log_range: u32) -> Result<Vec<u8>> {
    let log_range = log_range.clamp(8, 15);
    let mut out = Vec::new();
    {
        let mut w = BitStreamWriter::new(&mut out);
        write_varint(&mut w, block.len() as u64)?;
        w.write_bits(order.as_u8() as u64, 8)?;
        let eff_chunk = if chunk_size == 0 { block.len().max(1) } else { chunk_size };
        write_varint(&mut w, eff_chunk as u64)?;
        for chunk in block.chunks(eff_chunk) {
            encode_chunk(&mut w, chunk, order, log_range)?;
        }
        w.close()?;
    }
    Ok(out)
}

/// Inverse of [`encode`]. Self-describing: order, chunk size and block
/// length are read back from the stream header.
pub fn decode(data: &[u8]) -> Result<Vec<u8>> {
    let mut r = BitStreamReader::new(data);
    let len = read_varint(&mut r)? as usize;
    let order = Order::from_u8(read_varint(&mut r)? as u8)?;
    let eff_chunk = read_varint(&mut r)? as usize;

    let mut out = Vec::with_capacity(len);
    let mut remaining = len;
    while remaining > 0 {
        let take = remaining.min(eff_chunk.max(1));
        let chunk = decode_chunk(&mut r, take, order)?;
        out.extend(chunk);
        remaining -= take;
    }
    Ok(out)
}

fn lr_for_chunk(log_range: u32, chunk_len: usize) -> u32 {
    let mut lr = log_range;
    while lr > 8 && (1usize << lr) > chunk_len {
        lr -= 1;
    }
    lr
}

fn llr_for(lr: u32) -> u32 {
    let mut llr = 1;
    while (1u32 << llr) <= lr {
        llr += 1;
    }
    llr
}

fn write_context_header<W: Write>(w: &mut BitStreamWriter<W>, freqs: &[u32; 256], lr: u32) -> Result<()> {
    let symbols: Vec<usize> = (0..256).filter(|&i| freqs[i] != 0).collect();
    encode_alphabet(w, &symbols)?;
    if symbols.is_empty() {
        return Ok(());
    }
    let llr = llr_for(lr);
    let chk_size = if symbols.len() >= 64 { 12 } else { 6 };
    for group in symbols.chunks(chk_size) {
        let max = group.iter().map(|&s| freqs[s]).max().unwrap();
        let log2max = 31 - max.leading_zeros(); // max >= 1 always
        let bits = log2max + 1;
        w.write_bits(log2max as u64, llr)?;
        for &s in group {
            w.write_bits(freqs[s] as u64, bits)?;
        }
    }
    Ok(())
}

fn read_context_header<R: Read>(r: &mut BitStreamReader<R>, lr: u32) -> Result<[u32; 256]> {
    let symbols = decode_alphabet(r)?;
    let mut freqs = [0u32; 256];
    if symbols.is_empty() {
        return Ok(freqs);
    }
    let llr = llr_for(lr);
    let chk_size = if symbols.len() >= 64 { 12 } else { 6 };
    for group in symbols.chunks(chk_size) {
        let log2max = r.read_bits(llr)? as u32;
        let bits = log2max + 1;
        for &s in group {
            freqs[s] = r.read_bits(bits)? as u32;
        }
    }
    Ok(freqs)
}

fn build_tables(freqs: &[u32; 256], lr: u32) -> ([Option<EncSymbol>; 256], DecodeTable) {
    let mut enc = [None; 256];
    let mut acc = 0u32;
    for s in 0..256 {
        let f = freqs[s];
        if f > 0 {
            enc[s] = Some(EncSymbol::new(acc, f, lr));
        }
        acc += f;
    }
    (enc, DecodeTable::new(freqs, lr))
}

fn ctx_for(order: Order, i: usize, chunk: &[u8]) -> usize {
    match order {
        Order::Zero => 0,
        Order::One => {
            if i == 0 {
                0
            } else {
                chunk[i - 1] as usize
            }
        }
    }
}

fn encode_chunk<W: Write>(w: &mut BitStreamWriter<W>, chunk: &[u8], order: Order, log_range: u32) -> Result<()> {
    let lr = lr_for_chunk(log_range, chunk.len());
    w.write_bits((lr - 8) as u64, 3)?;

    let num_ctxs = match order {
        Order::Zero => 1,
        Order::One => 256,
    };
    let mut enc_tables: Vec<[Option<EncSymbol>; 256]> = Vec::with_capacity(num_ctxs);

    match order {
        Order::Zero => {
            let hist = Histogram0::new(chunk);
            let mut raw = [0u64; 256];
            raw.copy_from_slice(hist.counts());
            let normalized = normalize_frequencies(&raw, lr)?;
            let mut freqs = [0u32; 256];
            freqs.copy_from_slice(&normalized);
            write_context_header(w, &freqs, lr)?;
            let (enc, _dec) = build_tables(&freqs, lr);
            enc_tables.push(enc);
        }
        Order::One => {
            let hist1 = Histogram1::new(chunk);
            for ctx in 0..256 {
                let mut raw = [0u64; 256];
                raw.copy_from_slice(hist1.counts(ctx));
                if ctx == 0 && !chunk.is_empty() {
                    raw[chunk[0] as usize] += 1;
                }
                if raw.iter().all(|&f| f == 0) {
                    // unused context: emit a degenerate single-symbol table
                    // (symbol 0) so decode never indexes an empty table.
                    raw[0] = 1;
                }
                let normalized = normalize_frequencies(&raw, lr)?;
                let mut freqs = [0u32; 256];
                freqs.copy_from_slice(&normalized);
                write_context_header(w, &freqs, lr)?;
                let (enc, _dec) = build_tables(&freqs, lr);
                enc_tables.push(enc);
            }
        }
    }

    let mut st = ANS_TOP;
    let mut renorm_bytes = Vec::new();
    for i in (0..chunk.len()).rev() {
        let ctx = ctx_for(order, i, chunk);
        let sym = chunk[i];
        let enc = enc_tables[ctx][sym as usize]
            .ok_or_else(|| KanziError::invalid_format("symbol missing from its context table"))?;
        while st >= enc.x_max {
            renorm_bytes.push((st & 0xFF) as u8);
            st >>= 8;
        }
        st = enc.encode(st);
    }
    renorm_bytes.reverse();

    write_varint(w, renorm_bytes.len() as u64)?;
    w.write_bytes(&renorm_bytes)?;
    w.write_bits(st as u64, 32)?;
    Ok(())
}

fn decode_chunk<R: Read>(r: &mut BitStreamReader<R>, chunk_len: usize, order: Order) -> Result<Vec<u8>> {
    let lr = r.read_bits(3)? as u32 + 8;
    let num_ctxs = match order {
        Order::Zero => 1,
        Order::One => 256,
    };
    let mut dec_tables: Vec<DecodeTable> = Vec::with_capacity(num_ctxs);
    for _ in 0..num_ctxs {
        let freqs = read_context_header(r, lr)?;
        dec_tables.push(DecodeTable::new(&freqs, lr));
    }

    let renorm_len = read_varint(r)? as usize;
    let renorm_bytes = r.read_bytes(renorm_len)?;
    let mut st = r.read_bits(32)? as u32;

    let mask = (1u32 << lr) - 1;
    let mut idx = 0usize;
    let mut out = Vec::with_capacity(chunk_len);
    let mut prev = 0u8;
    for i in 0..chunk_len {
        let ctx = match order {
            Order::Zero => 0,
            Order::One => {
                if i == 0 {
                    0
                } else {
                    prev as usize
                }
            }
        };
        let table = &dec_tables[ctx];
        let slot = st & mask;
        let sym = table.symbol_at_slot(slot);
        out.push(sym);
        st = table.advance(st, sym);
        while st < ANS_TOP {
            let b = if idx < renorm_bytes.len() { renorm_bytes[idx] } else { 0 };
            idx += 1;
            st = (st << 8) | b as u32;
        }
        prev = sym;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order0_round_trips_whole_block_as_one_chunk() {
        let data = b"mississippi river mississippi river mississippi".repeat(4);
        let encoded = encode(&data, Order::Zero, 0, 12).unwrap();
        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn order1_round_trips_whole_block_as_one_chunk() {
        let data = b"abababababcabcabcabcabcabcabcabcabcabcabc".repeat(3);
        let encoded = encode(&data, Order::One, 0, 12).unwrap();
        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn multi_chunk_round_trips() {
        let mut data = Vec::new();
        for i in 0..2000u32 {
            data.push((i % 251) as u8);
        }
        let encoded = encode(&data, Order::Zero, 256, 12).unwrap();
        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn empty_block_round_trips() {
        let encoded = encode(&[], Order::Zero, 0, 12).unwrap();
        let decoded = decode(&encoded).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn single_symbol_block_round_trips() {
        let data = vec![42u8; 300];
        let encoded = encode(&data, Order::One, 0, 12).unwrap();
        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn small_chunk_reduces_log_range() {
        let data = b"ab";
        let encoded = encode(data, Order::Zero, 0, 15).unwrap();
        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded, data);
    }
}
