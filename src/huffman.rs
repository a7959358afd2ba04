//! Canonical Huffman coder: code-length limited to 15 bits, used as an
//! alternative fixed-table entropy back end to the range coder and ANS
//! codec when a block's statistics are static or known ahead of time.

use crate::bitstream::{BitStreamReader, BitStreamWriter};
use crate::error::{KanziError, Result};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::io::{Read, Write};

const MAX_CODE_LEN: u8 = 15;

/// Canonical code-length table plus the codes derived from it.
pub struct HuffmanTable {
    lengths: [u8; 256],
    codes: [u16; 256],
}

#[derive(Eq, PartialEq)]
struct HeapNode {
    freq: u64,
    // Tracks insertion order so the heap is a total order even when
    // frequencies tie (BinaryHeap requires Ord).
    seq: u32,
    symbols: Vec<u8>,
    depth: u8,
}

impl Ord for HeapNode {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.freq, self.seq).cmp(&(other.freq, other.seq))
    }
}

impl PartialOrd for HeapNode {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl HuffmanTable {
    /// Build a canonical table from per-symbol frequencies. Falls back
    /// to a flat code (length `ceil(log2(count of present symbols))`)
    /// if the ordinary Huffman tree would exceed `MAX_CODE_LEN` — rare
    /// in practice for byte alphabets, but cheap to guard against a
    /// pathological (e.g. Fibonacci-weighted) frequency table.
    pub fn build(freqs: &[u32; 256]) -> Result<HuffmanTable> {
        let present: Vec<u8> = (0..256).filter(|&s| freqs[s] != 0).map(|s| s as u8).collect();
        if present.is_empty() {
            return Err(KanziError::invalid_argument("huffman table needs at least one symbol"));
        }

        let mut lengths = [0u8; 256];
        if present.len() == 1 {
            lengths[present[0] as usize] = 1;
        } else {
            let mut heap: BinaryHeap<Reverse<HeapNode>> = BinaryHeap::new();
            let mut seq = 0u32;
            for &s in &present {
                heap.push(Reverse(HeapNode { freq: freqs[s as usize] as u64, seq, symbols: vec![s], depth: 0 }));
                seq += 1;
            }
            let mut depth_by_symbol = [0u8; 256];
            while heap.len() > 1 {
                let Reverse(a) = heap.pop().unwrap();
                let Reverse(b) = heap.pop().unwrap();
                for &s in a.symbols.iter().chain(b.symbols.iter()) {
                    depth_by_symbol[s as usize] += 1;
                }
                let mut symbols = a.symbols;
                symbols.extend(b.symbols);
                heap.push(Reverse(HeapNode {
                    freq: a.freq + b.freq,
                    seq,
                    symbols,
                    depth: a.depth.max(b.depth) + 1,
                }));
                seq += 1;
            }
            for &s in &present {
                lengths[s as usize] = depth_by_symbol[s as usize].max(1);
            }
        }

        let max_len = lengths.iter().copied().max().unwrap_or(0);
        if max_len > MAX_CODE_LEN {
            let flat_len = (32 - ((present.len() as u32 - 1).max(1)).leading_zeros()).max(1) as u8;
            for s in lengths.iter_mut() {
                *s = 0;
            }
            for &s in &present {
                lengths[s as usize] = flat_len;
            }
        }

        Ok(HuffmanTable::from_lengths(lengths))
    }

    fn from_lengths(lengths: [u8; 256]) -> HuffmanTable {
        let mut order: Vec<u8> = (0..256).filter(|&s| lengths[s as usize] != 0).collect();
        order.sort_by_key(|&s| (lengths[s as usize], s));

        let mut codes = [0u16; 256];
        let mut code = 0u32;
        let mut prev_len = 0u8;
        for &s in &order {
            let len = lengths[s as usize];
            code <<= len - prev_len;
            codes[s as usize] = code as u16;
            code += 1;
            prev_len = len;
        }

        HuffmanTable { lengths, codes }
    }

    /// Serialize the code-length table as one Exp-Golomb-coded length
    /// (`0` for an absent symbol) per byte value.
    pub fn write_lengths<W: Write>(&self, w: &mut BitStreamWriter<W>) -> Result<()> {
        for s in 0..256 {
            crate::expgolomb::write_unsigned(w, self.lengths[s])?;
        }
        Ok(())
    }

    /// Inverse of [`HuffmanTable::write_lengths`].
    pub fn read_lengths<R: Read>(r: &mut BitStreamReader<R>) -> Result<HuffmanTable> {
        let mut lengths = [0u8; 256];
        for s in 0..256 {
            lengths[s] = crate::expgolomb::read_unsigned(r)?;
        }
        Ok(HuffmanTable::from_lengths(lengths))
    }

    pub fn encode_byte<W: Write>(&self, w: &mut BitStreamWriter<W>, byte: u8) -> Result<()> {
        let len = self.lengths[byte as usize];
        if len == 0 {
            return Err(KanziError::invalid_argument("byte value absent from this huffman table"));
        }
        w.write_bits(self.codes[byte as usize] as u64, len as u32)
    }

    pub fn encode_block<W: Write>(&self, w: &mut BitStreamWriter<W>, data: &[u8]) -> Result<()> {
        for &b in data {
            self.encode_byte(w, b)?;
        }
        Ok(())
    }

    pub fn decode_byte<R: Read>(&self, r: &mut BitStreamReader<R>) -> Result<u8> {
        let mut code = 0u32;
        for len in 1..=MAX_CODE_LEN {
            code = (code << 1) | r.read_bits(1)? as u32;
            for s in 0..256 {
                if self.lengths[s] == len && self.codes[s] as u32 == code {
                    return Ok(s as u8);
                }
            }
        }
        Err(KanziError::invalid_format("no huffman code matched the bit stream"))
    }

    pub fn decode_block<R: Read>(&self, r: &mut BitStreamReader<R>, n: usize) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(self.decode_byte(r)?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::Histogram0;

    #[test]
    fn round_trips_skewed_text() {
        let data = b"aaaaaaaaaaaaaaaabbbbbbbbccccdde".repeat(5);
        let hist = Histogram0::new(&data);
        let mut freqs = [0u32; 256];
        freqs.copy_from_slice(hist.counts());
        let table = HuffmanTable::build(&freqs).unwrap();

        let mut buf = Vec::new();
        {
            let mut w = BitStreamWriter::new(&mut buf);
            table.encode_block(&mut w, &data).unwrap();
            w.close().unwrap();
        }
        let mut r = BitStreamReader::new(&buf[..]);
        let decoded = table.decode_block(&mut r, data.len()).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn single_symbol_alphabet_round_trips() {
        let mut freqs = [0u32; 256];
        freqs[b'x' as usize] = 10;
        let table = HuffmanTable::build(&freqs).unwrap();

        let mut buf = Vec::new();
        {
            let mut w = BitStreamWriter::new(&mut buf);
            table.encode_block(&mut w, b"xxxxx").unwrap();
            w.close().unwrap();
        }
        let mut r = BitStreamReader::new(&buf[..]);
        let decoded = table.decode_block(&mut r, 5).unwrap();
        assert_eq!(decoded, b"xxxxx");
    }

    #[test]
    fn length_table_round_trips_through_serialization() {
        let data = b"mississippi river mississippi";
        let hist = Histogram0::new(data);
        let mut freqs = [0u32; 256];
        freqs.copy_from_slice(hist.counts());
        let table = HuffmanTable::build(&freqs).unwrap();

        let mut buf = Vec::new();
        {
            let mut w = BitStreamWriter::new(&mut buf);
            table.write_lengths(&mut w).unwrap();
            table.encode_block(&mut w, data).unwrap();
            w.close().unwrap();
        }
        let mut r = BitStreamReader::new(&buf[..]);
        let restored = HuffmanTable::read_lengths(&mut r).unwrap();
        let decoded = restored.decode_block(&mut r, data.len()).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn empty_alphabet_is_rejected() {
        let freqs = [0u32; 256];
        assert!(HuffmanTable::build(&freqs).is_err());
    }
}
