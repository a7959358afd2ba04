//! Per-symbol encoder tables: renormalization threshold and the
//! Alverson reciprocal-division constants that let the encoder avoid
//! an actual division per symbol.

/// Lower renormalization bound. A byte-renormalizing rANS state must
/// never grow so large that after folding in the next symbol it would
/// overflow 32 bits; `ANS_TOP` is the largest power of two for which
/// that holds with one byte of headroom per renormalization step.
pub const ANS_TOP: u32 = 1 << 23;

/// Encoder-side per-(symbol, context) table: renormalization
/// threshold `x_max`, the complement frequency, and the reciprocal
/// constants used to replace `state / freq` with a multiply-and-shift.
#[derive(Clone, Copy, Debug)]
pub struct EncSymbol {
    pub x_max: u32,
    pub cmpl_freq: u32,
    pub bias: u32,
    pub inv_freq: u32,
    pub inv_shift: u32,
    pub cum_freq: u32,
}

impl EncSymbol {
    /// Build the encoder table entry for a symbol with cumulative
    /// frequency `cum_freq`, normalized frequency `freq`, under a
    /// `2^lr`-sized frequency range. `freq` must be nonzero.
    ///
    /// `freq == 1` is a degenerate case for the reciprocal method
    /// below and is special-cased (`inv_freq = 0xFFFF_FFFF`,
    /// `inv_shift = 32`, `bias = cum_freq + 2^lr - 1`); the general
    /// branch implements Alverson's reciprocal-division method, with
    /// the constants chosen so the `freq == 1` case's algebra falls
    /// out of the same formula at the boundary (see `DESIGN.md`).
    pub fn new(cum_freq: u32, freq: u32, lr: u32) -> EncSymbol {
        debug_assert!(freq >= 1);
        let range = 1u32 << lr;
        let x_max = ((ANS_TOP >> lr) << 8) * freq;
        let cmpl_freq = range - freq;

        if freq < 2 {
            EncSymbol {
                x_max,
                cmpl_freq,
                bias: cum_freq + range - 1,
                inv_freq: u32::MAX,
                inv_shift: 32,
                cum_freq,
            }
        } else {
            let mut shift = 0u32;
            while freq > (1u32 << shift) {
                shift += 1;
            }
            let inv_freq = (((1u64 << (shift as u64 + 31)) + freq as u64 - 1) / freq as u64) as u32;
            EncSymbol {
                x_max,
                cmpl_freq,
                bias: cum_freq,
                inv_freq,
                inv_shift: 32 + (shift - 1),
                cum_freq,
            }
        }
    }

    /// Advance the rANS state past this symbol, after the caller has
    /// already flushed renormalization bytes down to below `x_max`.
    #[inline]
    pub fn encode(&self, st: u32) -> u32 {
        let q = (((st as u64) * (self.inv_freq as u64)) >> self.inv_shift) as u32;
        q * self.cmpl_freq + st + self.bias
    }
}

/// Decoder-side table: for a 2^lr-entry slot, which symbol owns it
/// and that symbol's (cumFreq, freq) pair, used to update the state
/// after folding the symbol back out.
pub struct DecodeTable {
    pub lr: u32,
    /// `slot_symbol[i]` is the symbol occupying decode slot `i`.
    slot_symbol: Vec<u8>,
    pub cum_freq: [u32; 257],
    pub freq: [u32; 256],
}

impl DecodeTable {
    /// Build the decode table from normalized frequencies (sum `==
    /// 2^lr`, index 256 unused by convention — callers pass a
    /// 256-entry frequency array).
    pub fn new(freqs: &[u32; 256], lr: u32) -> DecodeTable {
        let range = 1usize << lr;
        let mut slot_symbol = vec![0u8; range];
        let mut cum_freq = [0u32; 257];
        let mut acc = 0u32;
        for s in 0..256 {
            cum_freq[s] = acc;
            let f = freqs[s];
            for slot in acc..acc + f {
                slot_symbol[slot as usize] = s as u8;
            }
            acc += f;
        }
        cum_freq[256] = acc;
        DecodeTable {
            lr,
            slot_symbol,
            cum_freq,
            freq: *freqs,
        }
    }

    #[inline]
    pub fn symbol_at_slot(&self, slot: u32) -> u8 {
        self.slot_symbol[slot as usize]
    }

    /// Fold a decoded symbol back out of the state: `st <- freq_s *
    /// (st >> lr) + (st & mask) - cumFreq_s`.
    #[inline]
    pub fn advance(&self, st: u32, symbol: u8) -> u32 {
        let mask = (1u32 << self.lr) - 1;
        let f = self.freq[symbol as usize];
        let c = self.cum_freq[symbol as usize];
        f.wrapping_mul(st >> self.lr) + (st & mask) - c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_documented_freq_one_vector() {
        let sym = EncSymbol::new(0, 1, 12);
        assert_eq!(sym.inv_freq, 0xFFFF_FFFF);
        assert_eq!(sym.inv_shift, 32);
        assert_eq!(sym.bias, (1 << 12) - 1);
    }

    #[test]
    fn power_of_two_freq_uses_general_formula() {
        let sym = EncSymbol::new(0, 2048, 12);
        assert_eq!(sym.cmpl_freq, (1 << 12) - 2048);
        assert_eq!(sym.bias, 0);
        assert!(sym.inv_freq > 0);
    }

    #[test]
    fn encode_then_decode_round_trips_a_run_of_symbols() {
        // A tiny two-symbol alphabet, frequencies 3:1 out of 2^4.
        let lr = 4u32;
        let freqs = {
            let mut f = [0u32; 256];
            f[b'a' as usize] = 12;
            f[b'b' as usize] = 4;
            f
        };
        let enc_a = EncSymbol::new(0, 12, lr);
        let enc_b = EncSymbol::new(12, 4, lr);
        let table = DecodeTable::new(&freqs, lr);

        let symbols = b"aaabaaab";
        let mut st = ANS_TOP;
        let mut bytes = Vec::new();
        for &s in symbols.iter().rev() {
            let enc = if s == b'a' { &enc_a } else { &enc_b };
            while st >= enc.x_max {
                bytes.push((st & 0xFF) as u8);
                st >>= 8;
            }
            st = enc.encode(st);
        }

        let mut decoded = Vec::new();
        for _ in 0..symbols.len() {
            let slot = st & ((1 << lr) - 1);
            let s = table.symbol_at_slot(slot);
            decoded.push(s);
            st = table.advance(st, s);
            while st < ANS_TOP {
                let b = bytes.pop().unwrap();
                st = (st << 8) | b as u32;
            }
        }
        assert_eq!(st, ANS_TOP);
        assert_eq!(decoded, symbols);
    }
}
