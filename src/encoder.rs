//! Binary arithmetic encoder: a classic range coder over 64-bit bounds,
//! split at each bit by whatever [`Predictor`] drives it.
//!
//! Widened from the teacher's 32-bit `Encoder` to the 64-bit bounds the
//! design calls for; the split/renormalize arithmetic is otherwise the
//! same shape (same masked `(high ^ low)` renormalization test, same
//! one-extra-byte flush).

use crate::predictor::Predictor;

pub struct Encoder<P: Predictor> {
    high: u64,
    low: u64,
    predictor: P,
    pub out: Vec<u8>,
}

impl<P: Predictor> Encoder<P> {
    pub fn new(predictor: P, blk_sz: usize) -> Encoder<P> {
        Encoder {
            high: u64::MAX,
            low: 0,
            predictor,
            out: Vec::with_capacity(blk_sz),
        }
    }

    pub fn compress_bit(&mut self, bit: i32) {
        let mut p = self.predictor.p() as u64;
        if p == 0 {
            p = 1;
        }

        let range = self.high - self.low;
        let mid = self.low + (range >> 12) * p + (((range & 0x0FFF) * p) >> 12);

        if bit == 1 {
            self.high = mid;
        } else {
            self.low = mid + 1;
        }
        self.predictor.update(bit);

        while (self.high ^ self.low) & 0xFF00_0000_0000_0000 == 0 {
            self.out.push((self.high >> 56) as u8);
            self.high = (self.high << 8) | 0xFF;
            self.low <<= 8;
        }
    }

    pub fn compress_block(&mut self, block: &[u8]) -> Vec<u8> {
        for byte in block.iter() {
            for i in (0..=7).rev() {
                self.compress_bit(((*byte >> i) & 1) as i32);
            }
        }
        self.flush();
        self.out.clone()
    }

    pub fn flush(&mut self) {
        while (self.high ^ self.low) & 0xFF00_0000_0000_0000 == 0 {
            self.out.push((self.high >> 56) as u8);
            self.high = (self.high << 8) | 0xFF;
            self.low <<= 8;
        }
        self.out.push((self.high >> 56) as u8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::Decoder;
    use crate::predictor::FpaqPredictor;

    #[test]
    fn round_trips_through_fpaq_predictor() {
        let data = b"banana banana banana banana banana";
        let mut enc = Encoder::new(FpaqPredictor::new(), 64);
        let compressed = enc.compress_block(data);

        let mut dec = Decoder::new(compressed, FpaqPredictor::new());
        dec.init_x();
        let out = dec.decompress_block(data.len());
        assert_eq!(out, data);
    }

    #[test]
    fn round_trips_incompressible_random_data() {
        let mut data = vec![0u8; 512];
        let mut x: u32 = 0x2545F4914F6CDD1Du32 as u32;
        for b in data.iter_mut() {
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            *b = (x & 0xFF) as u8;
        }

        let mut enc = Encoder::new(FpaqPredictor::new(), 1024);
        let compressed = enc.compress_block(&data);

        let mut dec = Decoder::new(compressed, FpaqPredictor::new());
        dec.init_x();
        let out = dec.decompress_block(data.len());
        assert_eq!(out, data);
    }
}
