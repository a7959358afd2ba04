//! Binary arithmetic decoder, the inverse of [`crate::encoder::Encoder`]:
//! same 64-bit bounds, driven by the same [`Predictor`] the encoder used
//! so both sides take identical splits for identical bits.

use crate::predictor::Predictor;

pub struct Decoder<P: Predictor> {
    high: u64,
    low: u64,
    predictor: P,
    x: u64,
    block: std::vec::IntoIter<u8>,
}

impl<P: Predictor> Decoder<P> {
    pub fn new(block_in: Vec<u8>, predictor: P) -> Decoder<P> {
        Decoder {
            high: u64::MAX,
            low: 0,
            x: 0,
            predictor,
            block: block_in.into_iter(),
        }
    }

    /// Load the first 8 bytes of compressed data into the sliding window.
    /// Must be called once before the first [`Decoder::decompress_bit`].
    pub fn init_x(&mut self) {
        for _ in 0..8 {
            self.x = (self.x << 8) | self.next_byte() as u64;
        }
    }

    fn decompress_bit(&mut self) -> i32 {
        let mut p = self.predictor.p() as u64;
        if p == 0 {
            p = 1;
        }

        let range = self.high - self.low;
        let mid = self.low + (range >> 12) * p + (((range & 0x0FFF) * p) >> 12);

        let bit = if self.x <= mid {
            self.high = mid;
            1
        } else {
            self.low = mid + 1;
            0
        };
        self.predictor.update(bit);

        while (self.high ^ self.low) & 0xFF00_0000_0000_0000 == 0 {
            self.high = (self.high << 8) | 0xFF;
            self.low <<= 8;
            self.x = (self.x << 8) | self.next_byte() as u64;
        }
        bit
    }

    pub fn decompress_block(&mut self, block_size: usize) -> Vec<u8> {
        let mut block = Vec::with_capacity(block_size);
        while block.len() < block.capacity() {
            let mut byte: i32 = 1;
            while byte < 256 {
                byte = (byte << 1) | self.decompress_bit();
            }
            block.push((byte - 256) as u8);
        }
        block
    }

    fn next_byte(&mut self) -> u8 {
        self.block.next().unwrap_or(0)
    }
}
