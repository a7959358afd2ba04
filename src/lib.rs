//! A reversible byte-transform pipeline and entropy-coding toolkit:
//! BWT (and its bijective variant) with a parallel inverse, a family of
//! simpler reversible transforms (MTF, RLE, rank, x86 call filtering, a
//! text dictionary codec, LZ4/Snappy-style match codecs), a chunked
//! order-0/order-1 rANS entropy codec, a context-mixing bitwise
//! predictor (TPAQ) driving a 64-bit binary arithmetic coder, and the
//! Exp-Golomb/Rice-Golomb/range/Huffman codes the rest of the stack
//! leans on for small or static-statistics data.
//!
//! Grown out of a context-mixing file archiver: the bitwise predictor,
//! mixer, APM, state maps, match model, and binary arithmetic coder
//! here are a direct generalization of that archiver's compression
//! core. The archiver's CLI, file framing, and solid-archive container
//! are outside this crate's scope — see `DESIGN.md` for what was kept,
//! what was generalized, and what was dropped.

pub mod ans;
pub mod apm;
pub mod bitstream;
pub mod context_model;
pub mod decoder;
pub mod encoder;
pub mod entropy_utils;
pub mod error;
pub mod expgolomb;
pub mod hash_table;
pub mod histogram;
pub mod huffman;
pub mod logistic;
pub mod match_model;
pub mod mixer;
pub mod predictor;
pub mod range_coder;
pub mod rice_golomb;
pub mod statemap;
pub mod transform;

pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{KanziError, Result};
pub use predictor::{CmPredictor, FpaqPredictor, Predictor, TpaqPredictor};
pub use transform::{Transform, TransformContext, TransformFactory, TransformId, TransformSequence};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_then_entropy_code_round_trips() {
        let data = b"the quick brown fox jumps over the lazy dog".repeat(8);

        let word = TransformFactory::parse_name("BWT+MTFT+ZRLT").unwrap();
        let ctx = TransformContext::new();
        let mut seq = TransformFactory::new_sequence(word, &ctx).unwrap();
        let transformed = seq.forward(&data).unwrap();

        let mut enc = Encoder::new(FpaqPredictor::new(), transformed.len());
        let compressed = enc.compress_block(&transformed);

        let mut dec = Decoder::new(compressed, FpaqPredictor::new());
        dec.init_x();
        let decompressed = dec.decompress_block(transformed.len());
        assert_eq!(decompressed, transformed);

        let mut seq2 = TransformFactory::new_sequence(word, &ctx).unwrap();
        let restored = seq2.inverse(&decompressed).unwrap();
        assert_eq!(restored, data);
    }
}
