//! Per-module round trips exercised the way the teacher's own
//! `tests/integration.rs` exercises its archiver end to end: one test
//! per component, fed realistic-sized inputs. Cross-module composition
//! (transform pipeline feeding an entropy coder, and so on) lives in
//! `tests/roundtrip.rs`.

use kanzi_core::ans::{self, Order};
use kanzi_core::bitstream::{BitStreamReader, BitStreamWriter};
use kanzi_core::expgolomb;
use kanzi_core::huffman::HuffmanTable;
use kanzi_core::range_coder::{RangeDecoder, RangeEncoder, StaticModel};
use kanzi_core::rice_golomb;
use kanzi_core::transform::bwt::BwtTransform;
use kanzi_core::transform::{Transform, TransformContext};
use kanzi_core::{Decoder, Encoder, FpaqPredictor, Predictor, TpaqPredictor};

fn sample_text() -> Vec<u8> {
    b"the quick brown fox jumps over the lazy dog. \
      the lazy dog barks at the quick brown fox."
        .repeat(6)
}

fn xorshift_bytes(n: usize) -> Vec<u8> {
    let mut x: u32 = 0x9E3779B9;
    (0..n)
        .map(|_| {
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            (x & 0xFF) as u8
        })
        .collect()
}

#[test]
fn bwt_round_trips_through_serial_and_parallel_inverse() {
    let data = sample_text();

    let mut serial_ctx = TransformContext::new();
    serial_ctx.set_int("jobs", 1);
    let mut serial = BwtTransform::new(&serial_ctx);
    let forward = serial.forward(&data).unwrap();
    let restored = serial.inverse(&forward).unwrap();
    assert_eq!(restored, data);

    let mut parallel_ctx = TransformContext::new();
    parallel_ctx.set_int("jobs", 4);
    let mut parallel = BwtTransform::new(&parallel_ctx);
    let forward2 = parallel.forward(&data).unwrap();
    let restored2 = parallel.inverse(&forward2).unwrap();
    assert_eq!(restored2, data);
}

#[test]
fn ans_order0_and_order1_round_trip_a_chunked_block() {
    let data = sample_text();

    let order0 = ans::encode(&data, Order::Zero, 64, 12).unwrap();
    assert_eq!(ans::decode(&order0).unwrap(), data);

    let order1 = ans::encode(&data, Order::One, 0, 14).unwrap();
    assert_eq!(ans::decode(&order1).unwrap(), data);
}

fn small_tpaq() -> TpaqPredictor {
    TpaqPredictor::with_sizes(18, kanzi_core::match_model::MatchModel::with_sizes(16, 14))
}

#[test]
fn tpaq_predictor_compresses_repetitive_text_below_its_raw_size() {
    let data = sample_text();

    let mut enc = Encoder::new(small_tpaq(), data.len());
    let compressed = enc.compress_block(&data);
    assert!(compressed.len() < data.len(), "expected compression on repetitive text");

    let mut dec = Decoder::new(compressed, small_tpaq());
    dec.init_x();
    let decompressed = dec.decompress_block(data.len());
    assert_eq!(decompressed, data);
}

#[test]
fn binary_coder_round_trips_incompressible_random_data() {
    let data = xorshift_bytes(2048);

    let mut enc = Encoder::new(FpaqPredictor::new(), data.len());
    let compressed = enc.compress_block(&data);

    let mut dec = Decoder::new(compressed, FpaqPredictor::new());
    dec.init_x();
    let decompressed = dec.decompress_block(data.len());
    assert_eq!(decompressed, data);
}

#[test]
fn tpaq_predictor_probabilities_stay_in_bounds_over_random_data() {
    let data = xorshift_bytes(512);
    let mut pred = small_tpaq();
    for &byte in &data {
        for i in (0..8).rev() {
            let bit = ((byte >> i) & 1) as i32;
            let p = pred.p();
            assert!((0..4096).contains(&p));
            pred.update(bit);
        }
    }
}

#[test]
fn expgolomb_round_trips_every_byte_value_through_a_shared_stream() {
    let mut buf = Vec::new();
    {
        let mut w = BitStreamWriter::new(&mut buf);
        for v in 0..=255u8 {
            expgolomb::write_unsigned(&mut w, v).unwrap();
        }
        w.close().unwrap();
    }
    let mut r = BitStreamReader::new(&buf[..]);
    for v in 0..=255u8 {
        assert_eq!(expgolomb::read_unsigned(&mut r).unwrap(), v);
    }
}

#[test]
fn rice_golomb_round_trips_a_run_of_small_values() {
    let mut buf = Vec::new();
    let values: Vec<u64> = (0..128).map(|v| v % 17).collect();
    {
        let mut w = BitStreamWriter::new(&mut buf);
        for &v in &values {
            rice_golomb::write(&mut w, v, 3).unwrap();
        }
        w.close().unwrap();
    }
    let mut r = BitStreamReader::new(&buf[..]);
    for &v in &values {
        assert_eq!(rice_golomb::read(&mut r, 3).unwrap(), v);
    }
}

#[test]
fn range_coder_round_trips_text_under_its_own_histogram() {
    let data = sample_text();
    let mut freqs = [1u32; 256];
    for &b in &data {
        freqs[b as usize] += 1;
    }
    let total: u32 = freqs.iter().sum();
    let scale = (1u32 << 16) - 512;
    let mut scaled = [0u32; 256];
    for s in 0..256 {
        scaled[s] = ((freqs[s] as u64 * scale as u64) / total as u64).max(1) as u32;
    }
    let model = StaticModel::new(&scaled);

    let mut enc = RangeEncoder::new();
    enc.encode_block(&data, &model);
    let bytes = enc.finish();

    let mut dec = RangeDecoder::new(&bytes);
    let decoded = dec.decode_block(data.len(), &model);
    assert_eq!(decoded, data);
}

#[test]
fn huffman_round_trips_text_via_its_own_built_table() {
    let data = sample_text();
    let mut freqs = [0u32; 256];
    for &b in &data {
        freqs[b as usize] += 1;
    }
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
