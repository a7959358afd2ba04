//! Order-1 adaptive rank transform (SBRT — "sorted by rank").
//!
//! Like [`crate::transform::mtft::MtfTransform`], but keeps 256
//! independent move-to-front lists, one per preceding byte (context),
//! instead of a single global list. Sequences with strong order-1
//! structure (e.g. already BWT-permuted text) rank lower under the
//! correct context than under a single shared list.

use crate::error::Result;
use crate::transform::Transform;

#[derive(Default)]
pub struct RankTransform;

impl RankTransform {
    pub fn new() -> RankTransform {
        RankTransform
    }
}

fn identity_tables() -> Vec<[u8; 256]> {
    let mut row = [0u8; 256];
    for (i, slot) in row.iter_mut().enumerate() {
        *slot = i as u8;
    }
    vec![row; 256]
}

impl Transform for RankTransform {
    fn forward(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut tables = identity_tables();
        let mut ctx = 0usize;
        let mut out = Vec::with_capacity(input.len());
        for &b in input {
            let table = &mut tables[ctx];
            let rank = table.iter().position(|&x| x == b).unwrap();
            out.push(rank as u8);
            table.copy_within(0..rank, 1);
            table[0] = b;
            ctx = b as usize;
        }
        Ok(out)
    }

    fn inverse(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut tables = identity_tables();
        let mut ctx = 0usize;
        let mut out = Vec::with_capacity(input.len());
        for &rank in input {
            let table = &mut tables[ctx];
            let b = table[rank as usize];
            out.push(b);
            table.copy_within(0..rank as usize, 1);
            table[0] = b;
            ctx = b as usize;
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "RANK"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_mississippi() {
        let data = b"mississippi".to_vec();
        let mut t = RankTransform::new();
        let fwd = t.forward(&data).unwrap();
        assert_eq!(t.inverse(&fwd).unwrap(), data);
    }

    #[test]
    fn round_trips_all_byte_values() {
        let data: Vec<u8> = (0..=255u8).collect();
        let mut t = RankTransform::new();
        let fwd = t.forward(&data).unwrap();
        assert_eq!(t.inverse(&fwd).unwrap(), data);
    }
}
