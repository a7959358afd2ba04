//! Move-To-Front transform.
//!
//! Maintains a 256-entry list of byte values, initially in ascending
//! order. Each input byte is replaced by its current position (rank) in
//! the list, then moved to the front. Clusters repeated or locally
//! correlated bytes near rank 0, which downstream entropy coders exploit.

use crate::error::Result;
use crate::transform::Transform;

#[derive(Default)]
pub struct MtfTransform;

impl MtfTransform {
    pub fn new() -> MtfTransform {
        MtfTransform
    }
}

fn identity_table() -> [u8; 256] {
    let mut t = [0u8; 256];
    for (i, slot) in t.iter_mut().enumerate() {
        *slot = i as u8;
    }
    t
}

impl Transform for MtfTransform {
    fn forward(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut table = identity_table();
        let mut out = Vec::with_capacity(input.len());
        for &b in input {
            let rank = table.iter().position(|&x| x == b).unwrap();
            out.push(rank as u8);
            table.copy_within(0..rank, 1);
            table[0] = b;
        }
        Ok(out)
    }

    fn inverse(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut table = identity_table();
        let mut out = Vec::with_capacity(input.len());
        for &rank in input {
            let b = table[rank as usize];
            out.push(b);
            table.copy_within(0..rank as usize, 1);
            table[0] = b;
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "MTFT"
    }
}
