//! Identity transform. Occupies the single slot a [`crate::transform::TransformSequence`]
//! falls back to when every nibble of a type word is zero.

use crate::error::Result;
use crate::transform::Transform;

/// The identity transform: `forward` and `inverse` both copy the input
/// unchanged.
#[derive(Default)]
pub struct NullTransform;

impl NullTransform {
    /// Construct a null transform.
    pub fn new() -> NullTransform {
        NullTransform
    }
}

impl Transform for NullTransform {
    fn forward(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        Ok(input.to_vec())
    }

    fn inverse(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        Ok(input.to_vec())
    }

    fn name(&self) -> &'static str {
        "NONE"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_any_block_unchanged() {
        let mut t = NullTransform::new();
        let data = b"a 1 KiB block would work identically".to_vec();
        let fwd = t.forward(&data).unwrap();
        assert_eq!(fwd, data);
        let inv = t.inverse(&fwd).unwrap();
        assert_eq!(inv, data);
    }
}
