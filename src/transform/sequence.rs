//! Composition of up to eight [`Transform`] stages into a single
//! reversible pipeline.

use crate::error::{KanziError, Result};
use crate::transform::Transform;

/// An ordered chain of transform stages. [`TransformSequence::forward`]
/// applies stages outermost-first (index 0 is the first-applied
/// transform, matching the type word's most-significant nibble);
/// [`TransformSequence::inverse`] undoes them in reverse order.
pub struct TransformSequence {
    stages: Vec<Box<dyn Transform>>,
}

impl TransformSequence {
    pub fn new(stages: Vec<Box<dyn Transform>>) -> TransformSequence {
        TransformSequence { stages }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every stage in forward order. On failure at stage `i`, wraps
    /// the error with the stage index and the byte offset into the
    /// buffer that stage was given, so callers can tell which transform
    /// in a multi-stage pipeline rejected the data.
    pub fn forward(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut buf = input.to_vec();
        for (i, stage) in self.stages.iter_mut().enumerate() {
            buf = stage
                .forward(&buf)
                .map_err(|e| annotate(e, i, buf.len()))?;
        }
        Ok(buf)
    }

    /// Run every stage in reverse order.
    pub fn inverse(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut buf = input.to_vec();
        for (i, stage) in self.stages.iter_mut().enumerate().rev() {
            buf = stage
                .inverse(&buf)
                .map_err(|e| annotate(e, i, buf.len()))?;
        }
        Ok(buf)
    }
}

fn annotate(err: KanziError, stage: usize, offset: usize) -> KanziError {
    match err {
        KanziError::InvalidFormat { message, .. } => {
            KanziError::invalid_format(message).with_stage(stage).with_offset(offset)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::mtft::MtfTransform;
    use crate::transform::null::NullTransform;
    use crate::transform::zrlt::ZrltTransform;

    #[test]
    fn empty_sequence_is_identity() {
        let mut seq = TransformSequence::new(vec![]);
        let data = b"hello world".to_vec();
        assert_eq!(seq.forward(&data).unwrap(), data);
        assert_eq!(seq.inverse(&data).unwrap(), data);
    }

    #[test]
    fn chains_mtft_then_zrlt_and_inverts_in_reverse() {
        let mut seq = TransformSequence::new(vec![
            Box::new(MtfTransform::new()),
            Box::new(ZrltTransform::new()),
        ]);
        let data = b"aaaaaabbbbbbccccccdddddd".to_vec();
        let fwd = seq.forward(&data).unwrap();
        assert_eq!(seq.inverse(&fwd).unwrap(), data);
    }

    #[test]
    fn single_null_stage_round_trips() {
        let mut seq = TransformSequence::new(vec![Box::new(NullTransform::default())]);
        let data = b"unchanged".to_vec();
        let fwd = seq.forward(&data).unwrap();
        assert_eq!(fwd, data);
        assert_eq!(seq.inverse(&fwd).unwrap(), data);
    }

    #[test]
    fn stage_failure_is_annotated_with_index_and_offset() {
        struct Failing;
        impl Transform for Failing {
            fn forward(&mut self, input: &[u8]) -> Result<Vec<u8>> {
                Err(KanziError::invalid_format("boom").with_offset(input.len()))
            }
            fn inverse(&mut self, _input: &[u8]) -> Result<Vec<u8>> {
                unreachable!()
            }
            fn name(&self) -> &'static str {
                "FAILING"
            }
        }
        let mut seq = TransformSequence::new(vec![
            Box::new(NullTransform::default()),
            Box::new(Failing),
        ]);
        let err = seq.forward(b"abc").unwrap_err();
        match err {
            KanziError::InvalidFormat { stage, .. } => assert_eq!(stage, Some(1)),
            other => panic!("expected InvalidFormat, got {other:?}"),
        }
    }
}
