//! Transform name grammar, type-word packing, and instantiation.

use crate::error::{KanziError, Result};
use crate::transform::bwt::{BwtTransform, BwtsTransform};
use crate::transform::lz4::Lz4Transform;
use crate::transform::mtft::MtfTransform;
use crate::transform::null::NullTransform;
use crate::transform::rank::RankTransform;
use crate::transform::rlt::RltTransform;
use crate::transform::sequence::TransformSequence;
use crate::transform::snappy::SnappyTransform;
use crate::transform::text::TextTransform;
use crate::transform::x86::X86Transform;
use crate::transform::zrlt::ZrltTransform;
use crate::transform::{Transform, TransformContext, TransformId};

const MAX_TOKENS: usize = 8;

/// Parses a `+`-separated transform spec string and instantiates it,
/// or packs/unpacks the resulting 32-bit type word directly.
pub struct TransformFactory;

impl TransformFactory {
    /// Parse a name grammar string into a type word: one or more
    /// `+`-separated case-insensitive tokens, at most [`MAX_TOKENS`],
    /// matched against [`TransformId::from_name`].
    ///
    /// Standalone `NONE` tokens are dropped before packing rather than
    /// occupying a nibble slot, so `"NONE+BWT"` and `"BWT"` both pack to
    /// the same type word.
    pub fn parse_name(spec: &str) -> Result<u32> {
        let tokens: Vec<&str> = spec.split('+').collect();
        if tokens.is_empty() || tokens.len() > MAX_TOKENS {
            return Err(KanziError::invalid_argument(format!(
                "transform spec {spec:?} has {} tokens, must have 1..={MAX_TOKENS}",
                tokens.len()
            )));
        }
        let mut ids = Vec::with_capacity(tokens.len());
        for tok in &tokens {
            let id = TransformId::from_name(tok).ok_or_else(|| {
                KanziError::invalid_argument(format!("unknown transform name {tok:?}"))
            })?;
            if id != TransformId::None {
                ids.push(id);
            }
        }
        let mut word: u32 = 0;
        for (i, id) in ids.iter().enumerate() {
            let shift = 4 * (MAX_TOKENS - 1 - i);
            word |= (*id as u32) << shift;
        }
        Ok(word)
    }

    /// Render a type word back into its `+`-separated name, folding a
    /// fully-zero word to `"NONE"` and skipping zero nibbles elsewhere.
    /// Logs a warning if a zero nibble is found between two non-zero
    /// nibbles, since that gap is silently skipped rather than
    /// rejected (the type word format has no way to represent an
    /// explicit no-op stage except as the sole nibble).
    pub fn format_name(word: u32) -> Result<String> {
        let mut names = Vec::new();
        let mut seen_nonzero = false;
        let mut saw_gap = false;
        for i in 0..MAX_TOKENS {
            let shift = 4 * (MAX_TOKENS - 1 - i);
            let nibble = (word >> shift) & 0xF;
            let id = TransformId::from_nibble(nibble).ok_or_else(|| {
                KanziError::unsupported(format!("reserved transform id {nibble} in type word"))
            })?;
            if id == TransformId::None {
                if seen_nonzero {
                    saw_gap = true;
                }
                continue;
            }
            seen_nonzero = true;
            names.push(id.name());
        }
        if names.is_empty() {
            return Ok(TransformId::None.name().to_string());
        }
        if saw_gap {
            log::warn!("transform type word {word:#010x} has a NONE nibble between active stages; folding it out");
        }
        Ok(names.join("+"))
    }

    /// Instantiate a [`TransformSequence`] from a type word and a
    /// context dictionary. A fully-zero word yields a single null
    /// transform; otherwise nibbles equal to [`TransformId::None`] are
    /// skipped rather than instantiated.
    pub fn new_sequence(word: u32, ctx: &TransformContext) -> Result<TransformSequence> {
        let mut stages: Vec<Box<dyn Transform>> = Vec::new();
        for i in 0..MAX_TOKENS {
            let shift = 4 * (MAX_TOKENS - 1 - i);
            let nibble = (word >> shift) & 0xF;
            let id = TransformId::from_nibble(nibble).ok_or_else(|| {
                KanziError::unsupported(format!("reserved transform id {nibble} in type word"))
            })?;
            if id == TransformId::None {
                continue;
            }
            stages.push(instantiate(id, ctx)?);
        }
        if stages.is_empty() {
            stages.push(Box::new(NullTransform::default()));
        }
        Ok(TransformSequence::new(stages))
    }
}

fn instantiate(id: TransformId, ctx: &TransformContext) -> Result<Box<dyn Transform>> {
    Ok(match id {
        TransformId::None => Box::new(NullTransform::default()),
        TransformId::Bwt => Box::new(BwtTransform::new(ctx)),
        TransformId::Bwts => Box::new(BwtsTransform::new()),
        TransformId::Lz4 => Box::new(Lz4Transform::new()),
        TransformId::Snappy => Box::new(SnappyTransform::new()),
        TransformId::Rlt => Box::new(RltTransform::new()),
        TransformId::Zrlt => Box::new(ZrltTransform::new()),
        TransformId::Mtft => Box::new(MtfTransform::new()),
        TransformId::Rank => Box::new(RankTransform::new()),
        TransformId::X86 => Box::new(X86Transform::new()),
        TransformId::Text => Box::new(TextTransform::new(ctx)),
    })
}
