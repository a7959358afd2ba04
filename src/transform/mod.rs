//! The reversible byte-transform pipeline: the `Transform` trait every
//! stage implements, the [`TransformContext`] configuration dictionary
//! consumed at construction time, [`TransformSequence`] (composition of
//! up to 8 stages), and [`TransformFactory`] (name parsing, packing,
//! and instantiation).
//!
//! Generalizes a single hard-coded compression pipeline into a set of
//! small, independently testable stages behind one trait, the way a
//! reversible-transform library naturally wants to be shaped.

pub mod bwt;
pub mod factory;
pub mod lz4;
pub mod lz_common;
pub mod mtft;
pub mod null;
pub mod rank;
pub mod rlt;
pub mod sequence;
pub mod snappy;
pub mod text;
pub mod varint_bytes;
pub mod x86;
pub mod zrlt;

use std::collections::HashMap;

use crate::error::Result;

pub use factory::TransformFactory;
pub use sequence::TransformSequence;

/// One reversible byte-to-byte stage in the pipeline. Implementations own
/// whatever per-instance state they need (e.g. a text codec's emitted
/// dictionary); a fresh instance is produced by [`TransformFactory`] for
/// every call, so a `Transform` never needs to reset itself between uses.
pub trait Transform: Send {
    /// Apply the transform, producing a new buffer. The returned buffer
    /// must carry any header bytes (e.g. a BWT primary index) the
    /// transform's own [`Transform::inverse`] needs to reconstruct the
    /// input exactly.
    fn forward(&mut self, input: &[u8]) -> Result<Vec<u8>>;

    /// Invert [`Transform::forward`] exactly.
    fn inverse(&mut self, input: &[u8]) -> Result<Vec<u8>>;

    /// Short uppercase name, as used in a transform spec string and by
    /// [`TransformFactory::format_name`].
    fn name(&self) -> &'static str;
}

/// The context dictionary consumed at transform construction.
/// Case-sensitive string keys; unknown keys are ignored, and a
/// transform that requires a key absent from the dictionary fails
/// construction with [`crate::error::KanziError::InvalidArgument`].
#[derive(Clone, Debug, Default)]
pub struct TransformContext {
    ints: HashMap<String, i64>,
    strings: HashMap<String, String>,
}

impl TransformContext {
    /// An empty context.
    pub fn new() -> TransformContext {
        TransformContext::default()
    }

    /// Set an integer-valued key (e.g. `blockSize`, `bsVersion`, `jobs`).
    pub fn set_int(&mut self, key: impl Into<String>, value: i64) -> &mut Self {
        self.ints.insert(key.into(), value);
        self
    }

    /// Set a string-valued key (e.g. `codec`).
    pub fn set_str(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.strings.insert(key.into(), value.into());
        self
    }

    /// Look up an integer-valued key.
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.ints.get(key).copied()
    }

    /// Look up a string-valued key.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.strings.get(key).map(|s| s.as_str())
    }

    /// `blockSize` required by the text codec and BWT chunk-count selection.
    pub fn block_size(&self) -> Option<usize> {
        self.get_int("blockSize").map(|v| v as usize)
    }

    /// `jobs` worker-thread count for the BWT parallel inverse. Defaults
    /// to 1 (serial) when absent.
    pub fn jobs(&self) -> usize {
        self.get_int("jobs").map(|v| v.max(1) as usize).unwrap_or(1)
    }
}

/// Packed 4-bit transform identifiers. `None` (0) is the identity
/// placeholder; `11..=15` are reserved and rejected on decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransformId {
    /// Identity: no-op placeholder nibble.
    None = 0,
    /// Burrows-Wheeler Transform.
    Bwt = 1,
    /// Bijective Burrows-Wheeler Transform (no primary index).
    Bwts = 2,
    /// LZ4-style literal/match block codec.
    Lz4 = 3,
    /// Snappy-style literal/match block codec.
    Snappy = 4,
    /// General byte run-length transform.
    Rlt = 5,
    /// Zero run-length transform.
    Zrlt = 6,
    /// Move-to-front transform.
    Mtft = 7,
    /// Order-1 adaptive rank transform (SBRT).
    Rank = 8,
    /// x86 CALL/JMP address filter.
    X86 = 9,
    /// Text dictionary codec.
    Text = 10,
}

impl TransformId {
    /// Map a 4-bit nibble to a `TransformId`. Nibbles `11..=15` are
    /// reserved and return `None` (the caller treats that as a decode
    /// error, see [`TransformFactory`]).
    pub fn from_nibble(nibble: u32) -> Option<TransformId> {
        Some(match nibble {
            0 => TransformId::None,
            1 => TransformId::Bwt,
            2 => TransformId::Bwts,
            3 => TransformId::Lz4,
            4 => TransformId::Snappy,
            5 => TransformId::Rlt,
            6 => TransformId::Zrlt,
            7 => TransformId::Mtft,
            8 => TransformId::Rank,
            9 => TransformId::X86,
            10 => TransformId::Text,
            _ => return Option::None,
        })
    }

    /// Case-insensitive token name.
    pub fn name(self) -> &'static str {
        match self {
            TransformId::None => "NONE",
            TransformId::Bwt => "BWT",
            TransformId::Bwts => "BWTS",
            TransformId::Lz4 => "LZ4",
            TransformId::Snappy => "SNAPPY",
            TransformId::Rlt => "RLT",
            TransformId::Zrlt => "ZRLT",
            TransformId::Mtft => "MTFT",
            TransformId::Rank => "RANK",
            TransformId::X86 => "X86",
            TransformId::Text => "TEXT",
        }
    }

    /// Case-insensitive token lookup.
    pub fn from_name(name: &str) -> Option<TransformId> {
        Some(match name.to_ascii_uppercase().as_str() {
            "NONE" => TransformId::None,
            "BWT" => TransformId::Bwt,
            "BWTS" => TransformId::Bwts,
            "LZ4" => TransformId::Lz4,
            "SNAPPY" => TransformId::Snappy,
            "RLT" => TransformId::Rlt,
            "ZRLT" => TransformId::Zrlt,
            "MTFT" => TransformId::Mtft,
            "RANK" => TransformId::Rank,
            "X86" => TransformId::X86,
            "TEXT" => TransformId::Text,
            _ => return Option::None,
        })
    }
}
