//! Error kinds shared by every transform and entropy coder in this crate.
//!
//! Every fallible boundary described in the design (transform
//! construction, stream decoding, BWT reconstruction, ...) returns
//! `Result<_, KanziError>` rather than aborting the process. A failure
//! inside one stage of a [`crate::transform::TransformSequence`] or an
//! entropy coder aborts the whole block; callers see which stage failed
//! via `stage` and, where known, the byte `offset` at which the problem
//! was detected.

use thiserror::Error;

/// Errors produced by transforms, entropy coders, and the bit stream.
#[derive(Error, Debug)]
pub enum KanziError {
    /// A name, order, range, size, or transform id was malformed or out
    /// of range (e.g. more than 8 tokens in a transform spec, a reserved
    /// transform id, `logRange` outside `[8, 16]`).
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Human-readable description, generally including the offending
        /// value so the caller can report it verbatim.
        message: String,
    },

    /// A stream header or encoded body was malformed: a bad primary
    /// index, a decoded chunk length mismatch, an alphabet that doesn't
    /// sum to `2^lr`, and so on.
    #[error("invalid format at stage {stage:?}, offset {offset:?}: {message}")]
    InvalidFormat {
        /// Description of what was wrong.
        message: String,
        /// Index of the transform slot (0..8) that detected the problem,
        /// if the failure happened inside a [`crate::transform::TransformSequence`].
        stage: Option<usize>,
        /// Byte offset into the block at which the problem was detected,
        /// if known.
        offset: Option<usize>,
    },

    /// Bit stream read/write failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A large buffer (BWT work area, TPAQ match buffer / hash table)
    /// could not be allocated.
    #[error("resource exhausted: {message}")]
    ResourceExhausted {
        /// Description of the allocation that failed.
        message: String,
    },

    /// A transform id fell in the reserved range (11..15) or named a
    /// feature this crate does not implement.
    #[error("unsupported: {message}")]
    Unsupported {
        /// Description of the unsupported feature or id.
        message: String,
    },
}

impl KanziError {
    /// Build an [`KanziError::InvalidArgument`] from any displayable message.
    pub fn invalid_argument(message: impl Into<String>) -> KanziError {
        KanziError::InvalidArgument { message: message.into() }
    }

    /// Build an [`KanziError::InvalidFormat`] with no stage/offset attached.
    pub fn invalid_format(message: impl Into<String>) -> KanziError {
        KanziError::InvalidFormat { message: message.into(), stage: None, offset: None }
    }

    /// Attach a stage index to an [`KanziError::InvalidFormat`], used by
    /// [`crate::transform::TransformSequence`] when it aborts a block.
    pub fn with_stage(mut self, stage: usize) -> KanziError {
        if let KanziError::InvalidFormat { stage: s, .. } = &mut self {
            *s = Some(stage);
        }
        self
    }

    /// Attach a byte offset to an [`KanziError::InvalidFormat`].
    pub fn with_offset(mut self, offset: usize) -> KanziError {
        if let KanziError::InvalidFormat { offset: o, .. } = &mut self {
            *o = Some(offset);
        }
        self
    }

    /// Build a [`KanziError::ResourceExhausted`].
    pub fn resource_exhausted(message: impl Into<String>) -> KanziError {
        KanziError::ResourceExhausted { message: message.into() }
    }

    /// Build a [`KanziError::Unsupported`].
    pub fn unsupported(message: impl Into<String>) -> KanziError {
        KanziError::Unsupported { message: message.into() }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, KanziError>;
