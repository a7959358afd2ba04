//! Text dictionary codec.
//!
//! Replaces whole-word matches against a small built-in dictionary of
//! common English words with a single escape-plus-index pair, the way
//! a text-aware transform earns its keep ahead of an entropy coder: the
//! dictionary entries are exactly the strings a generic byte-level
//! model would otherwise spend the most bits re-learning. Reads the
//! `codec` context key only to decide whether the downstream entropy
//! coder already handles byte frequencies well
//! enough that dictionary substitution is worth it; the dictionary
//! itself is fixed rather than built from the block, so no side
//! channel is needed to ship it to the decoder.

use crate::error::{KanziError, Result};
use crate::transform::{Transform, TransformContext};

/// Literal-escape sentinel index: the escape byte appeared in the
/// input and must be passed through unchanged rather than treated as a
/// dictionary reference.
const LITERAL_ESCAPE: u8 = 0xFF;

const DICTIONARY: &[&str] = &[
    "the", "and", "that", "have", "for", "not", "with", "you", "this", "but",
    "his", "from", "they", "say", "her", "she", "will", "one", "all", "would",
    "there", "their", "what", "out", "about", "who", "get", "which", "when", "make",
    "can", "like", "time", "just", "him", "know", "take", "into", "your", "some",
    "could", "them", "other", "than", "then", "look", "only", "come", "over", "think",
    "also", "back", "after", "use", "two", "how", "our", "work", "first", "well",
    "way", "even", "new", "want", "because", "any", "these", "give", "day", "most",
];

fn dictionary_byte(index: usize) -> u8 {
    debug_assert!(index < LITERAL_ESCAPE as usize);
    index as u8
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphabetic()
}

fn least_frequent_byte(input: &[u8]) -> u8 {
    let mut counts = [0u64; 256];
    for &b in input {
        counts[b as usize] += 1;
    }
    counts
        .iter()
        .enumerate()
        .min_by_key(|&(_, &count)| count)
        .map(|(b, _)| b as u8)
        .unwrap_or(0)
}

pub struct TextTransform {
    /// Whether the downstream coder already models byte context well
    /// enough that word substitution is skipped; read from the `codec`
    /// context key at construction.
    enabled: bool,
}

impl TextTransform {
    pub fn new(ctx: &TransformContext) -> TextTransform {
        let enabled = !matches!(ctx.get_str("codec"), Some("tpaq") | Some("cm"));
        TextTransform { enabled }
    }
}

impl Default for TextTransform {
    fn default() -> TextTransform {
        TextTransform { enabled: true }
    }
}

impl Transform for TextTransform {
    fn forward(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let escape = least_frequent_byte(input);
        let mut out = Vec::with_capacity(input.len() + 1);
        out.push(escape);
        out.push(self.enabled as u8);
        if !self.enabled {
            out.extend_from_slice(input);
            return Ok(out);
        }

        let mut i = 0usize;
        while i < input.len() {
            let b = input[i];
            if b == escape {
                out.push(escape);
                out.push(LITERAL_ESCAPE);
                i += 1;
                continue;
            }
            if is_word_byte(b) {
                let start = i;
                while i < input.len() && is_word_byte(input[i]) && input[i] != escape {
                    i += 1;
                }
                let word = &input[start..i];
                let matched = DICTIONARY.iter().position(|&w| w.as_bytes() == word);
                match matched {
                    Some(idx) => {
                        out.push(escape);
                        out.push(dictionary_byte(idx));
                    }
                    None => out.extend_from_slice(word),
                }
                continue;
            }
            out.push(b);
            i += 1;
        }
        Ok(out)
    }

    fn inverse(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let escape = *input
            .first()
            .ok_or_else(|| KanziError::invalid_format("text: missing escape byte header"))?;
        let enabled = *input
            .get(1)
            .ok_or_else(|| KanziError::invalid_format("text: missing enabled flag"))?
            != 0;
        let body = &input[2..];
        if !enabled {
            return Ok(body.to_vec());
        }

        let mut out = Vec::with_capacity(body.len());
        let mut pos = 0usize;
        while pos < body.len() {
            let b = body[pos];
            if b == escape {
                let code = *body
                    .get(pos + 1)
                    .ok_or_else(|| KanziError::invalid_format("text: truncated escape sequence"))?;
                pos += 2;
                if code == LITERAL_ESCAPE {
                    out.push(escape);
                } else {
                    let word = *DICTIONARY
                        .get(code as usize)
                        .ok_or_else(|| KanziError::invalid_format("text: dictionary index out of range"))?;
                    out.extend_from_slice(word.as_bytes());
                }
            } else {
                out.push(b);
                pos += 1;
            }
        }
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "TEXT"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_prose_with_dictionary_words() {
        let data = b"the quick fox and the lazy dog, but they think this is fine".to_vec();
        let mut t = TextTransform::default();
        let fwd = t.forward(&data).unwrap();
        assert_eq!(t.inverse(&fwd).unwrap(), data);
    }

    #[test]
    fn shrinks_text_dense_in_dictionary_words() {
        let data = b"the and that have for not with you this but".to_vec();
        let mut t = TextTransform::default();
        let fwd = t.forward(&data).unwrap();
        assert!(fwd.len() < data.len());
        assert_eq!(t.inverse(&fwd).unwrap(), data);
    }

    #[test]
    fn round_trips_non_word_bytes_and_escape_collisions() {
        let data = vec![0u8, 1, 2, 3, b'x', b'y', b'z', 4, 5];
        let mut t = TextTransform::default();
        let fwd = t.forward(&data).unwrap();
        assert_eq!(t.inverse(&fwd).unwrap(), data);
    }

    #[test]
    fn round_trips_when_the_escape_byte_is_alphabetic_and_mid_word() {
        // Every byte 0..=255 appears 3 times except b'A', which appears
        // only twice (both inside the non-dictionary word "bA"), so
        // b'A' is unambiguously the least-frequent byte and thus the
        // escape. It lands mid-word rather than at a word boundary, so
        // the escape byte is never accidentally the first byte collected
        // into `word`.
        let mut data: Vec<u8> = Vec::new();
        for b in 0..=255u8 {
            if b != b'A' {
                data.extend(std::iter::repeat(b).take(3));
            }
        }
        data.extend_from_slice(b" bA bA");
        let mut t = TextTransform::default();
        let fwd = t.forward(&data).unwrap();
        assert_eq!(t.inverse(&fwd).unwrap(), data);
    }

    #[test]
    fn disabled_codec_passes_through_unchanged() {
        let mut ctx = TransformContext::new();
        ctx.set_str("codec", "tpaq");
        let data = b"the quick brown fox".to_vec();
        let mut t = TextTransform::new(&ctx);
        let fwd = t.forward(&data).unwrap();
        assert_eq!(t.inverse(&fwd).unwrap(), data);
    }
}
