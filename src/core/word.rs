//! Validated 5-letter word type.
//!
//! Secrets and guesses are always exactly five ASCII uppercase letters.
//! Validation happens here, at the boundary, so the evaluator never sees
//! malformed input.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::WORD_LENGTH;

/// A 5-letter uppercase word.
///
/// Stored as raw ASCII bytes. Construction normalizes (trims whitespace,
/// uppercases) and validates, so every `Word` in the system is well-formed.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Word([u8; WORD_LENGTH]);

/// Word validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WordError {
    /// Input was not exactly 5 characters after trimming.
    #[error("word must be exactly 5 letters, got {0}")]
    InvalidLength(usize),

    /// Input contained a character outside A-Z / a-z.
    #[error("word must contain only letters A-Z")]
    InvalidCharacter,
}

impl Word {
    /// Parse and normalize a word.
    ///
    /// Trims surrounding whitespace and uppercases before validating.
    pub fn parse(text: &str) -> Result<Self, WordError> {
        let trimmed = text.trim();

        if trimmed.len() != WORD_LENGTH {
            return Err(WordError::InvalidLength(trimmed.chars().count()));
        }

        let mut letters = [0u8; WORD_LENGTH];
        for (i, byte) in trimmed.bytes().enumerate() {
            if !byte.is_ascii_alphabetic() {
                return Err(WordError::InvalidCharacter);
            }
            letters[i] = byte.to_ascii_uppercase();
        }

        Ok(Self(letters))
    }

    /// The raw uppercase ASCII letters.
    #[inline]
    pub const fn letters(&self) -> &[u8; WORD_LENGTH] {
        &self.0
    }

    /// Letter at a position (0-4).
    #[inline]
    pub const fn letter_at(&self, position: usize) -> u8 {
        self.0[position]
    }

    /// Occurrence count per letter, indexed `A = 0 .. Z = 25`.
    ///
    /// Feeds the evaluator's availability accounting for duplicate letters.
    pub fn letter_counts(&self) -> [u8; 26] {
        let mut counts = [0u8; 26];
        for &byte in &self.0 {
            counts[(byte - b'A') as usize] += 1;
        }
        counts
    }

    /// The word as a string slice.
    pub fn as_str(&self) -> &str {
        // Invariant: all bytes are ASCII uppercase letters.
        std::str::from_utf8(&self.0).expect("word bytes are ASCII")
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Word({})", self.as_str())
    }
}

impl std::str::FromStr for Word {
    type Err = WordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Word {
    type Error = WordError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Word> for String {
    fn from(word: Word) -> Self {
        word.as_str().to_string()
    }
}

// =============================================================================
// TESTS
// =============================================================================
