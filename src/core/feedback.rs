//! Guess evaluation.
//!
//! Computes per-letter feedback for a guess against a secret word using the
//! classic two-pass rule: exact-position matches claim letter supply first,
//! then remaining supply is handed out to misplaced letters left to right.
//!
//! A single pass mishandles duplicates: with secret `SPEED` and guess
//! `ERASE`, the secret's two E's must be shared between the guess's E's by
//! supply accounting, not by naive containment checks.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::word::Word;
use crate::WORD_LENGTH;

/// Per-position classification of a guessed letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LetterMark {
    /// Letter matches the secret at this position.
    Exact,
    /// Letter occurs elsewhere in the secret with supply remaining.
    Present,
    /// Letter has no remaining supply in the secret.
    Absent,
}

impl LetterMark {
    /// Compact wire code: `G` exact, `O` present, `Y` absent.
    pub const fn code(self) -> char {
        match self {
            Self::Exact => 'G',
            Self::Present => 'O',
            Self::Absent => 'Y',
        }
    }

    /// Parse a compact wire code character.
    pub const fn from_code(c: char) -> Option<Self> {
        match c {
            'G' => Some(Self::Exact),
            'O' => Some(Self::Present),
            'Y' => Some(Self::Absent),
            _ => None,
        }
    }
}

/// Ordered feedback for one guess, positionally aligned with its letters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Feedback([LetterMark; WORD_LENGTH]);

impl Feedback {
    /// Feedback with every position exact (a winning guess).
    pub const WIN: Self = Self([LetterMark::Exact; WORD_LENGTH]);

    /// The per-position marks.
    #[inline]
    pub const fn marks(&self) -> &[LetterMark; WORD_LENGTH] {
        &self.0
    }

    /// True when every position is exact.
    pub fn is_win(&self) -> bool {
        self.0.iter().all(|&m| m == LetterMark::Exact)
    }

    /// Compact 5-character code, one of `G`/`O`/`Y` per position.
    pub fn code(&self) -> String {
        self.0.iter().map(|m| m.code()).collect()
    }

    /// Parse a compact 5-character code.
    pub fn parse_code(code: &str) -> Option<Self> {
        let mut marks = [LetterMark::Absent; WORD_LENGTH];
        let mut chars = code.chars();
        for slot in &mut marks {
            *slot = LetterMark::from_code(chars.next()?)?;
        }
        if chars.next().is_some() {
            return None;
        }
        Some(Self(marks))
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code())
    }
}

impl fmt::Debug for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Feedback({})", self.code())
    }
}

impl TryFrom<String> for Feedback {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_code(&value).ok_or_else(|| format!("invalid feedback code: {value}"))
    }
}

impl From<Feedback> for String {
    fn from(feedback: Feedback) -> Self {
        feedback.code()
    }
}

/// Evaluate a guess against a secret.
///
/// Pure and deterministic; both inputs are already validated `Word`s, so no
/// failure mode exists.
///
/// Two passes over the positions:
/// 1. Exact matches are marked and decrement that letter's availability,
///    taken from the secret's occurrence counts.
/// 2. Remaining positions, left to right, are marked present while the
///    guessed letter still has availability; otherwise absent. Position
///    order is the tie-break for which duplicate occurrence wins present.
pub fn evaluate(secret: &Word, guess: &Word) -> Feedback {
    let mut marks = [LetterMark::Absent; WORD_LENGTH];
    let mut available = secret.letter_counts();

    // Pass 1: exact matches claim supply first
    for i in 0..WORD_LENGTH {
        if guess.letter_at(i) == secret.letter_at(i) {
            marks[i] = LetterMark::Exact;
            available[(guess.letter_at(i) - b'A') as usize] -= 1;
        }
    }

    // Pass 2: misplaced letters consume what is left, left to right
    for i in 0..WORD_LENGTH {
        if marks[i] == LetterMark::Exact {
            continue;
        }
        let slot = &mut available[(guess.letter_at(i) - b'A') as usize];
        if *slot > 0 {
            marks[i] = LetterMark::Present;
            *slot -= 1;
        }
    }

    Feedback(marks)
}

// =============================================================================
// TESTS
// =============================================================================
