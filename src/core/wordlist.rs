//! Secret word pool.
//!
//! A fixed, deduplicated set of 5-letter words that secrets are drawn from.
//! The pool never changes during a server's lifetime; there is no dictionary
//! check on guesses, only on secrets.

use crate::core::rng::DeterministicRng;
use crate::core::word::{Word, WordError};

/// Default secret pool shipped with the server.
const DEFAULT_WORDS: &[&str] = &[
    "CRANE", "SLOTH", "TRACE", "SNOUT", "STARE", "SLEPT", "SPLIT", "TRASH",
    "PLANT", "FLASK", "STORM", "CLOUD", "RIVER", "OCEAN", "MOUNT", "PEAKS",
    "FLAME", "SPARK", "BLADE", "SWORD",
];

/// An immutable pool of candidate secret words.
#[derive(Debug, Clone)]
pub struct WordPool {
    words: Vec<Word>,
}

impl Default for WordPool {
    fn default() -> Self {
        Self::new(DEFAULT_WORDS).expect("default word list is valid")
    }
}

impl WordPool {
    /// Build a pool from raw strings, validating and deduplicating.
    ///
    /// Duplicates (after normalization) are dropped; order of first
    /// occurrence is kept so draws stay reproducible for a given seed.
    pub fn new<S: AsRef<str>>(entries: &[S]) -> Result<Self, WordError> {
        let mut words = Vec::with_capacity(entries.len());
        for entry in entries {
            let word = Word::parse(entry.as_ref())?;
            if !words.contains(&word) {
                words.push(word);
            }
        }
        Ok(Self { words })
    }

    /// Number of distinct words in the pool.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// True when the pool holds no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Whether a word is in the pool.
    pub fn contains(&self, word: &Word) -> bool {
        self.words.contains(word)
    }

    /// Draw one word uniformly at random.
    ///
    /// Returns `None` only for an empty pool.
    pub fn draw(&self, rng: &mut DeterministicRng) -> Option<Word> {
        rng.choose(&self.words).copied()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pool() {
        let pool = WordPool::default();
        assert_eq!(pool.len(), 20);
        assert!(pool.contains(&Word::parse("CRANE").unwrap()));
        assert!(!pool.contains(&Word::parse("QUERY").unwrap()));
    }

    #[test]
    fn test_deduplication() {
        let pool = WordPool::new(&["CRANE", "crane", " CRANE ", "SLATE"]).unwrap();
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_invalid_entry_rejected() {
        assert!(WordPool::new(&["CRANE", "BAD"]).is_err());
        assert!(WordPool::new(&["CR4NE"]).is_err());
    }

    #[test]
    fn test_draw_from_pool() {
        let pool = WordPool::default();
        let mut rng = DeterministicRng::new(42);

        for _ in 0..100 {
            let word = pool.draw(&mut rng).unwrap();
            assert!(pool.contains(&word));
        }
    }

    #[test]
    fn test_draw_deterministic_for_seed() {
        let pool = WordPool::default();

        let a = pool.draw(&mut DeterministicRng::new(7)).unwrap();
        let b = pool.draw(&mut DeterministicRng::new(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_draw_empty_pool() {
        let pool = WordPool::new::<&str>(&[]).unwrap();
        let mut rng = DeterministicRng::new(1);
        assert!(pool.draw(&mut rng).is_none());
    }

    #[test]
    fn test_draw_reaches_whole_pool() {
        let pool = WordPool::new(&["CRANE", "SLATE", "STORM"]).unwrap();
        let mut rng = DeterministicRng::new(3);
        let mut seen = std::collections::BTreeSet::new();

        for _ in 0..200 {
            seen.insert(pool.draw(&mut rng).unwrap());
        }

        assert_eq!(seen.len(), pool.len());
    }
}
