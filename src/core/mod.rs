//! Core domain primitives.
//!
//! Everything in this module is pure and deterministic: word validation,
//! guess evaluation, and seeded randomness. No I/O, no clocks, no storage.

pub mod feedback;
pub mod rng;
pub mod word;
pub mod wordlist;

// Re-export core types
pub use feedback::{evaluate, Feedback, LetterMark};
pub use rng::DeterministicRng;
pub use word::{Word, WordError};
pub use wordlist::WordPool;
