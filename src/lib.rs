//! # Daily Word Game Server
//!
//! Backend for a daily word-guessing game: accounts, game sessions with a
//! five-guess budget, duplicate-letter-aware feedback, and daily reporting.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    DAILY WORD SERVER                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Pure domain primitives                    │
//! │  ├── word.rs     - Validated 5-letter Word type              │
//! │  ├── feedback.rs - Guess evaluation (two-pass algorithm)     │
//! │  ├── rng.rs      - Xorshift128+ PRNG and seed derivation     │
//! │  └── wordlist.rs - Secret word pool                          │
//! │                                                              │
//! │  game/           - Game logic and persistence seam           │
//! │  ├── user.rs     - Accounts and registration rules           │
//! │  ├── session.rs  - Session state machine (guess budget)      │
//! │  ├── store.rs    - Store capability + in-memory impl         │
//! │  ├── report.rs   - Daily / per-user report rows              │
//! │  └── service.rs  - Orchestration over the store              │
//! │                                                              │
//! │  network/        - Networking (non-deterministic)            │
//! │  ├── server.rs   - WebSocket server                          │
//! │  ├── protocol.rs - Message types                             │
//! │  └── auth.rs     - Credential hashing and JWT tokens         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Evaluation Guarantee
//!
//! The `core/` module is pure and deterministic:
//! - Feedback evaluation is a side-effect-free function over two words
//! - Exact matches always claim letter supply before misplaced matches
//! - Per letter, exact + present marks never exceed the secret's supply
//!
//! Session mutation happens under a per-session write lock, so a guess is
//! read, evaluated, recorded, and transitioned as one atomic unit.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod network;

// Re-export commonly used types
pub use crate::core::feedback::{evaluate, Feedback, LetterMark};
pub use crate::core::word::{Word, WordError};
pub use crate::core::wordlist::WordPool;
pub use crate::game::service::{GameError, GameService};
pub use crate::game::session::{GameSession, SessionId, SessionStatus};
pub use crate::game::user::UserId;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Length of every secret and guess word.
pub const WORD_LENGTH: usize = 5;

/// Guesses allowed per session.
pub const MAX_GUESSES: u8 = 5;

/// Sessions a user may start per UTC calendar day.
pub const DAILY_GAME_LIMIT: u32 = 3;
