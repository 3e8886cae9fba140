//! Game session state machine.
//!
//! A session holds one secret word and accepts up to five guesses. Each
//! accepted guess is evaluated, recorded, and may finish the session:
//! `Open` -> `Won` on an all-exact guess, `Open` -> `Exhausted` on the fifth
//! miss. Terminal states accept nothing further.
//!
//! The state machine is pure: callers own locking and persistence.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::feedback::{evaluate, Feedback};
use crate::core::word::Word;
use crate::game::user::UserId;
use crate::MAX_GUESSES;

// =============================================================================
// SESSION ID
// =============================================================================

/// Unique session identifier (UUID as bytes).
///
/// Implements Ord for deterministic BTreeMap ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct SessionId(pub [u8; 16]);

impl SessionId {
    /// Create from raw bytes.
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().into_bytes())
    }

    /// Create from UUID string.
    pub fn from_uuid_str(s: &str) -> Option<Self> {
        uuid::Uuid::parse_str(s).ok().map(|u| Self(*u.as_bytes()))
    }

    /// Convert to UUID string.
    pub fn to_uuid_string(&self) -> String {
        uuid::Uuid::from_bytes(self.0).to_string()
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

// =============================================================================
// STATE
// =============================================================================

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Accepting guesses.
    Open,
    /// A guess matched the secret exactly. Terminal.
    Won,
    /// Five guesses submitted, none exact. Terminal.
    Exhausted,
}

impl SessionStatus {
    /// Whether the session accepts no further guesses.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Exhausted)
    }
}

/// One accepted guess: word, feedback and 1-based ordinal.
///
/// Records are append-only; they are never mutated or removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuessRecord {
    /// The guessed word.
    pub word: Word,
    /// Per-letter feedback for the guess.
    pub feedback: Feedback,
    /// Position in the session, starting at 1.
    pub ordinal: u8,
}

/// Result of an accepted guess submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessResult {
    /// Per-letter feedback.
    pub feedback: Feedback,
    /// Whether the guess matched the secret exactly.
    pub is_correct: bool,
    /// Guesses still available after this one.
    pub remaining_guesses: u8,
    /// Whether the session is now terminal.
    pub completed: bool,
    /// 1-based ordinal of the recorded guess.
    pub ordinal: u8,
}

/// Session errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Guess submitted after the session reached Won or Exhausted.
    #[error("session already completed")]
    AlreadyTerminal,

    /// Guess count is at the limit while the session is still open.
    /// Unreachable if the state machine is correct; kept as a guard.
    #[error("guess limit exceeded")]
    GuessLimitExceeded,
}

/// A single game: one user, one secret, up to five guesses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    /// Session identifier.
    pub id: SessionId,
    /// Owning user.
    pub user_id: UserId,
    /// The secret word. Never serialized out to clients.
    secret: Word,
    /// UTC calendar day the session was started (daily-cap bucket).
    pub game_date: NaiveDate,
    /// Lifecycle state.
    status: SessionStatus,
    /// Accepted guesses, in submission order.
    guesses: Vec<GuessRecord>,
}

impl GameSession {
    /// Create an open session with a freshly drawn secret.
    pub fn new(id: SessionId, user_id: UserId, secret: Word, game_date: NaiveDate) -> Self {
        Self {
            id,
            user_id,
            secret,
            game_date,
            status: SessionStatus::Open,
            guesses: Vec::with_capacity(MAX_GUESSES as usize),
        }
    }

    /// Current lifecycle state.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Accepted guesses so far.
    pub fn guesses(&self) -> &[GuessRecord] {
        &self.guesses
    }

    /// Number of guesses still available.
    pub fn remaining_guesses(&self) -> u8 {
        MAX_GUESSES - self.guesses.len() as u8
    }

    /// Whether the session was won.
    pub fn is_won(&self) -> bool {
        self.status == SessionStatus::Won
    }

    /// The secret word. Only for store-internal use and tests; the service
    /// never forwards it to clients.
    pub(crate) fn secret(&self) -> &Word {
        &self.secret
    }

    /// Submit a guess.
    ///
    /// On acceptance: evaluates the guess, appends a record, and applies at
    /// most one transition (`Won` on all-exact, `Exhausted` on the fifth
    /// miss). Rejections leave the session untouched and record nothing.
    pub fn submit_guess(&mut self, guess: Word) -> Result<GuessResult, SessionError> {
        if self.status.is_terminal() {
            return Err(SessionError::AlreadyTerminal);
        }
        if self.guesses.len() >= MAX_GUESSES as usize {
            return Err(SessionError::GuessLimitExceeded);
        }

        let feedback = evaluate(&self.secret, &guess);
        let is_correct = feedback.is_win();
        let ordinal = self.guesses.len() as u8 + 1;

        self.guesses.push(GuessRecord {
            word: guess,
            feedback,
            ordinal,
        });

        if is_correct {
            self.status = SessionStatus::Won;
        } else if ordinal == MAX_GUESSES {
            self.status = SessionStatus::Exhausted;
        }

        let remaining = if is_correct { 0 } else { self.remaining_guesses() };

        Ok(GuessResult {
            feedback,
            is_correct,
            remaining_guesses: remaining,
            completed: self.status.is_terminal(),
            ordinal,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn word(s: &str) -> Word {
        Word::parse(s).unwrap()
    }

    fn open_session(secret: &str) -> GameSession {
        GameSession::new(
            SessionId::new([7; 16]),
            UserId::new([1; 16]),
            word(secret),
            NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
        )
    }

    #[test]
    fn test_new_session_is_open() {
        let session = open_session("CRANE");
        assert_eq!(session.status(), SessionStatus::Open);
        assert_eq!(session.remaining_guesses(), 5);
        assert!(session.guesses().is_empty());
    }

    #[test]
    fn test_winning_guess_transitions_to_won() {
        let mut session = open_session("CRANE");

        let result = session.submit_guess(word("CRANE")).unwrap();
        assert!(result.is_correct);
        assert!(result.completed);
        assert_eq!(result.remaining_guesses, 0);
        assert_eq!(result.ordinal, 1);
        assert_eq!(session.status(), SessionStatus::Won);
    }

    #[test]
    fn test_win_short_circuits_regardless_of_prior_count() {
        let mut session = open_session("CRANE");
        for g in ["SLATE", "STORM", "PLANT"] {
            let r = session.submit_guess(word(g)).unwrap();
            assert!(!r.completed);
        }

        let result = session.submit_guess(word("CRANE")).unwrap();
        assert!(result.is_correct);
        assert_eq!(result.remaining_guesses, 0);
        assert_eq!(session.status(), SessionStatus::Won);
    }

    #[test]
    fn test_five_misses_exhaust_session() {
        let mut session = open_session("CRANE");

        for (i, g) in ["SLATE", "STORM", "PLANT", "FLAME", "SWORD"]
            .iter()
            .enumerate()
        {
            let result = session.submit_guess(word(g)).unwrap();
            assert_eq!(result.ordinal as usize, i + 1);
            assert!(!result.is_correct);
        }

        assert_eq!(session.status(), SessionStatus::Exhausted);
        assert_eq!(session.remaining_guesses(), 0);
    }

    #[test]
    fn test_terminal_session_rejects_without_recording() {
        let mut session = open_session("CRANE");
        session.submit_guess(word("CRANE")).unwrap();

        let before = session.guesses().len();
        let err = session.submit_guess(word("SLATE")).unwrap_err();
        assert_eq!(err, SessionError::AlreadyTerminal);
        assert_eq!(session.guesses().len(), before);
    }

    #[test]
    fn test_sixth_guess_rejected_after_exhaustion() {
        let mut session = open_session("CRANE");
        for g in ["SLATE", "STORM", "PLANT", "FLAME", "SWORD"] {
            session.submit_guess(word(g)).unwrap();
        }

        let err = session.submit_guess(word("TRASH")).unwrap_err();
        assert_eq!(err, SessionError::AlreadyTerminal);
        assert_eq!(session.guesses().len(), 5);
    }

    #[test]
    fn test_ordinals_are_sequential() {
        let mut session = open_session("CRANE");
        session.submit_guess(word("SLATE")).unwrap();
        session.submit_guess(word("STORM")).unwrap();

        let ordinals: Vec<u8> = session.guesses().iter().map(|g| g.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2]);
    }

    #[test]
    fn test_remaining_decrements_per_miss() {
        let mut session = open_session("CRANE");

        let r1 = session.submit_guess(word("SLATE")).unwrap();
        assert_eq!(r1.remaining_guesses, 4);
        let r2 = session.submit_guess(word("STORM")).unwrap();
        assert_eq!(r2.remaining_guesses, 3);
    }

    #[test]
    fn test_feedback_recorded_with_guess() {
        let mut session = open_session("SPEED");
        session.submit_guess(word("ERASE")).unwrap();

        let record = &session.guesses()[0];
        assert_eq!(record.word, word("ERASE"));
        assert_eq!(record.feedback.code(), "OYYOO");
    }

    #[test]
    fn test_win_on_fifth_guess_is_won_not_exhausted() {
        let mut session = open_session("CRANE");
        for g in ["SLATE", "STORM", "PLANT", "FLAME"] {
            session.submit_guess(word(g)).unwrap();
        }

        let result = session.submit_guess(word("CRANE")).unwrap();
        assert!(result.is_correct);
        assert!(result.completed);
        assert_eq!(session.status(), SessionStatus::Won);
    }
}
