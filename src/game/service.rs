//! Game orchestration.
//!
//! `GameService` is the request-facing surface: it validates input shape,
//! checks credentials, draws secrets, and drives the session state machine
//! through the store capability. The network layer maps these results onto
//! protocol messages; nothing here knows about sockets.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::feedback::Feedback;
use crate::core::rng::{derive_draw_seed, DeterministicRng};
use crate::core::word::{Word, WordError};
use crate::core::wordlist::WordPool;
use crate::game::report::{DailyReport, UserReport};
use crate::game::session::{GameSession, SessionError, SessionId};
use crate::game::store::{Store, StoreError};
use crate::game::user::{
    validate_password, validate_username, RegistrationError, Role, UserId, UserRecord,
};
use crate::network::auth::{hash_password, verify_password};
use crate::{DAILY_GAME_LIMIT, MAX_GUESSES};

/// Errors surfaced to the request layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Guess or word failed shape validation before evaluation.
    #[error("malformed input: {0}")]
    MalformedInput(#[from] WordError),

    /// Registration input violated the account rules.
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    /// Username already registered.
    #[error("username already exists")]
    UsernameTaken,

    /// Unknown username or wrong password.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// No such user.
    #[error("user not found")]
    UserNotFound,

    /// No such session for this user.
    #[error("session not found")]
    SessionNotFound,

    /// Guess submitted to a Won or Exhausted session.
    #[error("session already completed")]
    SessionAlreadyTerminal,

    /// Guess limit hit while the session was still open. Defensive; the
    /// state machine makes this unreachable.
    #[error("guess limit exceeded")]
    GuessLimitExceeded,

    /// The user already started the allowed games today.
    #[error("daily limit reached (3 games per day)")]
    DailyLimitReached,

    /// The secret pool is empty (misconfiguration).
    #[error("no words available")]
    EmptyWordPool,
}

impl From<StoreError> for GameError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UsernameTaken => Self::UsernameTaken,
            StoreError::UserNotFound => Self::UserNotFound,
            StoreError::SessionNotFound => Self::SessionNotFound,
            StoreError::DailyLimitReached => Self::DailyLimitReached,
        }
    }
}

impl From<SessionError> for GameError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::AlreadyTerminal => Self::SessionAlreadyTerminal,
            SessionError::GuessLimitExceeded => Self::GuessLimitExceeded,
        }
    }
}

/// Successful login data.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// The account id.
    pub user_id: UserId,
    /// The login name.
    pub username: String,
    /// Account role.
    pub role: Role,
}

/// Data returned when a game starts. The secret stays server-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameStarted {
    /// The new session's id.
    pub session_id: SessionId,
    /// Guess budget for the session.
    pub max_guesses: u8,
    /// Games the user may still start today, after this one.
    pub games_remaining_today: u32,
}

/// Outcome of one guess submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessOutcome {
    /// Per-letter feedback.
    pub feedback: Feedback,
    /// Whether the guess matched the secret.
    pub is_correct: bool,
    /// Guesses still available.
    pub remaining_guesses: u8,
    /// Whether the session is finished.
    pub completed: bool,
}

/// Current daily standing for a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameStatus {
    /// Games started today.
    pub games_played_today: u32,
    /// Games the user may still start today.
    pub games_remaining: u32,
}

/// The request-facing game service.
pub struct GameService<S: Store> {
    store: Arc<S>,
    pool: WordPool,
}

impl<S: Store> GameService<S> {
    /// Create a service over a store capability and secret pool.
    pub fn new(store: Arc<S>, pool: WordPool) -> Self {
        Self { store, pool }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Register a new account.
    pub async fn register(&self, username: &str, password: &str) -> Result<UserId, GameError> {
        let username = username.trim();
        let password = password.trim();
        validate_username(username)?;
        validate_password(password)?;

        let user = UserRecord {
            id: UserId::generate(),
            username: username.to_string(),
            credential: hash_password(password),
            role: Role::Player,
            created_at: Utc::now(),
        };
        let id = user.id;

        self.store.create_user(user).await?;
        info!(username, "registered user");
        Ok(id)
    }

    /// Verify credentials.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, GameError> {
        let username = username.trim();
        let user = self
            .store
            .find_user_by_name(username)
            .await
            .ok_or(GameError::InvalidCredentials)?;

        if !verify_password(&user.credential, password.trim()) {
            return Err(GameError::InvalidCredentials);
        }

        debug!(username, "login ok");
        Ok(LoginOutcome {
            user_id: user.id,
            username: user.username,
            role: user.role,
        })
    }

    /// Start a new game for a user, subject to the daily cap.
    ///
    /// The secret is drawn uniformly from the pool and never returned.
    pub async fn start_game(&self, user_id: UserId) -> Result<GameStarted, GameError> {
        if self.store.find_user(&user_id).await.is_none() {
            return Err(GameError::UserNotFound);
        }

        let session_id = SessionId::generate();
        let now = Utc::now();
        let seed = derive_draw_seed(session_id.as_bytes(), now.timestamp_millis() as u64);
        let secret = self
            .pool
            .draw(&mut DeterministicRng::new(seed))
            .ok_or(GameError::EmptyWordPool)?;

        let today = now.date_naive();
        let session = GameSession::new(session_id, user_id, secret, today);

        // The store applies the cap check and insert atomically.
        self.store.create_session(session).await?;

        let played = self.store.count_sessions_on(&user_id, today).await;
        info!(
            session = %session_id.to_uuid_string(),
            user = %user_id.to_uuid_string(),
            "game started"
        );

        Ok(GameStarted {
            session_id,
            max_guesses: MAX_GUESSES,
            games_remaining_today: DAILY_GAME_LIMIT.saturating_sub(played),
        })
    }

    /// Submit a guess for a session.
    ///
    /// Validates the guess shape before anything else; unknown sessions and
    /// sessions owned by another user both surface as `SessionNotFound`.
    /// The whole read-evaluate-record-transition unit runs under the
    /// session's write lock.
    pub async fn submit_guess(
        &self,
        session_id: SessionId,
        user_id: UserId,
        guess_text: &str,
    ) -> Result<GuessOutcome, GameError> {
        let guess = Word::parse(guess_text)?;

        let handle = self
            .store
            .session(&session_id)
            .await
            .ok_or(GameError::SessionNotFound)?;

        let mut session = handle.write().await;
        if session.user_id != user_id {
            return Err(GameError::SessionNotFound);
        }

        let result = session.submit_guess(guess)?;
        debug!(
            session = %session_id.to_uuid_string(),
            ordinal = result.ordinal,
            feedback = %result.feedback,
            "guess evaluated"
        );

        Ok(GuessOutcome {
            feedback: result.feedback,
            is_correct: result.is_correct,
            remaining_guesses: result.remaining_guesses,
            completed: result.completed,
        })
    }

    /// How many games a user has played today and how many remain.
    pub async fn game_status(&self, user_id: UserId) -> Result<GameStatus, GameError> {
        if self.store.find_user(&user_id).await.is_none() {
            return Err(GameError::UserNotFound);
        }

        let today = Utc::now().date_naive();
        let played = self.store.count_sessions_on(&user_id, today).await;
        Ok(GameStatus {
            games_played_today: played,
            games_remaining: DAILY_GAME_LIMIT.saturating_sub(played),
        })
    }

    /// Daily aggregate report.
    pub async fn daily_report(&self, date: NaiveDate) -> DailyReport {
        self.store.daily_report(date).await
    }

    /// Per-day history for a user, newest first.
    pub async fn user_report(&self, username: &str) -> Result<UserReport, GameError> {
        let user = self
            .store
            .find_user_by_name(username.trim())
            .await
            .ok_or(GameError::UserNotFound)?;

        let rows = self.store.user_report(&user.id).await;
        Ok(UserReport {
            username: user.username,
            rows,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::store::MemoryStore;

    fn service() -> GameService<MemoryStore> {
        GameService::new(Arc::new(MemoryStore::new()), WordPool::default())
    }

    /// Service over a single-word pool so tests know the secret.
    fn rigged_service(secret: &str) -> GameService<MemoryStore> {
        GameService::new(
            Arc::new(MemoryStore::new()),
            WordPool::new(&[secret]).unwrap(),
        )
    }

    async fn registered(svc: &GameService<MemoryStore>, name: &str) -> UserId {
        svc.register(name, "abc1$").await.unwrap()
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let svc = service();
        let id = registered(&svc, "alice").await;

        let login = svc.login("alice", "abc1$").await.unwrap();
        assert_eq!(login.user_id, id);
        assert_eq!(login.username, "alice");
        assert_eq!(login.role, Role::Player);
    }

    #[tokio::test]
    async fn test_register_rejects_bad_input() {
        let svc = service();
        assert!(matches!(
            svc.register("ab", "abc1$").await,
            Err(GameError::Registration(_))
        ));
        assert!(matches!(
            svc.register("alice", "short").await,
            Err(GameError::Registration(_))
        ));
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let svc = service();
        registered(&svc, "alice").await;
        assert_eq!(
            svc.register("alice", "abc1$").await,
            Err(GameError::UsernameTaken)
        );
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let svc = service();
        registered(&svc, "alice").await;

        assert!(matches!(
            svc.login("alice", "wrong1$").await,
            Err(GameError::InvalidCredentials)
        ));
        assert!(matches!(
            svc.login("nobody", "abc1$").await,
            Err(GameError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_start_game_draws_from_pool() {
        let svc = service();
        let id = registered(&svc, "alice").await;

        let started = svc.start_game(id).await.unwrap();
        assert_eq!(started.max_guesses, MAX_GUESSES);
        assert_eq!(started.games_remaining_today, DAILY_GAME_LIMIT - 1);
    }

    #[tokio::test]
    async fn test_start_game_unknown_user() {
        let svc = service();
        assert_eq!(
            svc.start_game(UserId::generate()).await,
            Err(GameError::UserNotFound)
        );
    }

    #[tokio::test]
    async fn test_daily_cap_through_service() {
        let svc = service();
        let id = registered(&svc, "alice").await;

        for _ in 0..DAILY_GAME_LIMIT {
            svc.start_game(id).await.unwrap();
        }
        assert_eq!(svc.start_game(id).await, Err(GameError::DailyLimitReached));

        let status = svc.game_status(id).await.unwrap();
        assert_eq!(status.games_played_today, DAILY_GAME_LIMIT);
        assert_eq!(status.games_remaining, 0);
    }

    #[tokio::test]
    async fn test_winning_flow() {
        let svc = rigged_service("CRANE");
        let id = registered(&svc, "alice").await;
        let started = svc.start_game(id).await.unwrap();

        let miss = svc
            .submit_guess(started.session_id, id, "slate")
            .await
            .unwrap();
        assert!(!miss.is_correct);
        assert_eq!(miss.remaining_guesses, 4);

        let win = svc
            .submit_guess(started.session_id, id, "crane")
            .await
            .unwrap();
        assert!(win.is_correct);
        assert!(win.completed);
        assert_eq!(win.remaining_guesses, 0);
        assert_eq!(win.feedback.code(), "GGGGG");
    }

    #[tokio::test]
    async fn test_malformed_guess_rejected_before_evaluation() {
        let svc = rigged_service("CRANE");
        let id = registered(&svc, "alice").await;
        let started = svc.start_game(id).await.unwrap();

        assert!(matches!(
            svc.submit_guess(started.session_id, id, "AB").await,
            Err(GameError::MalformedInput(_))
        ));
        assert!(matches!(
            svc.submit_guess(started.session_id, id, "CR4NE").await,
            Err(GameError::MalformedInput(_))
        ));

        // Nothing was recorded.
        let handle = svc.store().session(&started.session_id).await.unwrap();
        assert!(handle.read().await.guesses().is_empty());
    }

    #[tokio::test]
    async fn test_guess_on_foreign_session_is_not_found() {
        let svc = rigged_service("CRANE");
        let alice = registered(&svc, "alice").await;
        let mallory = registered(&svc, "mallory").await;
        let started = svc.start_game(alice).await.unwrap();

        assert_eq!(
            svc.submit_guess(started.session_id, mallory, "slate").await,
            Err(GameError::SessionNotFound)
        );
    }

    #[tokio::test]
    async fn test_guess_on_unknown_session() {
        let svc = service();
        let id = registered(&svc, "alice").await;
        assert_eq!(
            svc.submit_guess(SessionId::generate(), id, "slate").await,
            Err(GameError::SessionNotFound)
        );
    }

    #[tokio::test]
    async fn test_exhaustion_then_terminal_rejection() {
        let svc = rigged_service("CRANE");
        let id = registered(&svc, "alice").await;
        let started = svc.start_game(id).await.unwrap();

        for g in ["SLATE", "STORM", "PLANT", "FLAME", "SWORD"] {
            let out = svc.submit_guess(started.session_id, id, g).await.unwrap();
            assert!(!out.is_correct);
        }

        assert_eq!(
            svc.submit_guess(started.session_id, id, "TRASH").await,
            Err(GameError::SessionAlreadyTerminal)
        );
    }

    #[tokio::test]
    async fn test_reports_through_service() {
        let svc = rigged_service("CRANE");
        let id = registered(&svc, "alice").await;
        let started = svc.start_game(id).await.unwrap();
        svc.submit_guess(started.session_id, id, "CRANE")
            .await
            .unwrap();

        let today = Utc::now().date_naive();
        let daily = svc.daily_report(today).await;
        assert_eq!(daily.num_users, 1);
        assert_eq!(daily.num_correct, 1);

        let report = svc.user_report("alice").await.unwrap();
        assert_eq!(report.username, "alice");
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].words_tried, 1);
        assert_eq!(report.rows[0].correct_guesses, 1);

        assert_eq!(
            svc.user_report("nobody").await,
            Err(GameError::UserNotFound)
        );
    }

    #[tokio::test]
    async fn test_empty_pool_surfaces_configuration_error() {
        let svc = GameService::new(
            Arc::new(MemoryStore::new()),
            WordPool::new::<&str>(&[]).unwrap(),
        );
        let id = registered(&svc, "alice").await;
        assert_eq!(svc.start_game(id).await, Err(GameError::EmptyWordPool));
    }
}
