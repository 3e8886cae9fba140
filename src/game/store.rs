//! Persistence seam.
//!
//! The `Store` trait is the capability handed to `GameService`: user CRUD,
//! session creation under the daily cap, locked session handles, and the
//! report aggregations. No ambient global state; tests construct a
//! `MemoryStore` directly.
//!
//! Atomicity contract:
//! - `create_session` applies the (user, day) cap check and the insert under
//!   one write lock, so concurrent starts cannot exceed the cap.
//! - `session` hands out an `Arc<RwLock<GameSession>>`; a submitter holds
//!   the write lock across read-evaluate-append-transition, so two
//!   concurrent submissions cannot both become the fifth guess.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::game::report::{DailyReport, UserReportRow};
use crate::game::session::{GameSession, SessionId};
use crate::game::user::{UserId, UserRecord};
use crate::DAILY_GAME_LIMIT;

/// Store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Username already registered.
    #[error("username already exists")]
    UsernameTaken,

    /// User id not present.
    #[error("user not found")]
    UserNotFound,

    /// Session id not present (or owned by someone else).
    #[error("session not found")]
    SessionNotFound,

    /// The (user, day) session cap is already met.
    #[error("daily limit reached (3 games per day)")]
    DailyLimitReached,
}

/// Storage capability for users, sessions and reports.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert a new user. Fails if the username is taken.
    async fn create_user(&self, user: UserRecord) -> Result<(), StoreError>;

    /// Look up a user by login name.
    async fn find_user_by_name(&self, username: &str) -> Option<UserRecord>;

    /// Look up a user by id.
    async fn find_user(&self, id: &UserId) -> Option<UserRecord>;

    /// Insert a new session, enforcing the per-(user, day) cap atomically.
    async fn create_session(&self, session: GameSession) -> Result<(), StoreError>;

    /// Load a locked handle to a session.
    async fn session(&self, id: &SessionId) -> Option<Arc<RwLock<GameSession>>>;

    /// Sessions a user has started on a given day.
    async fn count_sessions_on(&self, user_id: &UserId, date: NaiveDate) -> u32;

    /// Distinct users and wins for one day.
    async fn daily_report(&self, date: NaiveDate) -> DailyReport;

    /// Per-day rows for one user, newest first.
    async fn user_report(&self, user_id: &UserId) -> Vec<UserReportRow>;
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

/// In-memory store backed by RwLock'd BTreeMaps.
///
/// Sessions are shared as `Arc<RwLock<GameSession>>` so mutation happens in
/// place under the session's own lock.
#[derive(Default)]
pub struct MemoryStore {
    /// Users by id.
    users: RwLock<BTreeMap<UserId, UserRecord>>,
    /// Username -> user id index.
    usernames: RwLock<BTreeMap<String, UserId>>,
    /// Sessions by id.
    sessions: RwLock<BTreeMap<SessionId, Arc<RwLock<GameSession>>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Session count, for diagnostics.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: UserRecord) -> Result<(), StoreError> {
        // Username index lock taken first and held across the insert so two
        // concurrent registrations of one name cannot both succeed.
        let mut usernames = self.usernames.write().await;
        if usernames.contains_key(&user.username) {
            return Err(StoreError::UsernameTaken);
        }
        usernames.insert(user.username.clone(), user.id);

        let mut users = self.users.write().await;
        users.insert(user.id, user);
        Ok(())
    }

    async fn find_user_by_name(&self, username: &str) -> Option<UserRecord> {
        let id = *self.usernames.read().await.get(username)?;
        self.users.read().await.get(&id).cloned()
    }

    async fn find_user(&self, id: &UserId) -> Option<UserRecord> {
        self.users.read().await.get(id).cloned()
    }

    async fn create_session(&self, session: GameSession) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;

        // Cap check under the same write lock as the insert.
        let mut today = 0u32;
        for handle in sessions.values() {
            let s = handle.read().await;
            if s.user_id == session.user_id && s.game_date == session.game_date {
                today += 1;
            }
        }
        if today >= DAILY_GAME_LIMIT {
            return Err(StoreError::DailyLimitReached);
        }

        sessions.insert(session.id, Arc::new(RwLock::new(session)));
        Ok(())
    }

    async fn session(&self, id: &SessionId) -> Option<Arc<RwLock<GameSession>>> {
        self.sessions.read().await.get(id).cloned()
    }

    async fn count_sessions_on(&self, user_id: &UserId, date: NaiveDate) -> u32 {
        let sessions = self.sessions.read().await;
        let mut count = 0;
        for handle in sessions.values() {
            let s = handle.read().await;
            if s.user_id == *user_id && s.game_date == date {
                count += 1;
            }
        }
        count
    }

    async fn daily_report(&self, date: NaiveDate) -> DailyReport {
        let sessions = self.sessions.read().await;
        let mut users = std::collections::BTreeSet::new();
        let mut num_correct = 0;

        for handle in sessions.values() {
            let s = handle.read().await;
            if s.game_date != date {
                continue;
            }
            users.insert(s.user_id);
            if s.is_won() {
                num_correct += 1;
            }
        }

        DailyReport {
            date,
            num_users: users.len() as u32,
            num_correct,
        }
    }

    async fn user_report(&self, user_id: &UserId) -> Vec<UserReportRow> {
        let sessions = self.sessions.read().await;
        let mut by_date: BTreeMap<NaiveDate, (u32, u32)> = BTreeMap::new();

        for handle in sessions.values() {
            let s = handle.read().await;
            if s.user_id != *user_id {
                continue;
            }
            let entry = by_date.entry(s.game_date).or_default();
            entry.0 += 1;
            if s.is_won() {
                entry.1 += 1;
            }
        }

        // Newest day first.
        by_date
            .into_iter()
            .rev()
            .map(|(date, (tried, correct))| UserReportRow {
                date,
                words_tried: tried,
                correct_guesses: correct,
            })
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
