//! Protocol Messages
//!
//! Wire format for client-server communication over WebSocket.
//! All messages are JSON; ids travel as UUID strings for client ease.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::feedback::{Feedback, LetterMark};
use crate::game::report::{DailyReport, UserReportRow};
use crate::game::user::Role;

// =============================================================================
// CLIENT -> SERVER MESSAGES
// =============================================================================

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Create an account.
    Register(RegisterRequest),

    /// Log in with username and password; authenticates the connection.
    Login(LoginRequest),

    /// Re-authenticate the connection with a previously issued token.
    Authenticate(AuthenticateRequest),

    /// Start a new game for the authenticated user.
    StartGame,

    /// Submit a guess for a session.
    Guess(GuessRequest),

    /// Today's played/remaining counts for the authenticated user.
    GameStatus,

    /// Aggregate report for one day.
    DailyReport(DailyReportRequest),

    /// Per-day history for a user.
    UserReport(UserReportRequest),

    /// Ping for latency measurement.
    Ping { timestamp: u64 },
}

/// Registration request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Desired login name.
    pub username: String,
    /// Password (validated server-side).
    pub password: String,
}

/// Login request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Login name.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Token re-authentication request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticateRequest {
    /// A token previously returned by `LoginOk`.
    pub token: String,
}

/// Guess submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuessRequest {
    /// Target session (UUID string).
    pub session_id: String,
    /// The guessed word; normalized and validated server-side.
    pub guess: String,
}

/// Daily report request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyReportRequest {
    /// Day to report on (`YYYY-MM-DD`); today (UTC) when omitted.
    pub date: Option<NaiveDate>,
}

/// User report request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserReportRequest {
    /// Login name to report on.
    pub username: String,
}

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Registration succeeded.
    Registered(RegisteredInfo),

    /// Login succeeded; the connection is now authenticated.
    LoginOk(LoginInfo),

    /// Token re-authentication succeeded.
    Authenticated(AuthenticatedInfo),

    /// A game was started.
    GameStarted(GameStartedInfo),

    /// Feedback for an accepted guess.
    GuessResult(GuessResultInfo),

    /// Daily standing for the authenticated user.
    GameStatus(GameStatusInfo),

    /// Aggregate report for one day.
    DailyReport(DailyReport),

    /// Per-day history for a user.
    UserReport(UserReportInfo),

    /// Pong response.
    Pong { timestamp: u64, server_time: u64 },

    /// Error message.
    Error(ServerError),

    /// Server is shutting down.
    Shutdown { reason: String },
}

/// Registration result data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredInfo {
    /// New account id (UUID string).
    pub user_id: String,
}

/// Login result data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginInfo {
    /// Account id (UUID string).
    pub user_id: String,
    /// Login name.
    pub username: String,
    /// Account role.
    pub role: Role,
    /// Session token for later re-authentication, when the server has a
    /// signing secret configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Server version.
    pub server_version: String,
}

/// Token re-authentication result data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedInfo {
    /// Account id (UUID string).
    pub user_id: String,
    /// Account role.
    pub role: Role,
}

/// Game start data. The secret word never appears here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStartedInfo {
    /// New session id (UUID string).
    pub session_id: String,
    /// Guess budget for the session.
    pub max_guesses: u8,
    /// Games the user may still start today.
    pub games_remaining_today: u32,
}

/// Guess feedback data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuessResultInfo {
    /// Per-letter marks, positionally aligned with the guess.
    pub feedback: Vec<LetterMark>,
    /// Compact 5-character code (`G`/`O`/`Y` per position).
    pub code: String,
    /// Whether the guess matched the secret.
    pub is_correct: bool,
    /// Guesses still available.
    pub remaining_guesses: u8,
    /// Whether the session is finished.
    pub completed: bool,
}

impl GuessResultInfo {
    /// Build from evaluated feedback plus session bookkeeping.
    pub fn from_feedback(
        feedback: Feedback,
        is_correct: bool,
        remaining_guesses: u8,
        completed: bool,
    ) -> Self {
        Self {
            feedback: feedback.marks().to_vec(),
            code: feedback.code(),
            is_correct,
            remaining_guesses,
            completed,
        }
    }
}

/// Daily standing data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStatusInfo {
    /// Games started today.
    pub games_played_today: u32,
    /// Games the user may still start today.
    pub games_remaining: u32,
}

/// User report data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserReportInfo {
    /// Login name the report covers.
    pub username: String,
    /// Per-day rows, newest first.
    pub report: Vec<UserReportRow>,
}

/// Server error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerError {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
}

/// Error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Registration or guess input failed validation.
    InvalidInput,
    /// Username already registered.
    UsernameTaken,
    /// Unknown username or wrong password.
    InvalidCredentials,
    /// Request requires an authenticated connection.
    NotAuthenticated,
    /// Session token invalid or expired.
    InvalidToken,
    /// User not found.
    UserNotFound,
    /// Session not found for this user.
    SessionNotFound,
    /// Session already finished.
    SessionCompleted,
    /// Guess limit reached.
    GuessLimitExceeded,
    /// The daily game cap is already met.
    DailyLimitReached,
    /// Internal error.
    InternalError,
}

// =============================================================================
// SERIALIZATION HELPERS
// =============================================================================

impl ClientMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::word::Word;
    use crate::core::feedback::evaluate;

    #[test]
    fn test_client_message_json_roundtrip() {
        let msg = ClientMessage::Guess(GuessRequest {
            session_id: "0191d7a8-0000-7000-8000-000000000000".into(),
            guess: "crane".into(),
        });

        let json = msg.to_json().unwrap();
        let parsed = ClientMessage::from_json(&json).unwrap();

        if let ClientMessage::Guess(req) = parsed {
            assert_eq!(req.guess, "crane");
        } else {
            panic!("Wrong message type");
        }
    }

    #[test]
    fn test_tagged_encoding_uses_snake_case() {
        let msg = ClientMessage::StartGame;
        let json = msg.to_json().unwrap();
        assert!(json.contains("start_game"));

        let msg = ClientMessage::DailyReport(DailyReportRequest { date: None });
        assert!(msg.to_json().unwrap().contains("daily_report"));
    }

    #[test]
    fn test_guess_result_info_from_feedback() {
        let secret = Word::parse("SPEED").unwrap();
        let guess = Word::parse("ERASE").unwrap();
        let feedback = evaluate(&secret, &guess);

        let info = GuessResultInfo::from_feedback(feedback, false, 4, false);
        assert_eq!(info.code, "OYYOO");
        assert_eq!(info.feedback.len(), 5);
        assert_eq!(info.feedback[0], LetterMark::Present);
        assert_eq!(info.feedback[1], LetterMark::Absent);

        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("\"present\""));
        assert!(json.contains("\"OYYOO\""));
    }

    #[test]
    fn test_server_message_json_roundtrip() {
        let msg = ServerMessage::GameStarted(GameStartedInfo {
            session_id: "0191d7a8-0000-7000-8000-000000000001".into(),
            max_guesses: 5,
            games_remaining_today: 2,
        });

        let json = msg.to_json().unwrap();
        let parsed = ServerMessage::from_json(&json).unwrap();

        if let ServerMessage::GameStarted(info) = parsed {
            assert_eq!(info.max_guesses, 5);
            assert_eq!(info.games_remaining_today, 2);
        } else {
            panic!("Wrong message type");
        }
    }

    #[test]
    fn test_login_info_omits_absent_token() {
        let msg = ServerMessage::LoginOk(LoginInfo {
            user_id: "0191d7a8-0000-7000-8000-000000000002".into(),
            username: "alice".into(),
            role: Role::Player,
            token: None,
            server_version: "0.1.0".into(),
        });

        let json = msg.to_json().unwrap();
        assert!(!json.contains("token"));
        assert!(json.contains("\"player\""));
    }

    #[test]
    fn test_error_codes_encoding() {
        let msg = ServerMessage::Error(ServerError {
            code: ErrorCode::DailyLimitReached,
            message: "Daily limit reached (3 games per day)".into(),
        });

        let json = msg.to_json().unwrap();
        assert!(json.contains("daily_limit_reached"));
    }

    #[test]
    fn test_daily_report_date_parsing() {
        let json = r#"{"type":"daily_report","date":"2026-03-14"}"#;
        let parsed = ClientMessage::from_json(json).unwrap();

        if let ClientMessage::DailyReport(req) = parsed {
            let date = req.date.unwrap();
            assert_eq!(date.to_string(), "2026-03-14");
        } else {
            panic!("Wrong message type");
        }
    }

    #[test]
    fn test_invalid_message_rejected() {
        assert!(ClientMessage::from_json("{\"type\":\"no_such\"}").is_err());
        assert!(ClientMessage::from_json("not json").is_err());
    }
}
