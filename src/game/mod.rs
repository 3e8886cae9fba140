//! Game Logic Module
//!
//! Accounts, session state machine, persistence seam and reporting.
//! Everything here is exercised through `service::GameService`.
//!
//! ## Module Structure
//!
//! - `user`: Accounts, roles, registration rules
//! - `session`: Game session state machine and guess records
//! - `store`: Store capability trait + in-memory implementation
//! - `report`: Daily and per-user report rows
//! - `service`: Orchestration over the store

pub mod report;
pub mod service;
pub mod session;
pub mod store;
pub mod user;

// Re-export key types
pub use report::{DailyReport, UserReport, UserReportRow};
pub use service::{GameError, GameService, GuessOutcome};
pub use session::{GameSession, GuessRecord, SessionError, SessionId, SessionStatus};
pub use store::{MemoryStore, Store, StoreError};
pub use user::{Role, UserId, UserRecord};
