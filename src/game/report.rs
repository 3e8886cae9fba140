//! Report row types.
//!
//! Reports are read-only aggregations over stored sessions; the store
//! computes them, these types just carry the numbers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Activity across all users on one UTC day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyReport {
    /// The day being reported.
    pub date: NaiveDate,
    /// Distinct users who started at least one game.
    pub num_users: u32,
    /// Games won that day.
    pub num_correct: u32,
}

/// One user's activity on one UTC day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserReportRow {
    /// The day being reported.
    pub date: NaiveDate,
    /// Games started that day.
    pub words_tried: u32,
    /// Games won that day.
    pub correct_guesses: u32,
}

/// Per-day history for one user, newest day first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserReport {
    /// The user's login name.
    pub username: String,
    /// Per-day rows, descending by date.
    pub rows: Vec<UserReportRow>,
}
