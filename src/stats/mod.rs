//! Analytics data model and the unified stats facade
//!
//! Records produced by the analytics provider are stamped with the sync date
//! before they are persisted. The facade in [`facade`] exposes realtime,
//! server health and build project statistics behind one interface.

pub mod facade;
pub mod pages;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use facade::SideStats;

/// One analytics property to sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Configuration key, e.g. "TheQuestion"
    pub key: String,
    /// Provider-specific property identifier
    pub provider_id: String,
}

impl Account {
    pub fn new(key: impl Into<String>, provider_id: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            provider_id: provider_id.into(),
        }
    }
}

/// Aggregated metrics for one account over one calendar day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub sessions: i64,
    pub users: i64,
    pub new_users: i64,
    pub page_views: i64,
    pub avg_session_duration: f64,
    pub bounce_rate: f64,
    #[serde(default)]
    pub sync_date: Option<NaiveDate>,
}

impl DailySummary {
    pub fn stamp(&mut self, date: NaiveDate) {
        self.sync_date = Some(date);
    }
}

/// Per-question breakdown row for one account and day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionStat {
    pub question_id: i64,
    pub page_views: i64,
    pub unique_page_views: i64,
    pub avg_time_on_page: f64,
    pub entrances: i64,
    #[serde(default)]
    pub sync_date: Option<NaiveDate>,
}

impl QuestionStat {
    pub fn new(question_id: i64) -> Self {
        Self {
            question_id,
            ..Default::default()
        }
    }

    pub fn stamp(&mut self, date: NaiveDate) {
        self.sync_date = Some(date);
    }
}
