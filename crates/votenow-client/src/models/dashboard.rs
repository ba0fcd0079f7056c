use serde::{Deserialize, Serialize};

use super::Id;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopPoll {
    pub poll_id: Id,
    pub title: String,
    pub total_votes: u64,
}

/// `GET /dashboard/admin-summary/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSummary {
    pub total_users: u64,
    pub total_polls: u64,
    pub active_polls: u64,
    #[serde(default)]
    pub top_polls: Vec<TopPoll>,
    /// Daily vote counts, oldest day first.
    #[serde(default)]
    pub votes_last_7_days: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionStats {
    pub option_id: Id,
    pub option_text: String,
    pub votes_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictedWinner {
    pub option_id: Id,
    pub option_text: String,
    #[serde(default)]
    pub reason: String,
}

/// `GET /dashboard/polls/{id}/stats/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollStats {
    pub poll_id: Id,
    pub poll_title: String,
    pub total_votes: u64,
    pub options: Vec<OptionStats>,
    /// Hourly vote counts, oldest hour first.
    #[serde(default)]
    pub votes_last_3_hours: Vec<u64>,
    pub predicted_winner: Option<PredictedWinner>,
}
