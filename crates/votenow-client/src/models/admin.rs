//! Models for the `/admin/` management endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Id, Page, Role};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminStats {
    pub total_users: u64,
    pub admin_users: u64,
    pub regular_users: u64,
    pub total_polls: u64,
    pub active_polls: u64,
    pub inactive_polls: u64,
    pub total_votes: u64,
    pub total_banners: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: Id,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_votes: u64,
    #[serde(default)]
    pub polls_created: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminUserDetail {
    pub id: Id,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub role: Role,
    pub is_active: bool,
    #[serde(default)]
    pub is_staff: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

/// Partial update for `PUT /admin/users/{id}/`; unset fields are left alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_staff: Option<bool>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
            && self.role.is_none()
            && self.is_active.is_none()
            && self.is_staff.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminPoll {
    pub id: Id,
    pub title: String,
    #[serde(default)]
    pub category: String,
    pub active: bool,
    pub created_by_username: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub total_votes: u64,
    #[serde(default)]
    pub options_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminPollOption {
    pub id: Id,
    pub option_text: String,
    #[serde(default)]
    pub votes_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminPollDetail {
    pub id: Id,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub active: bool,
    pub created_by: Option<Id>,
    pub created_by_username: Option<String>,
    pub created_at: DateTime<Utc>,
    pub winner: Option<Id>,
    pub winner_text: Option<String>,
    #[serde(default)]
    pub options: Vec<AdminPollOption>,
    #[serde(default)]
    pub total_votes: u64,
}

/// Partial update for `PUT /admin/polls/{id}/`.
///
/// `winner: Some(None)` clears a published winner. Setting `options`
/// replaces every existing option (and with them their votes).
#[derive(Debug, Clone, Default, Serialize)]
pub struct PollUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<Option<Id>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminBanner {
    pub id: Id,
    pub title: String,
    pub poll: Id,
    pub poll_title: Option<String>,
    #[serde(default)]
    pub poll_active: bool,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminBannerDetail {
    pub id: Id,
    pub title: String,
    pub poll: Id,
    pub poll_title: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Partial update for `PUT /admin/banners/{id}/`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BannerUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll: Option<Id>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminVote {
    pub id: Id,
    pub poll: Id,
    pub poll_title: Option<String>,
    pub option: Id,
    pub option_text: Option<String>,
    pub voted_by: Id,
    pub voter_username: Option<String>,
    pub voted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleActiveResponse {
    pub message: String,
    pub active: bool,
}

/// Query for `GET /admin/users/`.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub search: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub page: Page,
}

/// Query for `GET /admin/polls/`.
#[derive(Debug, Clone, Default)]
pub struct PollFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub active: Option<bool>,
    pub page: Page,
}

/// Query for `GET /admin/banners/`.
#[derive(Debug, Clone, Default)]
pub struct BannerFilter {
    pub search: Option<String>,
    pub page: Page,
}

/// Query for `GET /admin/votes/`.
#[derive(Debug, Clone, Default)]
pub struct VoteFilter {
    pub poll_id: Option<Id>,
    pub user_id: Option<Id>,
    pub page: Page,
}

fn push_opt(query: &mut Vec<(String, String)>, key: &str, value: Option<impl ToString>) {
    if let Some(value) = value {
        let value = value.to_string();
        if !value.is_empty() {
            query.push((key.to_string(), value));
        }
    }
}

impl UserFilter {
    pub(crate) fn query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        push_opt(&mut query, "search", self.search.as_deref());
        push_opt(&mut query, "role", self.role);
        push_opt(&mut query, "is_active", self.is_active);
        self.page.append_to(&mut query);
        query
    }
}

impl PollFilter {
    pub(crate) fn query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        push_opt(&mut query, "search", self.search.as_deref());
        push_opt(&mut query, "category", self.category.as_deref());
        push_opt(&mut query, "active", self.active);
        self.page.append_to(&mut query);
        query
    }
}

impl BannerFilter {
    pub(crate) fn query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        push_opt(&mut query, "search", self.search.as_deref());
        self.page.append_to(&mut query);
        query
    }
}

impl VoteFilter {
    pub(crate) fn query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        push_opt(&mut query, "poll_id", self.poll_id);
        push_opt(&mut query, "user_id", self.user_id);
        self.page.append_to(&mut query);
        query
    }
}
