use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Id;
use crate::error::{ClientError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollOption {
    pub id: Id,
    pub option_text: String,
}

/// A poll as returned by the public poll endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poll {
    pub id: Id,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub created_by: Option<Id>,
    pub created_at: DateTime<Utc>,
    pub active: bool,
    /// Winning option, once an admin has published one.
    pub winner: Option<Id>,
    #[serde(default)]
    pub options: Vec<PollOption>,
    /// Whether the requesting user already voted; always false when anonymous.
    #[serde(default)]
    pub user_voted: bool,
    #[serde(default)]
    pub total_votes: u64,
}

impl Poll {
    pub fn option(&self, id: Id) -> Option<&PollOption> {
        self.options.iter().find(|o| o.id == id)
    }

    pub fn winning_option(&self) -> Option<&PollOption> {
        self.winner.and_then(|id| self.option(id))
    }
}

/// Input for `POST /polls/create/`.
#[derive(Debug, Clone, Default)]
pub struct NewPoll {
    pub title: String,
    pub description: String,
    pub category: String,
    pub options: Vec<String>,
}

#[derive(Serialize)]
struct NewOptionBody<'a> {
    option_text: &'a str,
}

#[derive(Serialize)]
pub(crate) struct NewPollBody<'a> {
    title: &'a str,
    description: &'a str,
    category: &'a str,
    options: Vec<NewOptionBody<'a>>,
}

impl NewPoll {
    pub const MIN_OPTIONS: usize = 2;

    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_option(mut self, option: impl Into<String>) -> Self {
        self.options.push(option.into());
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.extend(options.into_iter().map(Into::into));
        self
    }

    /// Check the poll locally and build the request body.
    ///
    /// Blank options are dropped; fewer than two remaining is rejected.
    pub(crate) fn to_body(&self) -> Result<NewPollBody<'_>> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ClientError::validation("poll title must not be empty"));
        }

        let options: Vec<_> = self
            .options
            .iter()
            .map(|o| o.trim())
            .filter(|o| !o.is_empty())
            .map(|option_text| NewOptionBody { option_text })
            .collect();

        if options.len() < Self::MIN_OPTIONS {
            return Err(ClientError::validation(format!(
                "please provide at least {} options",
                Self::MIN_OPTIONS
            )));
        }

        Ok(NewPollBody {
            title,
            description: self.description.trim(),
            category: self.category.trim(),
            options,
        })
    }
}

/// Body of `POST /polls/{id}/vote/`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct VoteRequest {
    pub option: Id,
    pub poll: Id,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub id: Id,
    pub poll: Id,
    pub option: Id,
    pub voted_by: Option<Id>,
    pub voted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionResult {
    pub option_text: String,
    #[serde(default)]
    pub votes_count: u64,
}

/// `GET /polls/{id}/results/`: tallies computed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollResults {
    /// Poll title.
    pub poll: String,
    pub options: Vec<OptionResult>,
}

impl PollResults {
    pub fn total_votes(&self) -> u64 {
        self.options.iter().map(|o| o.votes_count).sum()
    }

    /// Option with the most votes; `None` when nobody has voted.
    pub fn leader(&self) -> Option<&OptionResult> {
        self.options
            .iter()
            .filter(|o| o.votes_count > 0)
            .max_by_key(|o| o.votes_count)
    }
}
