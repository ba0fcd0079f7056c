use serde::Serialize;

use crate::dispatcher::Dispatcher;
use crate::error::{ClientError, Result};
use crate::models::{Id, NewPoll, Poll, PollOption, PollResults, Vote, VoteRequest};
use crate::request::ApiRequest;

#[derive(Serialize)]
struct NewOption<'a> {
    option_text: &'a str,
}

/// Poll browsing, creation and voting under `/polls/`.
pub struct PollsApi<'a> {
    dispatcher: &'a Dispatcher,
}

impl<'a> PollsApi<'a> {
    pub(crate) fn new(dispatcher: &'a Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Active polls. Works anonymously.
    pub async fn list(&self) -> Result<Vec<Poll>> {
        self.dispatcher.send_json(ApiRequest::get("/polls/")).await
    }

    /// Every poll, including inactive ones. Admin only.
    pub async fn list_all(&self) -> Result<Vec<Poll>> {
        self.dispatcher
            .send_json(ApiRequest::get("/polls/admin/all/"))
            .await
    }

    pub async fn get(&self, id: Id) -> Result<Poll> {
        self.dispatcher
            .send_json(ApiRequest::get(format!("/polls/{id}/")))
            .await
    }

    /// Create a poll. Rejected locally without a title or with fewer than
    /// two non-blank options.
    pub async fn create(&self, poll: &NewPoll) -> Result<Poll> {
        let request = ApiRequest::post("/polls/create/").json(&poll.to_body()?)?;
        self.dispatcher.send_json(request).await
    }

    pub async fn add_option(&self, poll: Id, text: &str) -> Result<PollOption> {
        let option_text = text.trim();
        if option_text.is_empty() {
            return Err(ClientError::validation("option text must not be empty"));
        }
        let request = ApiRequest::post(format!("/polls/{poll}/options/create/"))
            .json(&NewOption { option_text })?;
        self.dispatcher.send_json(request).await
    }

    pub async fn vote(&self, poll: Id, option: Id) -> Result<Vote> {
        let request =
            ApiRequest::post(format!("/polls/{poll}/vote/")).json(&VoteRequest { option, poll })?;
        self.dispatcher.send_json(request).await
    }

    pub async fn results(&self, id: Id) -> Result<PollResults> {
        self.dispatcher
            .send_json(ApiRequest::get(format!("/polls/{id}/results/")))
            .await
    }
}
