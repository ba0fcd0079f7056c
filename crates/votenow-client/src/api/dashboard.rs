use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::models::{AdminSummary, Id, PollStats};
use crate::request::ApiRequest;

/// Aggregated statistics under `/dashboard/`.
pub struct DashboardApi<'a> {
    dispatcher: &'a Dispatcher,
}

impl<'a> DashboardApi<'a> {
    pub(crate) fn new(dispatcher: &'a Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// User and poll totals plus the most voted polls. Admin only.
    pub async fn admin_summary(&self) -> Result<AdminSummary> {
        self.dispatcher
            .send_json(ApiRequest::get("/dashboard/admin-summary/"))
            .await
    }

    /// Per-option counts, recent activity and the predicted winner.
    pub async fn poll_stats(&self, poll: Id) -> Result<PollStats> {
        self.dispatcher
            .send_json(ApiRequest::get(format!("/dashboard/polls/{poll}/stats/")))
            .await
    }
}
