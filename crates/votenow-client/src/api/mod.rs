//! Domain clients: one method per remote operation.
//!
//! Each client is a thin borrowed view over the [`Dispatcher`]; it owns no
//! state and can be created as often as needed via
//! [`VoteNowClient`](crate::VoteNowClient).

mod admin;
mod banners;
mod dashboard;
mod polls;
mod users;

pub use admin::{AdminApi, AdminBannersApi, AdminPollsApi, AdminUsersApi, AdminVotesApi};
pub use banners::BannersApi;
pub use dashboard::DashboardApi;
pub use polls::PollsApi;
pub use users::UsersApi;

use serde::Serialize;

use crate::error::{ClientError, Result};
use crate::models::Id;

#[derive(Serialize)]
struct BulkDeleteBody<'a> {
    ids: &'a [Id],
}

/// Body for `POST /admin/{resource}/bulk-delete/`. At least one id is required.
fn bulk_delete_body(ids: &[Id]) -> Result<BulkDeleteBody<'_>> {
    if ids.is_empty() {
        return Err(ClientError::validation("select at least one item to delete"));
    }
    Ok(BulkDeleteBody { ids })
}
