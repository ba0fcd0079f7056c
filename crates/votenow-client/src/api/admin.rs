//! Admin management under `/admin/`.
//!
//! Every resource follows the same shape: a paginated, filterable list, a
//! detail view, `PUT` updates, `DELETE` and a single-call bulk delete.

use tracing::info;

use super::bulk_delete_body;
use crate::dispatcher::Dispatcher;
use crate::error::{ClientError, Result};
use crate::models::{
    AdminBanner, AdminBannerDetail, AdminPoll, AdminPollDetail, AdminStats, AdminUser,
    AdminUserDetail, AdminVote, BannerFilter, BannerUpdate, Id, MessageResponse, Paginated,
    PollFilter, PollUpdate, ToggleActiveResponse, UserFilter, UserUpdate, VoteFilter,
};
use crate::request::ApiRequest;

pub struct AdminApi<'a> {
    dispatcher: &'a Dispatcher,
}

impl<'a> AdminApi<'a> {
    pub(crate) fn new(dispatcher: &'a Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Site-wide counters.
    pub async fn stats(&self) -> Result<AdminStats> {
        self.dispatcher
            .send_json(ApiRequest::get("/admin/stats/"))
            .await
    }

    pub fn users(&self) -> AdminUsersApi<'a> {
        AdminUsersApi {
            resource: Resource::new(self.dispatcher, "users"),
        }
    }

    pub fn polls(&self) -> AdminPollsApi<'a> {
        AdminPollsApi {
            resource: Resource::new(self.dispatcher, "polls"),
        }
    }

    pub fn banners(&self) -> AdminBannersApi<'a> {
        AdminBannersApi {
            resource: Resource::new(self.dispatcher, "banners"),
        }
    }

    pub fn votes(&self) -> AdminVotesApi<'a> {
        AdminVotesApi {
            resource: Resource::new(self.dispatcher, "votes"),
        }
    }
}

/// Shared request plumbing for one `/admin/{name}/` collection.
struct Resource<'a> {
    dispatcher: &'a Dispatcher,
    name: &'static str,
}

impl<'a> Resource<'a> {
    fn new(dispatcher: &'a Dispatcher, name: &'static str) -> Self {
        Self { dispatcher, name }
    }

    fn collection(&self) -> String {
        format!("/admin/{}/", self.name)
    }

    fn item(&self, id: Id) -> String {
        format!("/admin/{}/{id}/", self.name)
    }

    async fn list<T: serde::de::DeserializeOwned>(
        &self,
        query: Vec<(String, String)>,
    ) -> Result<Paginated<T>> {
        self.dispatcher
            .send_json(ApiRequest::get(self.collection()).query(query))
            .await
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, id: Id) -> Result<T> {
        self.dispatcher.send_json(ApiRequest::get(self.item(id))).await
    }

    async fn update<B, T>(&self, id: Id, body: &B) -> Result<T>
    where
        B: serde::Serialize,
        T: serde::de::DeserializeOwned,
    {
        let request = ApiRequest::put(self.item(id)).json(body)?;
        self.dispatcher.send_json(request).await
    }

    async fn delete(&self, id: Id) -> Result<()> {
        // The backend puts a message in its 204 body; nothing to decode.
        self.dispatcher.send(ApiRequest::delete(self.item(id))).await?;
        info!(resource = self.name, id, "Deleted");
        Ok(())
    }

    /// One request for the whole selection; never a delete per id.
    async fn bulk_delete(&self, ids: &[Id]) -> Result<MessageResponse> {
        let body = bulk_delete_body(ids)?;
        let request =
            ApiRequest::post(format!("/admin/{}/bulk-delete/", self.name)).json(&body)?;
        let response: MessageResponse = self.dispatcher.send_json(request).await?;
        info!(resource = self.name, count = ids.len(), "Bulk deleted");
        Ok(response)
    }
}

pub struct AdminUsersApi<'a> {
    resource: Resource<'a>,
}

impl AdminUsersApi<'_> {
    pub async fn list(&self, filter: &UserFilter) -> Result<Paginated<AdminUser>> {
        self.resource.list(filter.query()).await
    }

    pub async fn get(&self, id: Id) -> Result<AdminUserDetail> {
        self.resource.get(id).await
    }

    pub async fn update(&self, id: Id, update: &UserUpdate) -> Result<AdminUserDetail> {
        if update.is_empty() {
            return Err(ClientError::validation("nothing to update"));
        }
        self.resource.update(id, update).await
    }

    /// The backend refuses to delete the caller's own account.
    pub async fn delete(&self, id: Id) -> Result<()> {
        self.resource.delete(id).await
    }

    pub async fn bulk_delete(&self, ids: &[Id]) -> Result<MessageResponse> {
        self.resource.bulk_delete(ids).await
    }
}

pub struct AdminPollsApi<'a> {
    resource: Resource<'a>,
}

impl AdminPollsApi<'_> {
    pub async fn list(&self, filter: &PollFilter) -> Result<Paginated<AdminPoll>> {
        self.resource.list(filter.query()).await
    }

    pub async fn get(&self, id: Id) -> Result<AdminPollDetail> {
        self.resource.get(id).await
    }

    pub async fn update(&self, id: Id, update: &PollUpdate) -> Result<AdminPollDetail> {
        self.resource.update(id, update).await
    }

    pub async fn delete(&self, id: Id) -> Result<()> {
        self.resource.delete(id).await
    }

    pub async fn bulk_delete(&self, ids: &[Id]) -> Result<MessageResponse> {
        self.resource.bulk_delete(ids).await
    }

    /// Flip a poll between active and inactive.
    pub async fn toggle_active(&self, id: Id) -> Result<ToggleActiveResponse> {
        self.resource
            .dispatcher
            .send_json(ApiRequest::post(format!("/admin/polls/{id}/toggle-active/")))
            .await
    }
}

pub struct AdminBannersApi<'a> {
    resource: Resource<'a>,
}

impl AdminBannersApi<'_> {
    pub async fn list(&self, filter: &BannerFilter) -> Result<Paginated<AdminBanner>> {
        self.resource.list(filter.query()).await
    }

    pub async fn get(&self, id: Id) -> Result<AdminBannerDetail> {
        self.resource.get(id).await
    }

    pub async fn update(&self, id: Id, update: &BannerUpdate) -> Result<AdminBannerDetail> {
        self.resource.update(id, update).await
    }

    pub async fn delete(&self, id: Id) -> Result<()> {
        self.resource.delete(id).await
    }

    pub async fn bulk_delete(&self, ids: &[Id]) -> Result<MessageResponse> {
        self.resource.bulk_delete(ids).await
    }
}

/// Votes can be listed and removed, not edited.
pub struct AdminVotesApi<'a> {
    resource: Resource<'a>,
}

impl AdminVotesApi<'_> {
    pub async fn list(&self, filter: &VoteFilter) -> Result<Paginated<AdminVote>> {
        self.resource.list(filter.query()).await
    }

    pub async fn delete(&self, id: Id) -> Result<()> {
        self.resource.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use reqwest::Method;

    use super::*;
    use crate::config::ClientConfig;
    use crate::models::{Page, Role};
    use crate::session::Session;
    use crate::test_utils::{ScriptedTransport, empty_response, json_response};

    fn setup() -> (Arc<ScriptedTransport>, Dispatcher) {
        let session = Arc::new(Session::in_memory());
        session.save("admin-tok", "admin-ref").unwrap();
        let transport = Arc::new(ScriptedTransport::new());
        let dispatcher =
            Dispatcher::new(Arc::new(ClientConfig::default()), session, transport.clone());
        (transport, dispatcher)
    }

    #[tokio::test]
    async fn test_bulk_delete_is_one_call() {
        let (transport, dispatcher) = setup();
        transport.respond(json_response(
            200,
            serde_json::json!({"message": "3 polls deleted successfully"}),
        ));

        let response = AdminApi::new(&dispatcher)
            .polls()
            .bulk_delete(&[4, 8, 15])
            .await
            .unwrap();
        assert_eq!(response.message, "3 polls deleted successfully");

        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, Method::POST);
        assert_eq!(sent[0].path, "/admin/polls/bulk-delete/");
        assert_eq!(sent[0].json_body(), Some(serde_json::json!({"ids": [4, 8, 15]})));
    }

    #[tokio::test]
    async fn test_bulk_delete_requires_ids() {
        let (transport, dispatcher) = setup();
        let err = AdminApi::new(&dispatcher)
            .users()
            .bulk_delete(&[])
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_delete_accepts_204_with_body() {
        let (transport, dispatcher) = setup();
        transport.respond(json_response(204, serde_json::json!({"message": "Deleted"})));
        transport.respond(empty_response(204));

        let admin = AdminApi::new(&dispatcher);
        admin.banners().delete(3).await.unwrap();
        admin.votes().delete(12).await.unwrap();

        let sent = transport.requests();
        assert_eq!(sent[0].method, Method::DELETE);
        assert_eq!(sent[0].path, "/admin/banners/3/");
        assert_eq!(sent[1].path, "/admin/votes/12/");
    }

    #[tokio::test]
    async fn test_self_delete_surfaces_forbidden() {
        let (transport, dispatcher) = setup();
        transport.respond(json_response(
            403,
            serde_json::json!({"error": "Cannot delete your own account"}),
        ));

        let err = AdminApi::new(&dispatcher).users().delete(1).await.unwrap_err();
        assert_eq!(err.status(), Some(reqwest::StatusCode::FORBIDDEN));
        assert_eq!(err.server_message(), "Cannot delete your own account");
    }

    #[tokio::test]
    async fn test_user_list_passes_filters() {
        let (transport, dispatcher) = setup();
        transport.respond(json_response(
            200,
            serde_json::json!({
                "count": 1,
                "next": null,
                "previous": null,
                "results": [{
                    "id": 2,
                    "username": "bob",
                    "email": "b@example.com",
                    "role": "user",
                    "is_active": true,
                    "date_joined": "2026-01-05T10:00:00Z",
                    "last_login": null
                }]
            }),
        ));

        let filter = UserFilter {
            search: Some("bob".into()),
            role: Some(Role::User),
            page: Page::new(1, 10),
            ..Default::default()
        };
        let page = AdminApi::new(&dispatcher).users().list(&filter).await.unwrap();
        assert_eq!(page.count, 1);
        assert!(!page.has_next());
        assert_eq!(page.results[0].username, "bob");

        let sent = &transport.requests()[0];
        assert_eq!(sent.path, "/admin/users/");
        assert!(sent.query.contains(&("search".to_string(), "bob".to_string())));
        assert!(sent.query.contains(&("role".to_string(), "user".to_string())));
        assert!(sent.query.contains(&("page_size".to_string(), "10".to_string())));
    }

    #[tokio::test]
    async fn test_update_role_uses_put() {
        let (transport, dispatcher) = setup();
        transport.respond(json_response(
            200,
            serde_json::json!({
                "id": 2,
                "username": "bob",
                "email": "b@example.com",
                "role": "admin",
                "is_active": true,
                "date_joined": "2026-01-05T10:00:00Z",
                "last_login": null
            }),
        ));

        let update = UserUpdate {
            role: Some(Role::Admin),
            ..Default::default()
        };
        let user = AdminApi::new(&dispatcher).users().update(2, &update).await.unwrap();
        assert_eq!(user.role, Role::Admin);

        let sent = &transport.requests()[0];
        assert_eq!(sent.method, Method::PUT);
        assert_eq!(sent.path, "/admin/users/2/");
        assert_eq!(sent.json_body(), Some(serde_json::json!({"role": "admin"})));
    }

    #[tokio::test]
    async fn test_empty_user_update_rejected() {
        let (transport, dispatcher) = setup();
        let err = AdminApi::new(&dispatcher)
            .users()
            .update(2, &UserUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_active() {
        let (transport, dispatcher) = setup();
        transport.respond(json_response(
            200,
            serde_json::json!({"message": "Poll deactivated", "active": false}),
        ));

        let toggled = AdminApi::new(&dispatcher).polls().toggle_active(5).await.unwrap();
        assert!(!toggled.active);
        assert_eq!(transport.requests()[0].path, "/admin/polls/5/toggle-active/");
    }

    #[tokio::test]
    async fn test_stats() {
        let (transport, dispatcher) = setup();
        transport.respond(json_response(
            200,
            serde_json::json!({
                "total_users": 10, "admin_users": 2, "regular_users": 8,
                "total_polls": 4, "active_polls": 3, "inactive_polls": 1,
                "total_votes": 30, "total_banners": 1
            }),
        ));

        let stats = AdminApi::new(&dispatcher).stats().await.unwrap();
        assert_eq!(stats.regular_users, 8);
        assert_eq!(transport.requests()[0].path, "/admin/stats/");
    }
}
