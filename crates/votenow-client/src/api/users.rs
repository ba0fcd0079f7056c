use tracing::info;

use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::models::{LoginRequest, LoginResponse, RegisterRequest, User};
use crate::request::ApiRequest;
use crate::session::{Credential, SessionEvent};

/// Account operations under `/users/`.
pub struct UsersApi<'a> {
    dispatcher: &'a Dispatcher,
}

impl<'a> UsersApi<'a> {
    pub(crate) fn new(dispatcher: &'a Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, request: &RegisterRequest) -> Result<User> {
        let request = ApiRequest::post("/users/register/").json(request)?;
        self.dispatcher.send_json(request).await
    }

    /// Exchange credentials for a token pair and store it with the user.
    pub async fn login(&self, request: &LoginRequest) -> Result<User> {
        let request = ApiRequest::post("/users/login/").json(request)?;
        let LoginResponse {
            access,
            refresh,
            user,
        } = self.dispatcher.send_json(request).await?;

        let session = self.dispatcher.session();
        session.establish(Credential::new(access, refresh), &user)?;
        info!(username = %user.username, role = %user.role, "Logged in");
        session.notify(SessionEvent::LoggedIn {
            username: user.username.clone(),
        });
        Ok(user)
    }

    /// Forget the local session. The backend keeps no server-side state to
    /// revoke.
    pub fn logout(&self) -> Result<()> {
        let session = self.dispatcher.session();
        session.clear()?;
        info!("Logged out");
        session.notify(SessionEvent::LoggedOut);
        Ok(())
    }

    /// Fetch the current user and refresh the cached copy.
    pub async fn profile(&self) -> Result<User> {
        let user: User = self
            .dispatcher
            .send_json(ApiRequest::get("/users/profile/"))
            .await?;
        self.dispatcher.session().cache_user(&user)?;
        Ok(user)
    }
}
