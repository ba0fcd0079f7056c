use anyhow::Result;
use tracing::info;
use votenow_client::models::{LoginRequest, RegisterRequest, Role};

use super::{Context, password_or_prompt};
use crate::output;

pub async fn register(
    ctx: &Context,
    username: String,
    email: String,
    password: Option<String>,
    role: Option<Role>,
) -> Result<()> {
    let password = password_or_prompt(password)?;
    let mut request = RegisterRequest::new(username, email, password);
    if let Some(role) = role {
        request = request.with_role(role);
    }

    let user = ctx.client.users().register(&request).await?;
    info!(username = %user.username, "Account created");
    ctx.out.emit(&user, output::user)
}

pub async fn login(ctx: &Context, username: String, password: Option<String>) -> Result<()> {
    let password = password_or_prompt(password)?;
    let user = ctx
        .client
        .users()
        .login(&LoginRequest::new(username, password))
        .await?;
    ctx.out.emit(&user, output::user)
}

pub fn logout(ctx: &Context) -> Result<()> {
    ctx.client.users().logout()?;
    ctx.out.success("Logged out")
}

pub async fn whoami(ctx: &Context, refresh: bool) -> Result<()> {
    ctx.require_login()?;

    let user = if refresh {
        Some(ctx.client.users().profile().await?)
    } else {
        ctx.client.session().cached_user()
    };

    match user {
        Some(user) => ctx.out.emit(&user, output::user),
        None => ctx
            .out
            .success("Logged in, but no profile cached; run `votenow whoami --refresh`"),
    }
}
