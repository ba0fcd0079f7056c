use anyhow::Result;
use votenow_client::models::{
    BannerFilter, MessageResponse, Page, PollFilter, UserFilter, UserUpdate, VoteFilter,
};

use super::{Context, confirm_delete};
use crate::cli::{
    AdminBannerCommand, AdminCommand, AdminPollCommand, AdminUserCommand, AdminVoteCommand,
    BulkDeleteArgs, PageArgs,
};
use crate::output;

impl From<PageArgs> for Page {
    fn from(args: PageArgs) -> Self {
        Page {
            page: args.page,
            page_size: args.page_size,
        }
    }
}

pub async fn run(ctx: &Context, command: AdminCommand) -> Result<()> {
    ctx.require_login()?;
    if !ctx.client.session().is_admin() {
        // The server has the final say; this only saves a round trip.
        ctx.out
            .notice("cached profile is not an admin; the server will likely refuse");
    }

    match command {
        AdminCommand::Stats => ctx.out.emit(&ctx.client.admin().stats().await?, output::admin_stats),
        AdminCommand::Users(command) => users(ctx, command).await,
        AdminCommand::Polls(command) => polls(ctx, command).await,
        AdminCommand::Banners(command) => banners(ctx, command).await,
        AdminCommand::Votes(command) => votes(ctx, command).await,
    }
}

async fn users(ctx: &Context, command: AdminUserCommand) -> Result<()> {
    let admin = ctx.client.admin();
    let users = admin.users();

    match command {
        AdminUserCommand::List {
            search,
            role,
            active,
            page,
        } => {
            let filter = UserFilter {
                search,
                role,
                is_active: active,
                page: page.into(),
            };
            ctx.out.emit(&users.list(&filter).await?, output::admin_users)
        }
        AdminUserCommand::Show { id } => ctx.out.emit(&users.get(id).await?, output::admin_user),
        AdminUserCommand::Delete { id } => {
            users.delete(id).await?;
            ctx.out.success(&format!("User {id} deleted"))
        }
        AdminUserCommand::BulkDelete(args) => {
            bulk(ctx, "users", args, |ids| async move { users.bulk_delete(&ids).await }).await
        }
        AdminUserCommand::UpdateRole { id, role } => {
            let update = UserUpdate {
                role: Some(role),
                ..Default::default()
            };
            ctx.out.emit(&users.update(id, &update).await?, output::admin_user)
        }
    }
}

async fn polls(ctx: &Context, command: AdminPollCommand) -> Result<()> {
    let admin = ctx.client.admin();
    let polls = admin.polls();

    match command {
        AdminPollCommand::List {
            search,
            category,
            active,
            page,
        } => {
            let filter = PollFilter {
                search,
                category,
                active,
                page: page.into(),
            };
            ctx.out.emit(&polls.list(&filter).await?, output::admin_polls)
        }
        AdminPollCommand::Show { id } => ctx.out.emit(&polls.get(id).await?, output::admin_poll),
        AdminPollCommand::Delete { id } => {
            polls.delete(id).await?;
            ctx.out.success(&format!("Poll {id} deleted"))
        }
        AdminPollCommand::BulkDelete(args) => {
            bulk(ctx, "polls", args, |ids| async move { polls.bulk_delete(&ids).await }).await
        }
        AdminPollCommand::ToggleActive { id } => {
            let toggled = polls.toggle_active(id).await?;
            ctx.out.emit(&toggled, |t| t.message.clone())
        }
    }
}

async fn banners(ctx: &Context, command: AdminBannerCommand) -> Result<()> {
    let admin = ctx.client.admin();
    let banners = admin.banners();

    match command {
        AdminBannerCommand::List { search, page } => {
            let filter = BannerFilter {
                search,
                page: page.into(),
            };
            ctx.out.emit(&banners.list(&filter).await?, output::admin_banners)
        }
        AdminBannerCommand::Show { id } => {
            ctx.out.emit(&banners.get(id).await?, output::admin_banner)
        }
        AdminBannerCommand::Delete { id } => {
            banners.delete(id).await?;
            ctx.out.success(&format!("Banner {id} deleted"))
        }
        AdminBannerCommand::BulkDelete(args) => {
            bulk(ctx, "banners", args, |ids| async move { banners.bulk_delete(&ids).await }).await
        }
    }
}

async fn votes(ctx: &Context, command: AdminVoteCommand) -> Result<()> {
    let admin = ctx.client.admin();
    let votes = admin.votes();

    match command {
        AdminVoteCommand::List { poll, user, page } => {
            let filter = VoteFilter {
                poll_id: poll,
                user_id: user,
                page: page.into(),
            };
            ctx.out.emit(&votes.list(&filter).await?, output::admin_votes)
        }
        AdminVoteCommand::Delete { id } => {
            votes.delete(id).await?;
            ctx.out.success(&format!("Vote {id} deleted"))
        }
    }
}

async fn bulk<F, Fut>(ctx: &Context, what: &str, args: BulkDeleteArgs, delete: F) -> Result<()>
where
    F: FnOnce(Vec<u64>) -> Fut,
    Fut: Future<Output = votenow_client::Result<MessageResponse>>,
{
    if !confirm_delete(what, args.ids.len(), args.yes)? {
        return ctx.out.success("Nothing deleted");
    }
    let response = delete(args.ids).await?;
    ctx.out.success(&response.message)
}
