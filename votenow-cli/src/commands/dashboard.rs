use anyhow::Result;

use super::Context;
use crate::cli::DashboardCommand;
use crate::output;

pub async fn run(ctx: &Context, command: DashboardCommand) -> Result<()> {
    ctx.require_login()?;
    let dashboard = ctx.client.dashboard();

    match command {
        DashboardCommand::Summary => {
            ctx.out
                .emit(&dashboard.admin_summary().await?, output::admin_summary)
        }
        DashboardCommand::PollStats { id } => {
            ctx.out.emit(&dashboard.poll_stats(id).await?, output::poll_stats)
        }
    }
}
