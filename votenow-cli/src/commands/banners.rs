use anyhow::Result;
use votenow_client::models::{ImageUpload, NewBanner};

use super::Context;
use crate::cli::BannerCommand;
use crate::output;

pub async fn run(ctx: &Context, command: BannerCommand) -> Result<()> {
    let banners = ctx.client.banners();

    match command {
        BannerCommand::List => ctx.out.emit(banners.list().await?.as_slice(), output::banners),
        BannerCommand::Create { poll, title, image } => {
            ctx.require_login()?;
            let image = ImageUpload::from_path(&image).await?;
            let banner = banners.create(&NewBanner::new(poll, title, image)).await?;
            ctx.out.emit(&banner, output::banner)
        }
    }
}
