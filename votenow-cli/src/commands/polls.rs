use anyhow::Result;
use votenow_client::models::NewPoll;

use super::Context;
use crate::cli::PollCommand;
use crate::output;

pub async fn run(ctx: &Context, command: PollCommand) -> Result<()> {
    let polls = ctx.client.polls();

    match command {
        PollCommand::List { all } => {
            let list = if all {
                ctx.require_login()?;
                polls.list_all().await?
            } else {
                polls.list().await?
            };
            ctx.out.emit(list.as_slice(), output::polls)
        }
        PollCommand::Show { id } => ctx.out.emit(&polls.get(id).await?, output::poll),
        PollCommand::Create {
            title,
            description,
            category,
            options,
        } => {
            ctx.require_login()?;
            let poll = NewPoll::new(title)
                .with_description(description)
                .with_category(category)
                .with_options(options);
            ctx.out.emit(&polls.create(&poll).await?, output::poll)
        }
        PollCommand::AddOption { poll, text } => {
            ctx.require_login()?;
            let option = polls.add_option(poll, &text).await?;
            ctx.out.emit(&option, |o| {
                format!("Added option {} \"{}\" to poll {poll}", o.id, o.option_text)
            })
        }
        PollCommand::Vote { poll, option } => {
            ctx.require_login()?;
            let vote = polls.vote(poll, option).await?;
            ctx.out.emit(&vote, |v| {
                format!("Vote {} recorded for option {} on poll {}", v.id, v.option, v.poll)
            })
        }
        PollCommand::Results { id } => ctx.out.emit(&polls.results(id).await?, output::results),
    }
}
