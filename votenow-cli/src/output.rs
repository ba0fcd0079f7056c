use std::borrow::Cow;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, Utc};
#[cfg(feature = "colored-output")]
use colored::*;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};
use votenow_client::models::{
    AdminBanner, AdminBannerDetail, AdminPoll, AdminPollDetail, AdminStats, AdminSummary,
    AdminUser, AdminUserDetail, AdminVote, Banner, Paginated, Poll, PollResults, PollStats, User,
};

use crate::cli::OutputFormat;

pub struct OutputManager {
    format: OutputFormat,
    colored: bool,
}

impl OutputManager {
    pub fn new(format: OutputFormat, colored: bool) -> Self {
        Self { format, colored }
    }

    /// Print `value` as JSON, or as the table produced by `render`.
    pub fn emit<T, F>(&self, value: &T, render: F) -> Result<()>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&T) -> String,
    {
        let content = match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(value)?,
            OutputFormat::Table => render(value),
        };
        write_line(&content)
    }

    /// Confirmation for commands without a result body.
    pub fn success(&self, message: &str) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                let body = serde_json::json!({"status": "ok", "message": message});
                write_line(&serde_json::to_string_pretty(&body)?)
            }
            OutputFormat::Table => {
                write_line(&format!("{} {message}", self.colorize("✓", Color::Green, true)))
            }
        }
    }

    /// Out-of-band notice on stderr, e.g. an expired session.
    pub fn notice(&self, message: &str) {
        eprintln!("{} {message}", self.colorize("!", Color::Yellow, true));
    }

    pub fn error(&self, message: &str) {
        match self.format {
            OutputFormat::Json => {
                let body = serde_json::json!({"status": "error", "message": message});
                println!("{body}");
            }
            OutputFormat::Table => {
                eprintln!("{} {message}", self.colorize("Error:", Color::Red, true));
            }
        }
    }

    fn colorize(&self, text: &str, color: Color, bold: bool) -> String {
        #[cfg(feature = "colored-output")]
        {
            if self.colored {
                let colored_text = match color {
                    Color::Green => text.green(),
                    Color::Yellow => text.yellow(),
                    Color::Red => text.red(),
                };
                return if bold {
                    colored_text.bold().to_string()
                } else {
                    colored_text.to_string()
                };
            }
        }

        #[cfg(not(feature = "colored-output"))]
        let _ = (color, bold, self.colored);

        text.to_string()
    }
}

#[cfg_attr(not(feature = "colored-output"), allow(dead_code))]
#[derive(Clone, Copy)]
enum Color {
    Green,
    Yellow,
    Red,
}

fn write_line(content: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{content}")?;
    stdout.flush()?;
    Ok(())
}

fn table<R: Tabled>(rows: impl IntoIterator<Item = R>) -> String {
    Table::new(rows).with(Style::modern()).to_string()
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

fn or_dash(value: Option<&str>) -> Cow<'_, str> {
    match value {
        Some(v) if !v.is_empty() => Cow::Borrowed(v),
        _ => Cow::Borrowed("-"),
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

#[derive(Tabled)]
struct PropertyRow<'a> {
    property: &'a str,
    value: Cow<'a, str>,
}

fn properties<'a>(rows: Vec<(&'a str, Cow<'a, str>)>) -> String {
    table(
        rows.into_iter()
            .map(|(property, value)| PropertyRow { property, value }),
    )
}

fn page_footer<T>(page: &Paginated<T>) -> String {
    let mut footer = format!("{} of {} shown", page.results.len(), page.count);
    if page.has_next() {
        footer.push_str(" (more with --page)");
    }
    footer
}

pub fn user(user: &User) -> String {
    properties(vec![
        ("ID", Cow::Owned(user.id.to_string())),
        ("Username", Cow::Borrowed(user.username.as_str())),
        ("Email", Cow::Borrowed(user.email.as_str())),
        ("Role", Cow::Borrowed(user.role.as_str())),
    ])
}

pub fn polls(polls: &[Poll]) -> String {
    #[derive(Tabled)]
    struct Row<'a> {
        #[tabled(rename = "ID")]
        id: u64,
        #[tabled(rename = "Title")]
        title: &'a str,
        #[tabled(rename = "Category")]
        category: Cow<'a, str>,
        #[tabled(rename = "Options")]
        options: usize,
        #[tabled(rename = "Votes")]
        votes: u64,
        #[tabled(rename = "Active")]
        active: &'static str,
        #[tabled(rename = "Voted")]
        voted: &'static str,
    }

    if polls.is_empty() {
        return "No polls.".to_string();
    }
    table(polls.iter().map(|p| Row {
        id: p.id,
        title: &p.title,
        category: or_dash(Some(p.category.as_str())),
        options: p.options.len(),
        votes: p.total_votes,
        active: yes_no(p.active),
        voted: yes_no(p.user_voted),
    }))
}

pub fn poll(poll: &Poll) -> String {
    #[derive(Tabled)]
    struct OptionRow<'a> {
        #[tabled(rename = "ID")]
        id: u64,
        #[tabled(rename = "Option")]
        text: &'a str,
        #[tabled(rename = "Winner")]
        winner: &'static str,
    }

    let header = properties(vec![
        ("ID", Cow::Owned(poll.id.to_string())),
        ("Title", Cow::Borrowed(poll.title.as_str())),
        ("Description", or_dash(Some(poll.description.as_str()))),
        ("Category", or_dash(Some(poll.category.as_str()))),
        ("Created", Cow::Owned(timestamp(&poll.created_at))),
        ("Active", Cow::Borrowed(yes_no(poll.active))),
        ("Total votes", Cow::Owned(poll.total_votes.to_string())),
    ]);
    let options = table(poll.options.iter().map(|o| OptionRow {
        id: o.id,
        text: &o.option_text,
        winner: if poll.winner == Some(o.id) { "★" } else { "" },
    }));
    format!("{header}\n{options}")
}

pub fn results(results: &PollResults) -> String {
    #[derive(Tabled)]
    struct Row<'a> {
        #[tabled(rename = "Option")]
        text: &'a str,
        #[tabled(rename = "Votes")]
        votes: u64,
        #[tabled(rename = "Share")]
        share: String,
    }

    let total = results.total_votes();
    let rows = table(results.options.iter().map(|o| Row {
        text: &o.option_text,
        votes: o.votes_count,
        share: percent(o.votes_count, total),
    }));
    let leader = results
        .leader()
        .map_or_else(|| "no votes yet".to_string(), |o| format!("leading: {}", o.option_text));
    format!("{}\n{rows}\n{total} votes, {leader}", results.poll)
}

fn percent(part: u64, total: u64) -> String {
    if total == 0 {
        return "0.0%".to_string();
    }
    format!("{:.1}%", part as f64 * 100.0 / total as f64)
}

pub fn banners(banners: &[Banner]) -> String {
    #[derive(Tabled)]
    struct Row<'a> {
        #[tabled(rename = "ID")]
        id: u64,
        #[tabled(rename = "Poll")]
        poll: u64,
        #[tabled(rename = "Title")]
        title: &'a str,
        #[tabled(rename = "Image")]
        image: Cow<'a, str>,
        #[tabled(rename = "Created")]
        created: String,
    }

    if banners.is_empty() {
        return "No banners.".to_string();
    }
    table(banners.iter().map(|b| Row {
        id: b.id,
        poll: b.poll,
        title: &b.title,
        image: or_dash(b.image.as_deref()),
        created: timestamp(&b.created_at),
    }))
}

pub fn banner(banner: &Banner) -> String {
    properties(vec![
        ("ID", Cow::Owned(banner.id.to_string())),
        ("Poll", Cow::Owned(banner.poll.to_string())),
        ("Title", Cow::Borrowed(banner.title.as_str())),
        ("Image", or_dash(banner.image.as_deref())),
    ])
}

pub fn admin_stats(stats: &AdminStats) -> String {
    properties(vec![
        ("Users", Cow::Owned(stats.total_users.to_string())),
        ("Admins", Cow::Owned(stats.admin_users.to_string())),
        ("Regular users", Cow::Owned(stats.regular_users.to_string())),
        ("Polls", Cow::Owned(stats.total_polls.to_string())),
        ("Active polls", Cow::Owned(stats.active_polls.to_string())),
        ("Inactive polls", Cow::Owned(stats.inactive_polls.to_string())),
        ("Votes", Cow::Owned(stats.total_votes.to_string())),
        ("Banners", Cow::Owned(stats.total_banners.to_string())),
    ])
}

pub fn admin_users(page: &Paginated<AdminUser>) -> String {
    #[derive(Tabled)]
    struct Row<'a> {
        #[tabled(rename = "ID")]
        id: u64,
        #[tabled(rename = "Username")]
        username: &'a str,
        #[tabled(rename = "Email")]
        email: &'a str,
        #[tabled(rename = "Role")]
        role: &'static str,
        #[tabled(rename = "Active")]
        active: &'static str,
        #[tabled(rename = "Votes")]
        votes: u64,
        #[tabled(rename = "Joined")]
        joined: String,
    }

    let rows = table(page.results.iter().map(|u| Row {
        id: u.id,
        username: &u.username,
        email: &u.email,
        role: u.role.as_str(),
        active: yes_no(u.is_active),
        votes: u.total_votes,
        joined: timestamp(&u.date_joined),
    }));
    format!("{rows}\n{}", page_footer(page))
}

pub fn admin_user(user: &AdminUserDetail) -> String {
    properties(vec![
        ("ID", Cow::Owned(user.id.to_string())),
        ("Username", Cow::Borrowed(user.username.as_str())),
        ("Email", Cow::Borrowed(user.email.as_str())),
        ("Name", Cow::Owned(format!("{} {}", user.first_name, user.last_name).trim().to_string())),
        ("Role", Cow::Borrowed(user.role.as_str())),
        ("Active", Cow::Borrowed(yes_no(user.is_active))),
        ("Joined", Cow::Owned(timestamp(&user.date_joined))),
        (
            "Last login",
            Cow::Owned(user.last_login.as_ref().map_or_else(|| "-".to_string(), timestamp)),
        ),
    ])
}

pub fn admin_polls(page: &Paginated<AdminPoll>) -> String {
    #[derive(Tabled)]
    struct Row<'a> {
        #[tabled(rename = "ID")]
        id: u64,
        #[tabled(rename = "Title")]
        title: &'a str,
        #[tabled(rename = "Category")]
        category: Cow<'a, str>,
        #[tabled(rename = "Active")]
        active: &'static str,
        #[tabled(rename = "Creator")]
        creator: Cow<'a, str>,
        #[tabled(rename = "Options")]
        options: u64,
        #[tabled(rename = "Votes")]
        votes: u64,
    }

    let rows = table(page.results.iter().map(|p| Row {
        id: p.id,
        title: &p.title,
        category: or_dash(Some(p.category.as_str())),
        active: yes_no(p.active),
        creator: or_dash(p.created_by_username.as_deref()),
        options: p.options_count,
        votes: p.total_votes,
    }));
    format!("{rows}\n{}", page_footer(page))
}

pub fn admin_poll(poll: &AdminPollDetail) -> String {
    #[derive(Tabled)]
    struct OptionRow<'a> {
        #[tabled(rename = "ID")]
        id: u64,
        #[tabled(rename = "Option")]
        text: &'a str,
        #[tabled(rename = "Votes")]
        votes: u64,
    }

    let header = properties(vec![
        ("ID", Cow::Owned(poll.id.to_string())),
        ("Title", Cow::Borrowed(poll.title.as_str())),
        ("Category", or_dash(Some(poll.category.as_str()))),
        ("Active", Cow::Borrowed(yes_no(poll.active))),
        ("Creator", or_dash(poll.created_by_username.as_deref())),
        ("Winner", or_dash(poll.winner_text.as_deref())),
        ("Total votes", Cow::Owned(poll.total_votes.to_string())),
    ]);
    let options = table(poll.options.iter().map(|o| OptionRow {
        id: o.id,
        text: &o.option_text,
        votes: o.votes_count,
    }));
    format!("{header}\n{options}")
}

pub fn admin_banners(page: &Paginated<AdminBanner>) -> String {
    #[derive(Tabled)]
    struct Row<'a> {
        #[tabled(rename = "ID")]
        id: u64,
        #[tabled(rename = "Title")]
        title: &'a str,
        #[tabled(rename = "Poll")]
        poll: Cow<'a, str>,
        #[tabled(rename = "Poll active")]
        poll_active: &'static str,
        #[tabled(rename = "Created")]
        created: String,
    }

    let rows = table(page.results.iter().map(|b| Row {
        id: b.id,
        title: &b.title,
        poll: or_dash(b.poll_title.as_deref()),
        poll_active: yes_no(b.poll_active),
        created: timestamp(&b.created_at),
    }));
    format!("{rows}\n{}", page_footer(page))
}

pub fn admin_banner(banner: &AdminBannerDetail) -> String {
    properties(vec![
        ("ID", Cow::Owned(banner.id.to_string())),
        ("Title", Cow::Borrowed(banner.title.as_str())),
        ("Poll", Cow::Owned(banner.poll.to_string())),
        ("Poll title", or_dash(banner.poll_title.as_deref())),
        ("Image", or_dash(banner.image.as_deref())),
        ("Created", Cow::Owned(timestamp(&banner.created_at))),
    ])
}

pub fn admin_votes(page: &Paginated<AdminVote>) -> String {
    #[derive(Tabled)]
    struct Row<'a> {
        #[tabled(rename = "ID")]
        id: u64,
        #[tabled(rename = "Poll")]
        poll: Cow<'a, str>,
        #[tabled(rename = "Option")]
        option: Cow<'a, str>,
        #[tabled(rename = "Voter")]
        voter: Cow<'a, str>,
        #[tabled(rename = "When")]
        when: String,
    }

    let rows = table(page.results.iter().map(|v| Row {
        id: v.id,
        poll: or_dash(v.poll_title.as_deref()),
        option: or_dash(v.option_text.as_deref()),
        voter: or_dash(v.voter_username.as_deref()),
        when: timestamp(&v.voted_at),
    }));
    format!("{rows}\n{}", page_footer(page))
}

pub fn admin_summary(summary: &AdminSummary) -> String {
    #[derive(Tabled)]
    struct Row<'a> {
        #[tabled(rename = "Poll")]
        id: u64,
        #[tabled(rename = "Title")]
        title: &'a str,
        #[tabled(rename = "Votes")]
        votes: u64,
    }

    let header = properties(vec![
        ("Users", Cow::Owned(summary.total_users.to_string())),
        ("Polls", Cow::Owned(summary.total_polls.to_string())),
        ("Active polls", Cow::Owned(summary.active_polls.to_string())),
        (
            "Votes (7 days)",
            Cow::Owned(
                summary
                    .votes_last_7_days
                    .iter()
                    .map(u64::to_string)
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
        ),
    ]);
    let top = table(summary.top_polls.iter().map(|p| Row {
        id: p.poll_id,
        title: &p.title,
        votes: p.total_votes,
    }));
    format!("{header}\nTop polls\n{top}")
}

pub fn poll_stats(stats: &PollStats) -> String {
    #[derive(Tabled)]
    struct Row<'a> {
        #[tabled(rename = "ID")]
        id: u64,
        #[tabled(rename = "Option")]
        text: &'a str,
        #[tabled(rename = "Votes")]
        votes: u64,
        #[tabled(rename = "Share")]
        share: String,
    }

    let rows = table(stats.options.iter().map(|o| Row {
        id: o.option_id,
        text: &o.option_text,
        votes: o.votes_count,
        share: percent(o.votes_count, stats.total_votes),
    }));
    let prediction = match &stats.predicted_winner {
        Some(winner) if winner.reason.is_empty() => format!("Predicted winner: {}", winner.option_text),
        Some(winner) => format!("Predicted winner: {} ({})", winner.option_text, winner.reason),
        None => "No prediction yet".to_string(),
    };
    format!(
        "{} ({} votes)\n{rows}\n{prediction}",
        stats.poll_title, stats.total_votes
    )
}
