use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use votenow_client::models::{Id, Role};

#[derive(Parser)]
#[command(name = "votenow")]
#[command(about = "VoteNow - create polls, vote and manage results from the terminal")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// API base URL, e.g. https://votenow.example.com/api
    #[arg(long, global = true, env = "VOTENOW_API_BASE_URL")]
    pub base_url: Option<String>,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// File the login session is kept in
    #[arg(long, global = true, env = "VOTENOW_SESSION_FILE")]
    pub session_file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "table")]
    pub output: OutputFormat,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        email: String,

        /// Password (prompted when omitted)
        #[arg(long, env = "VOTENOW_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Requested role
        #[arg(long)]
        role: Option<Role>,
    },

    /// Log in and store the session
    Login {
        #[arg(short, long)]
        username: String,

        /// Password (prompted when omitted)
        #[arg(long, env = "VOTENOW_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget the stored session
    Logout,

    /// Show the logged-in user
    Whoami {
        /// Ask the server instead of using the cached profile
        #[arg(long)]
        refresh: bool,
    },

    /// Browse, create and vote on polls
    #[command(subcommand)]
    Polls(PollCommand),

    /// Winner banners
    #[command(subcommand)]
    Banners(BannerCommand),

    /// Administration (admin accounts only)
    #[command(subcommand)]
    Admin(AdminCommand),

    /// Aggregated statistics
    #[command(subcommand)]
    Dashboard(DashboardCommand),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum PollCommand {
    /// List active polls
    List {
        /// Include inactive polls (admin)
        #[arg(long)]
        all: bool,
    },

    /// Show a poll and its options
    Show { id: Id },

    /// Create a poll
    Create {
        #[arg(short, long)]
        title: String,

        #[arg(short, long, default_value = "")]
        description: String,

        #[arg(long, default_value = "")]
        category: String,

        /// Option text; repeat for each option (at least two)
        #[arg(short = 'O', long = "option", required = true)]
        options: Vec<String>,
    },

    /// Add an option to an existing poll
    AddOption { poll: Id, text: String },

    /// Vote for an option
    Vote { poll: Id, option: Id },

    /// Show vote tallies
    Results { id: Id },
}

#[derive(Subcommand)]
pub enum BannerCommand {
    /// List published banners
    List,

    /// Publish a banner with an image
    Create {
        #[arg(long)]
        poll: Id,

        #[arg(short, long)]
        title: String,

        /// Image file to upload
        #[arg(short, long)]
        image: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum AdminCommand {
    /// Site-wide counters
    Stats,

    #[command(subcommand)]
    Users(AdminUserCommand),

    #[command(subcommand)]
    Polls(AdminPollCommand),

    #[command(subcommand)]
    Banners(AdminBannerCommand),

    #[command(subcommand)]
    Votes(AdminVoteCommand),
}

#[derive(ClapArgs, Debug, Clone, Copy)]
pub struct PageArgs {
    #[arg(long)]
    pub page: Option<u32>,

    #[arg(long)]
    pub page_size: Option<u32>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct BulkDeleteArgs {
    /// Identifiers to delete
    #[arg(required = true, num_args = 1..)]
    pub ids: Vec<Id>,

    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Subcommand)]
pub enum AdminUserCommand {
    List {
        #[arg(short, long)]
        search: Option<String>,

        #[arg(long)]
        role: Option<Role>,

        #[arg(long)]
        active: Option<bool>,

        #[command(flatten)]
        page: PageArgs,
    },
    Show {
        id: Id,
    },
    Delete {
        id: Id,
    },
    BulkDelete(BulkDeleteArgs),
    /// Change a user's role
    UpdateRole {
        id: Id,
        role: Role,
    },
}

#[derive(Subcommand)]
pub enum AdminPollCommand {
    List {
        #[arg(short, long)]
        search: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        active: Option<bool>,

        #[command(flatten)]
        page: PageArgs,
    },
    Show {
        id: Id,
    },
    Delete {
        id: Id,
    },
    BulkDelete(BulkDeleteArgs),
    /// Activate or deactivate a poll
    ToggleActive {
        id: Id,
    },
}

#[derive(Subcommand)]
pub enum AdminBannerCommand {
    List {
        #[arg(short, long)]
        search: Option<String>,

        #[command(flatten)]
        page: PageArgs,
    },
    Show {
        id: Id,
    },
    Delete {
        id: Id,
    },
    BulkDelete(BulkDeleteArgs),
}

#[derive(Subcommand)]
pub enum AdminVoteCommand {
    List {
        /// Only votes on this poll
        #[arg(long)]
        poll: Option<Id>,

        /// Only votes by this user
        #[arg(long)]
        user: Option<Id>,

        #[command(flatten)]
        page: PageArgs,
    },
    Delete {
        id: Id,
    },
}

#[derive(Subcommand)]
pub enum DashboardCommand {
    /// Totals and most voted polls
    Summary,

    /// Per-option statistics and predicted winner for one poll
    PollStats { id: Id },
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Print the configuration file location
    Path,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables
    Table,
    /// Pretty-printed JSON
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_poll_create() {
        let args = Args::try_parse_from([
            "votenow", "polls", "create", "-t", "Lunch", "-O", "Pizza", "-O", "Sushi",
        ])
        .unwrap();
        match args.command {
            Commands::Polls(PollCommand::Create { title, options, .. }) => {
                assert_eq!(title, "Lunch");
                assert_eq!(options, ["Pizza", "Sushi"]);
            }
            _ => panic!("expected polls create"),
        }
    }

    #[test]
    fn test_parse_bulk_delete_and_role() {
        let args = Args::try_parse_from([
            "votenow", "-o", "json", "admin", "users", "bulk-delete", "3", "4", "5", "--yes",
        ])
        .unwrap();
        assert_eq!(args.output, OutputFormat::Json);
        match args.command {
            Commands::Admin(AdminCommand::Users(AdminUserCommand::BulkDelete(bulk))) => {
                assert_eq!(bulk.ids, [3, 4, 5]);
                assert!(bulk.yes);
            }
            _ => panic!("expected admin users bulk-delete"),
        }

        let args =
            Args::try_parse_from(["votenow", "admin", "users", "update-role", "7", "admin"])
                .unwrap();
        assert!(matches!(
            args.command,
            Commands::Admin(AdminCommand::Users(AdminUserCommand::UpdateRole {
                id: 7,
                role: Role::Admin
            }))
        ));
    }
}
