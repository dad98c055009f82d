use clap::{ArgAction, Parser, Subcommand, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    #[value(name = "pretty_json")]
    PrettyJson,
}

#[derive(Parser, Debug)]
#[command(
    name = "tfe-state-info",
    version,
    about = "A simple cli app to return state information from TFE",
    long_about = r#"
tfe-state-info walks the workspaces of a Terraform Enterprise organization and
reports how much space their state files take up.

TFE configuration is read from the environment:
  • TFE_HOSTNAME: The address for the TFE server (Required)
  • TFE_TOKEN: The token for the TFE server (Required)
  • TFE_ORG_NAME: The org you want to use
"#
)]
pub struct AppArgs {
    #[command(subcommand)]
    pub command: Command,

    /// The format you want them returned in
    #[arg(long, value_enum, default_value_t = OutputFormat::PrettyJson, global = true)]
    pub format: OutputFormat,

    /// Do not output anything other than errors or returned data
    #[arg(long, default_value_t = true, action = ArgAction::Set, global = true)]
    pub silent: bool,

    /// Show debug information, with full http logs
    #[arg(long, global = true)]
    pub debug: bool,

    /// Retry transient network failures this many times
    #[arg(long, default_value_t = 0, global = true)]
    pub retries: u32,

    /// Base delay before the first retry, doubled on every further attempt
    #[arg(long, default_value_t = 500, global = true)]
    pub retry_delay_ms: u64,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List all workspaces for an Organization
    ListWorkspaces,

    /// Get latest statefile size for all workspaces
    LatestStatefileSize,

    /// Get total size of all statefiles of all workspaces
    AllStatefilesSize {
        /// Cleanup downloaded statefiles after completion
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        cleanup: bool,

        /// Download statefiles to a temporary location instead of cwd
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        totmpdir: bool,

        /// Use one temporary directory for the whole run instead of one per statefile
        #[arg(long)]
        shared_tmpdir: bool,
    },

    /// Validate your current credentials
    Validate,
}

impl Command {
    pub fn needs_org(&self) -> bool {
        !matches!(self, Command::Validate)
    }
}
