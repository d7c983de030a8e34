use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "glsweep")]
#[command(about = "Bulk branch cleanup for GitLab-hosted repositories")]
#[command(
    version,
    long_about = "Fetches the remote branch list, classifies branches against a target \
branch, narrows the set with pattern and date filters, and deletes or archives \
the confirmed selection."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List remote branches with merge and protection status
    #[command(alias = "ls")]
    List(ListArgs),
    /// Delete the selected branches on the remote
    Delete(SweepArgs),
    /// Archive the selected branches (create a prefixed copy, then delete)
    Archive(SweepArgs),
    /// Setup configuration
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Project path or numeric id (overrides the configured project)
    #[arg(long, short = 'p')]
    pub project: Option<String>,

    /// Target branch for merge classification (defaults to the configured target)
    #[arg(long, short = 't')]
    pub target: Option<String>,

    /// Skip merge classification even when a default target is configured
    #[arg(long)]
    pub no_target: bool,

    /// Print branch names only
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SweepArgs {
    /// Project path or numeric id (overrides the configured project)
    #[arg(long, short = 'p')]
    pub project: Option<String>,

    /// Target branch for merge classification (defaults to the configured target)
    #[arg(long, short = 't')]
    pub target: Option<String>,

    /// Select branches matching this regex (repeatable; never selects protected branches)
    #[arg(long = "include", short = 'i', value_name = "REGEX")]
    pub include: Vec<String>,

    /// Deselect branches matching this regex (repeatable)
    #[arg(long = "exclude", short = 'x', value_name = "REGEX")]
    pub exclude: Vec<String>,

    /// Select branches whose last commit is on or after this day (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub after: Option<NaiveDate>,

    /// Select branches whose last commit is before this day (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub before: Option<NaiveDate>,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Show what would happen without touching the remote
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Print the active configuration and its path
    #[arg(long)]
    pub show: bool,

    /// Run the interactive setup even when a configuration exists
    #[arg(long)]
    pub edit: bool,
}
