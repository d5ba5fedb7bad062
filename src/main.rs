use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use reviewmeta::cli::{ProcessReviewsOptions, UpdateContributorsOptions, UpdateReviewTeamsOptions};
use reviewmeta::{Config, Result};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "reviewmeta")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Parse software review issues and maintain the contributor roster", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Config file (defaults to ./reviewmeta.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// GitHub API token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse review issues into the packages file
    #[command(name = "process-reviews")]
    ProcessReviews {
        /// Only issues with this label (repeatable, any label matches)
        #[arg(long = "label")]
        labels: Vec<String>,

        /// Only issues updated since this date (YYYY-MM-DD)
        #[arg(long)]
        since: Option<String>,

        /// Output file (defaults to the configured packages path)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip repository metrics lookups
        #[arg(long)]
        no_metrics: bool,
    },

    /// Merge all-contributors sources into the roster
    #[command(name = "update-contributors")]
    UpdateContributors {
        /// Roster file to update
        #[arg(long)]
        roster: Option<PathBuf>,

        /// Re-fetch every contributor's GitHub profile
        #[arg(long)]
        refresh: bool,

        /// Write the roster here instead of in place
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Credit review team members on the roster and fill in their names
    #[command(name = "update-review-teams")]
    UpdateReviewTeams {
        /// Roster file to update
        #[arg(long)]
        roster: Option<PathBuf>,

        /// Packages file produced by process-reviews
        #[arg(long)]
        packages: Option<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reviewmeta=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("{}", format!("Error: failed to create tokio runtime: {}", e).red());
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run_async(cli)) {
        eprintln!("{}", format!("Error: {:#}", e).red());
        std::process::exit(1);
    }
}

async fn run_async(cli: Cli) -> Result<()> {
    let config_path = cli.config;
    let token = cli.token;

    match cli.command {
        Commands::ProcessReviews {
            labels,
            since,
            output,
            no_metrics,
        } => {
            let options = ProcessReviewsOptions {
                labels,
                since,
                output,
                no_metrics,
            };
            let config = Config::load(config_path.as_deref())?;
            reviewmeta::cli::reviews::run(options, &config, token).await?;
        }

        Commands::UpdateContributors {
            roster,
            refresh,
            output,
        } => {
            let options = UpdateContributorsOptions {
                roster,
                refresh,
                output,
            };
            let config = Config::load(config_path.as_deref())?;
            reviewmeta::cli::contributors::run(options, &config, token).await?;
        }

        Commands::UpdateReviewTeams { roster, packages } => {
            let options = UpdateReviewTeamsOptions { roster, packages };
            let config = Config::load(config_path.as_deref())?;
            reviewmeta::cli::review_teams::run(options, &config, token).await?;
        }

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "reviewmeta", &mut io::stdout());
        }
    }

    Ok(())
}
