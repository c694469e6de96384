//! medrank: rank medical schools by user-weighted attributes.
//! Entry point for the command-line binary.

mod config;
mod output;
mod refresher;

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use medrank_common::{OutputFormat, RankingConfig};
use medrank_ranker::aggregate::{self, submissions_from_json_path, WeightSubmission};
use medrank_ranker::{Dataset, WeightVector};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::refresher::{start_aggregate_refresher, SubmissionsNotifier};

#[derive(Parser, Debug)]
#[command(name = "medrank")]
#[command(version)]
#[command(about = "Rank medical schools by weighted attributes")]
struct Cli {
    /// TOML or YAML run config (defaults to $MEDRANK_CONFIG, then medrank.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score and rank every school in the dataset
    Rank(RankArgs),
    /// Print median weights per submitter role
    Aggregate(AggregateArgs),
    /// List the attribute registry by category
    Attributes,
}

#[derive(Args, Debug)]
struct RankArgs {
    /// Dataset file (CSV or JSON), overrides dataset.path
    #[arg(short, long)]
    dataset: Option<PathBuf>,

    /// Weight vector exported as JSON, overrides [weights]
    #[arg(short, long, conflicts_with = "aggregate")]
    weights: Option<PathBuf>,

    /// Use out-of-state cost figures
    #[arg(long)]
    out_of_state: bool,

    /// Rank with the aggregate weighting of a group ("overall" or a role code)
    #[arg(short, long, value_name = "GROUP")]
    aggregate: Option<String>,

    /// Submissions file used with --aggregate, overrides submissions.path
    #[arg(long)]
    submissions: Option<PathBuf>,

    /// Only show the first N schools
    #[arg(short, long)]
    top: Option<usize>,

    /// Case-insensitive institution name filter
    #[arg(short, long)]
    search: Option<String>,

    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,
}

#[derive(Args, Debug)]
struct AggregateArgs {
    /// Submissions file, overrides submissions.path
    #[arg(long)]
    submissions: Option<PathBuf>,

    /// Keep running and recompute whenever the file changes
    #[arg(short, long)]
    watch: bool,

    /// Poll interval in seconds, overrides submissions.poll_interval_secs
    #[arg(short, long)]
    interval: Option<u64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Table,
    Csv,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Table => OutputFormat::Table,
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so ranked output can be piped
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("medrank=debug,info")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Rank(args) => rank(config, args),
        Command::Aggregate(args) => aggregate_command(config, args).await,
        Command::Attributes => output::write_attributes(std::io::stdout().lock()),
    }
}

fn rank(mut config: RankingConfig, args: RankArgs) -> anyhow::Result<()> {
    config::apply_overrides(
        &mut config,
        config::Overrides {
            dataset: args.dataset,
            out_of_state: args.out_of_state,
            top_n: args.top,
            search: args.search,
            format: args.format.map(OutputFormat::from),
        },
    );

    let weights = match (&args.aggregate, &args.weights) {
        (Some(group), _) => {
            let path = submissions_path(&config, args.submissions.as_deref())?;
            aggregate_weights(&path, group)?
        }
        (None, Some(path)) => config::weights_from_file(path)?,
        (None, None) => config::weights(&config)?,
    };

    let dataset = Dataset::load(&config.dataset.path)
        .with_context(|| format!("failed to load dataset {}", config.dataset.path))?;
    let run = medrank_ranker::run(&dataset, config.dataset.cost_view, &weights);

    let rows = output::select_rows(&run, config.output.search.as_deref(), config.output.top_n);
    output::write_ranking(&rows, config.output.format, std::io::stdout().lock())
}

fn submissions_path(config: &RankingConfig, flag: Option<&Path>) -> anyhow::Result<PathBuf> {
    flag.map(Path::to_path_buf)
        .or_else(|| config.submissions.path.as_ref().map(PathBuf::from))
        .context("no submissions file: pass --submissions or set submissions.path")
}

fn aggregate_weights(path: &Path, group: &str) -> anyhow::Result<WeightVector> {
    let submissions = submissions_from_json_path(path)
        .with_context(|| format!("failed to read submissions {}", path.display()))?;
    let aggregates = aggregate::aggregate(&submissions);
    let found = aggregate::find(&aggregates, group)
        .with_context(|| format!("no submissions for group '{group}'"))?;
    info!(group = %found.display_label(), "Ranking with aggregate weights");
    Ok(found.weights.clone())
}

async fn aggregate_command(config: RankingConfig, args: AggregateArgs) -> anyhow::Result<()> {
    let path = submissions_path(&config, args.submissions.as_deref())?;

    if !args.watch {
        let submissions = submissions_from_json_path(&path)
            .with_context(|| format!("failed to read submissions {}", path.display()))?;
        let aggregates = aggregate::aggregate(&submissions);
        return output::write_aggregates(&aggregates, std::io::stdout().lock());
    }

    let interval = Duration::from_secs(args.interval.unwrap_or(config.submissions.poll_interval_secs).max(1));
    watch_submissions(path, interval).await
}

/// Poll the submissions file and print fresh aggregates until Ctrl+C.
async fn watch_submissions(path: PathBuf, interval: Duration) -> anyhow::Result<()> {
    let (tx, mut results) = start_aggregate_refresher();
    let mut notifier = SubmissionsNotifier::new(tx);

    tokio::spawn(async move {
        while results.changed().await.is_ok() {
            let snapshot = results.borrow_and_update().clone();
            info!(generation = snapshot.generation, submissions = snapshot.submissions, "Aggregates refreshed");
            if let Err(e) = output::write_aggregates(&snapshot.aggregates, std::io::stdout().lock()) {
                tracing::warn!("Failed to print aggregates: {e}");
            }
        }
    });

    info!(path = %path.display(), interval_secs = interval.as_secs(), "Watching submissions");
    let mut ticker = tokio::time::interval(interval);
    let mut last_modified: Option<SystemTime> = None;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping");
                return Ok(());
            }
        }

        let modified = match tokio::fs::metadata(&path).await.and_then(|m| m.modified()) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(path = %path.display(), "Cannot stat submissions file: {e}");
                continue;
            }
        };
        if last_modified == Some(modified) {
            continue;
        }

        match read_submissions(&path).await {
            Ok(submissions) => {
                last_modified = Some(modified);
                if !notifier.notify(submissions) {
                    anyhow::bail!("aggregate refresher stopped");
                }
            }
            Err(e) => tracing::warn!("Skipping unreadable submissions: {e:#}"),
        }
    }
}

async fn read_submissions(path: &Path) -> anyhow::Result<Vec<WeightSubmission>> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(aggregate::submissions_from_json_str(&content)?)
}
