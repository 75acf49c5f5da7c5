use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use exposure_common::Config;
use exposure_pipeline::{stages, StageStats};

#[derive(Parser)]
#[command(name = "exposure", about = "Weekly mention and exposure panels for linked RePEc accounts")]
struct Cli {
    /// Path to config TOML file
    #[arg(long, env = "EXPOSURE_CONFIG", default_value = "./config/exposure.toml")]
    config: PathBuf,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Re-join split rows of the raw message dump and type-check it
    RepairMessages,
    /// Attach RePEc ids to users, then backfill them into the message log
    ResolveIds,
    /// Split the message log into one file per configured topic
    FilterTopics,
    /// Repair, resolve and filter in order
    Prepare,
    /// Stage 1: follow edges between users with RePEc ids
    FollowGraph,
    /// Stage 2: distinct authors per week
    AuthorsRoster {
        /// Message log to bucket (defaults to paths.activity_log)
        #[arg(long)]
        messages: Option<PathBuf>,
    },
    /// Stage 3: user x week authorship matrix
    Mentions,
    /// Stage 4: authors plus direct followers per week
    ExposedRoster {
        /// Message log to bucket (defaults to paths.activity_log)
        #[arg(long)]
        messages: Option<PathBuf>,
    },
    /// Stage 5: user x week exposure matrix
    Interacted,
    /// Stages 1-5 in dependency order
    Run {
        /// Message log to bucket (defaults to paths.activity_log)
        #[arg(long)]
        messages: Option<PathBuf>,
    },
}

impl Command {
    fn messages_override(&self) -> Option<&PathBuf> {
        match self {
            Command::AuthorsRoster { messages }
            | Command::ExposedRoster { messages }
            | Command::Run { messages } => messages.as_ref(),
            _ => None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs)?;

    info!("Exposure panel builder starting...");

    let mut config = Config::load(&cli.config)?;
    if let Some(messages) = cli.command.messages_override() {
        info!(messages = %messages.display(), "Using message log from command line");
        config.paths.activity_log = messages.clone();
    }
    let config = Arc::new(config);

    let stats = match cli.command {
        Command::RepairMessages => vec![blocking(&config, stages::repair_messages).await?],
        Command::ResolveIds => resolve_ids(&config).await?,
        Command::FilterTopics => blocking(&config, stages::filter_topics).await?,
        Command::Prepare => prepare(&config).await?,
        Command::FollowGraph => vec![blocking(&config, stages::follow_graph_stage).await?],
        Command::AuthorsRoster { .. } => vec![blocking(&config, stages::authors_roster_stage).await?],
        Command::Mentions => vec![blocking(&config, stages::mentions_stage).await?],
        Command::ExposedRoster { .. } => vec![blocking(&config, stages::exposed_roster_stage).await?],
        Command::Interacted => vec![blocking(&config, stages::interacted_stage).await?],
        Command::Run { .. } => run_panel(&config).await?,
    };

    for s in &stats {
        info!("{s}");
    }
    info!(stages = stats.len(), "Done");
    Ok(())
}

fn init_tracing(json: bool) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("exposure=info".parse()?);
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}

/// Run a synchronous stage on the blocking pool.
async fn blocking<T>(config: &Arc<Config>, stage: fn(&Config) -> Result<T>) -> Result<T>
where
    T: Send + 'static,
{
    let config = Arc::clone(config);
    tokio::task::spawn_blocking(move || stage(&config)).await?
}

async fn resolve_ids(config: &Arc<Config>) -> Result<Vec<StageStats>> {
    Ok(vec![
        blocking(config, stages::merge_directory).await?,
        blocking(config, stages::backfill_messages).await?,
    ])
}

async fn prepare(config: &Arc<Config>) -> Result<Vec<StageStats>> {
    let mut stats = vec![blocking(config, stages::repair_messages).await?];
    stats.extend(resolve_ids(config).await?);
    stats.extend(blocking(config, stages::filter_topics).await?);
    Ok(stats)
}

/// Stages 1 and 2 first; mentions and the exposed roster only depend on those,
/// so they run side by side; interacted waits for the exposed roster.
async fn run_panel(config: &Arc<Config>) -> Result<Vec<StageStats>> {
    let mut stats = vec![
        blocking(config, stages::follow_graph_stage).await?,
        blocking(config, stages::authors_roster_stage).await?,
    ];

    let (mentions, exposed) = tokio::try_join!(
        blocking(config, stages::mentions_stage),
        blocking(config, stages::exposed_roster_stage),
    )?;
    stats.push(mentions);
    stats.push(exposed);

    stats.push(blocking(config, stages::interacted_stage).await?);
    Ok(stats)
}
