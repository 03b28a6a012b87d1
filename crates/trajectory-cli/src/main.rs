//! Trajectory CLI
//!
//! Command-line reports over Trajectory projects and stories.

mod render;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use trajectory_core::{Project, Projects, Stories};
use trajectory_store::{DataStore, FixtureSource, TrajectoryConfig};

#[derive(Parser)]
#[command(name = "trajectory")]
#[command(about = "Trajectory - project progress and completion estimates")]
#[command(version)]
struct Cli {
    /// Fixture directory to read records from (overrides the config file)
    #[arg(long, global = true)]
    source: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List projects
    Projects {
        /// Only archived projects
        #[arg(long, conflicts_with = "active")]
        archived: bool,

        /// Only active projects
        #[arg(long)]
        active: bool,
    },

    /// Show progress and estimates for one project
    Project {
        /// Project keyword
        keyword: String,
    },

    /// List the stories of a project
    Stories {
        /// Project keyword
        keyword: String,

        /// Only stories in this state
        #[arg(long, value_enum)]
        state: Option<StateFilter>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StateFilter {
    Started,
    Unstarted,
    NotCompleted,
    Completed,
}

impl StateFilter {
    fn apply(self, stories: &Stories) -> Stories {
        match self {
            StateFilter::Started => stories.started(),
            StateFilter::Unstarted => stories.unstarted(),
            StateFilter::NotCompleted => stories.not_completed(),
            StateFilter::Completed => stories.completed(),
        }
    }
}

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    // Config is read before logging exists since it carries the log level
    let (config, config_error) = match TrajectoryConfig::try_load() {
        Ok(config) => (config, None),
        Err(e) => (TrajectoryConfig::default().with_env_overrides(), Some(e)),
    };
    init_logging(&config.log_level);
    if let Some(e) = config_error {
        tracing::warn!(error = %e, "Using default configuration");
    }

    let source_dir = cli.source.clone().unwrap_or_else(|| config.source_dir.clone());
    tracing::debug!(source = ?source_dir, account = ?config.account, "Opening store");
    let store = DataStore::new(Arc::new(FixtureSource::new(source_dir)));

    let result = match cli.command {
        Commands::Projects { archived, active } => cmd_projects(&store, archived, active, cli.json).await,
        Commands::Project { keyword } => cmd_project(&store, &keyword, cli.json).await,
        Commands::Stories { keyword, state } => cmd_stories(&store, &keyword, state, cli.json).await,
    };

    let stats = store.stats().snapshot();
    tracing::debug!(
        remote_calls = stats.remote_calls,
        cache_hits = stats.cache_hits,
        cache_misses = stats.cache_misses,
        hit_rate = stats.cache_hit_rate,
        "Fetch statistics"
    );
    result
}

async fn cmd_projects(store: &DataStore, archived: bool, active: bool, json: bool) -> Result<()> {
    let all = store.fetch_projects().await.context("Failed to load projects")?;
    let projects = if archived {
        all.archived()
    } else if active {
        all.active()
    } else {
        Projects::clone(&all)
    };

    if json {
        let list: Vec<&Project> = projects.iter().map(|p| &**p).collect();
        println!("{}", serde_json::to_string_pretty(&list)?);
    } else {
        print!("{}", render::projects(&projects));
    }
    Ok(())
}

async fn cmd_project(store: &DataStore, keyword: &str, json: bool) -> Result<()> {
    let project = find_project(store, keyword).await?;
    let metrics = project
        .metrics(store)
        .await
        .with_context(|| format!("Failed to load stories of '{}'", keyword))?;
    let summary = metrics.summary();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", render::summary(&summary));
    }
    Ok(())
}

async fn cmd_stories(
    store: &DataStore,
    keyword: &str,
    state: Option<StateFilter>,
    json: bool,
) -> Result<()> {
    let project = find_project(store, keyword).await?;
    let all = project
        .stories(store)
        .await
        .with_context(|| format!("Failed to load stories of '{}'", keyword))?;
    let stories = match state {
        Some(filter) => filter.apply(&all),
        None => Stories::clone(&all),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&stories)?);
    } else {
        print!("{}", render::stories(&stories));
    }
    Ok(())
}

async fn find_project(store: &DataStore, keyword: &str) -> Result<Arc<Project>> {
    store
        .find_project_by_keyword(keyword)
        .await
        .context("Failed to load projects")?
        .ok_or_else(|| anyhow!("No project with keyword '{}'", keyword))
}
