//! Blogflow - agent-crew blog series generator.
//!
//! Plans a roadmap for a technical blog series, then writes every post in
//! order, persisting each artifact as it completes.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use blogflow::{BlogFlow, Crew, CrewManager, CrewPrompts, FlowConfig, Roadmap};

/// Agent-crew blog series generator
#[derive(Parser)]
#[command(name = "blogflow")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Series options shared by the run and plan subcommands.
#[derive(Args, Default)]
struct SeriesArgs {
    /// Series topic
    #[arg(short, long)]
    topic: Option<String>,

    /// Series goal brief
    #[arg(short, long)]
    goal: Option<String>,

    /// Directory to write artifacts to
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Model to use for crew calls
    #[arg(short, long)]
    model: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a roadmap, then write every post (default)
    Run {
        /// Skip the planning phase and use an existing roadmap file
        #[arg(long)]
        skip_planning: bool,

        /// Path to the roadmap file (required if --skip-planning is used)
        #[arg(long, value_name = "FILE")]
        roadmap_file: Option<PathBuf>,

        #[command(flatten)]
        series: SeriesArgs,
    },

    /// Generate and persist the roadmap, then exit
    Plan {
        #[command(flatten)]
        series: SeriesArgs,
    },

    /// Parse a roadmap document and report what it contains
    Validate {
        /// Roadmap file to check
        file: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        None => cmd_run(false, None, SeriesArgs::default(), cli.verbose).await?,
        Some(Commands::Run { skip_planning, roadmap_file, series }) => {
            cmd_run(skip_planning, roadmap_file, series, cli.verbose).await?;
        }
        Some(Commands::Plan { series }) => {
            cmd_plan(series, cli.verbose).await?;
        }
        Some(Commands::Validate { file }) => {
            init_logging(cli.verbose, None)?;
            cmd_validate(&file)?;
        }
        Some(Commands::Completions { shell }) => {
            cmd_completions(shell);
        }
    }

    Ok(())
}

/// Run the full flow: plan (or load) a roadmap, then write every post.
async fn cmd_run(
    skip_planning: bool,
    roadmap_file: Option<PathBuf>,
    series: SeriesArgs,
    verbose: bool,
) -> Result<()> {
    let config = resolve_config(series)?;

    // Fail fast, before the output directory or log file exist
    if skip_planning && roadmap_file.is_none() {
        anyhow::bail!("--roadmap-file is required when --skip-planning is used");
    }

    std::fs::create_dir_all(&config.output_dir)?;
    init_logging(verbose, Some(&config.log_path()))?;
    tracing::info!("Starting blog generation flow");

    let crew = build_crew(&config).await?;
    let output_dir = config.output_dir.clone();
    let flow = BlogFlow::new(crew, config);
    let state = flow.kickoff(skip_planning, roadmap_file.as_deref()).await?;

    println!("Wrote {} posts to {}", state.posts.len(), output_dir.display());
    for (i, post) in state.posts.iter().enumerate() {
        println!("  {}. {}", i + 1, post.title);
    }
    Ok(())
}

/// Run phase 1 only: generate and persist the roadmap.
async fn cmd_plan(series: SeriesArgs, verbose: bool) -> Result<()> {
    let config = resolve_config(series)?;

    std::fs::create_dir_all(&config.output_dir)?;
    init_logging(verbose, Some(&config.log_path()))?;

    let crew = build_crew(&config).await?;
    let mut flow = BlogFlow::new(crew, config);
    flow.obtain_roadmap(false, None).await?;

    println!(
        "Roadmap with {} posts saved to {}",
        flow.state().roadmap.len(),
        flow.roadmap_path().display()
    );
    for (i, outline) in flow.state().roadmap.iter().enumerate() {
        println!("  {}. {}", i + 1, outline.title);
    }
    Ok(())
}

/// Parse a roadmap document and report what was recovered.
fn cmd_validate(file: &Path) -> Result<()> {
    let roadmap = Roadmap::load(file)?;

    let topic = if roadmap.topic.is_empty() { "(missing)" } else { roadmap.topic.as_str() };
    println!("Topic: {topic}");
    if roadmap.goal.is_empty() {
        println!("Goal: (missing)");
    } else {
        println!("Goal: {}", roadmap.goal.lines().next().unwrap_or_default());
    }
    println!("Planned posts: {}", roadmap.total_posts());
    for (i, outline) in roadmap.outlines.iter().enumerate() {
        println!("  {}. {}", i + 1, outline.title);
    }

    if roadmap.is_empty() {
        anyhow::bail!("no planned posts found in {}", file.display());
    }
    Ok(())
}

/// Print shell completions to stdout.
fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "blogflow", &mut io::stdout());
}

/// Resolve configuration: file and environment first, then CLI overrides.
fn resolve_config(series: SeriesArgs) -> Result<FlowConfig> {
    let mut config = FlowConfig::load()?;
    if let Some(topic) = series.topic {
        config.title = topic.clone();
        config.topic = topic;
    }
    if let Some(goal) = series.goal {
        config.goal = goal;
    }
    if let Some(output_dir) = series.output_dir {
        config.output_dir = output_dir;
    }
    if let Some(model) = series.model {
        config.model = model;
    }
    Ok(config)
}

/// Build the crew provider chain from configuration.
async fn build_crew(config: &FlowConfig) -> Result<Box<dyn Crew>> {
    let prompts = match &config.prompts_file {
        Some(path) => CrewPrompts::load(path)?,
        None => CrewPrompts::defaults(),
    };

    let manager = CrewManager::new(&config.model, prompts).await;
    if !manager.has_providers() {
        anyhow::bail!("No crew provider available: set OPENAI_API_KEY or ANTHROPIC_API_KEY");
    }
    tracing::info!(provider = manager.active_provider().unwrap_or("none"), "Using crew provider");
    Ok(Box::new(manager))
}

/// Set up logging to the console and, for generation runs, a log file in the
/// output directory.
fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = if verbose { EnvFilter::new("debug") } else { EnvFilter::new("info") };

    let file_layer = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
            Some(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .with(filter)
        .init();
    Ok(())
}
