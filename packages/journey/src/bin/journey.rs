//! CLI for submitting a journey source URL
//!
//! Runs one extract → create → initialize pass against the configured journey
//! API and exits non-zero if any stage fails.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use journey_core::config::Config;
use journey_core::domains::journeys::{JourneyPipeline, JourneyTemplate, OwnerIdentity, RunOutcome};
use journey_core::kernel::{
    BasePresentationSurface, ConsoleSurface, HttpExtractor, HttpJourneyClient, NoopSurface,
    PipelineDeps, QueryCache, StaticIdentity, TracingNotifier,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "journey")]
#[command(about = "Create journeys from external project pages")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a project page and create an initialized journey from it
    Submit {
        url: String,
        /// Wallet address that will own the journey (overrides OWNER_ADDRESS)
        #[arg(long)]
        owner: Option<String>,
        /// Do not report the dialog closing on stderr
        #[arg(long)]
        quiet: bool,
    },

    /// Print the template labels and messages as JSON
    Template,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,journey_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Submit { url, owner, quiet } => submit(url, owner, quiet).await,
        Commands::Template => {
            let json = serde_json::to_string_pretty(&JourneyTemplate::gitcoin())?;
            println!("{}", json);
            Ok(())
        }
    }
}

async fn submit(url: String, owner: Option<String>, quiet: bool) -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(api = %config.journey_api_url, "Configuration loaded");

    let owner = owner.map(OwnerIdentity::new).or(config.owner_address.clone());
    let journeys = Arc::new(HttpJourneyClient::new(
        config.journey_api_url.clone(),
        config.http_timeout,
    )?);
    let surface: Arc<dyn BasePresentationSurface> = if quiet {
        Arc::new(NoopSurface)
    } else {
        Arc::new(ConsoleSurface::stderr())
    };

    let deps = PipelineDeps::new(
        Arc::new(HttpExtractor::new(config.extractor_url.clone(), config.http_timeout)?),
        journeys.clone(),
        journeys,
        Arc::new(QueryCache::new()),
        Arc::new(TracingNotifier),
        Arc::new(StaticIdentity::new(owner)),
        surface,
    );

    let pipeline = JourneyPipeline::new(deps);
    pipeline.open();

    let outcome = pipeline
        .submit_url(url)?
        .outcome()
        .await
        .context("Pipeline run did not report an outcome")?;

    match outcome {
        RunOutcome::Completed { journey } => {
            println!("{}", journey.id);
            Ok(())
        }
        RunOutcome::Failed(e) => bail!("{}", e),
    }
}
