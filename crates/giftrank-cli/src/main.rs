mod collect;
mod rankings;
mod recommend;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use giftrank_core::{AgeBand, Gender};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "giftrank")]
#[command(about = "Trending-keyword gift catalog collector and recommender")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Rebuild the keyword ranking snapshot from a raw ranking export
    Rankings {
        /// JSON array of {keyword, rank, category, gender, age} records
        #[arg(long)]
        input: PathBuf,
    },
    /// Refresh the product catalog from the partner API
    Collect {
        /// Collect only these keywords instead of the ranking snapshot's
        #[arg(long = "keyword")]
        keywords: Vec<String>,

        /// Print the keyword plan without calling the API or writing the snapshot
        #[arg(long)]
        dry_run: bool,
    },
    /// Recommend products for a user profile
    Recommend {
        /// 여성/남성 (or female/male)
        #[arg(long)]
        gender: Option<Gender>,

        /// 10대 .. 60대 이상 (or 10s .. 60s)
        #[arg(long)]
        age: Option<AgeBand>,

        /// Interest category; repeat for several
        #[arg(long = "interest")]
        interests: Vec<String>,

        /// Maximum price in KRW
        #[arg(long)]
        budget: Option<u64>,

        /// Number of products to show
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Print machine-readable JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

/// `GIFTRANK_LOG_LEVEL` when set and valid, then `RUST_LOG`, then `info`.
fn log_filter(level: Option<&str>) -> EnvFilter {
    level
        .and_then(|l| EnvFilter::try_new(l).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn init_tracing(level: Option<&str>) {
    let filter = log_filter(level);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = giftrank_core::load_app_config()?;
    init_tracing(config.log_level.as_deref());
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Rankings { input } => rankings::run_rankings(&config, &input)?,
        Commands::Collect { keywords, dry_run } => {
            collect::run_collect(&config, &keywords, dry_run).await?;
        }
        Commands::Recommend {
            gender,
            age,
            interests,
            budget,
            top,
            json,
        } => {
            let args = recommend::RecommendArgs {
                gender,
                age,
                interests,
                budget,
                top,
                json,
            };
            recommend::run_recommend(&config, &args)?;
        }
    }

    Ok(())
}
