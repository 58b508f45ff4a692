mod analyze;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "instasent-cli")]
#[command(about = "Instagram profile sentiment analysis from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyse the most recent posts of one profile
    Analyze {
        /// Instagram username, with or without a leading `@`
        username: String,

        /// Number of recent posts to analyse [default: INSTASENT_DEFAULT_POST_COUNT]
        #[arg(long, short = 'n')]
        posts: Option<usize>,

        /// Print the result as JSON instead of a text report
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = instasent_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Analyze {
            username,
            posts,
            json,
        } => analyze::run_analyze(&config, &username, posts, json).await,
    }
}
