use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_indicatif::IndicatifLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;

#[derive(Parser)]
#[command(
    name = "telehealth-cli",
    about = "Collect telehealth literature and classify utilization measures",
    long_about = "Downloads PubMed metadata and open access PDFs, extracts telehealth \
                  utilization measures with rules or an LLM, and combines the results"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// API key for NCBI E-utilities (increases rate limit)
    #[arg(long, env = "NCBI_API_KEY", global = true)]
    api_key: Option<String>,

    /// Email for NCBI requests (recommended)
    #[arg(long, env = "NCBI_EMAIL", global = true)]
    email: Option<String>,

    /// Tool name for NCBI requests
    #[arg(long, env = "NCBI_TOOL", default_value = "telehealth-cli", global = true)]
    tool: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Search PubMed, save article metadata as CSV and download open access PDFs
    Download(commands::download::Download),
    /// Extract measures from PDFs with the keyword classifier
    Analyze(commands::analyze::Analyze),
    /// Extract measures from PDFs with an LLM
    #[command(name = "analyze-llm")]
    AnalyzeLlm(commands::analyze_llm::AnalyzeLlm),
    /// Merge per-article measure files into one CSV
    Combine(commands::combine::Combine),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with indicatif layer for progress bars
    let filter = if cli.verbose { "debug" } else { "info" };

    let indicatif_layer = IndicatifLayer::new();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(indicatif_layer.get_stderr_writer()),
        )
        .with(indicatif_layer)
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    match &cli.command {
        Commands::Download(cmd) => {
            let api_key = cli.api_key.as_deref();
            let email = cli.email.as_deref();
            let tool = &cli.tool;
            cmd.execute_with_config(api_key, email, tool).await
        }
        Commands::Analyze(cmd) => cmd.execute().await,
        Commands::AnalyzeLlm(cmd) => cmd.execute().await,
        Commands::Combine(cmd) => cmd.execute(),
    }
}
