use clap::{Parser, Subcommand};
use anyhow::Result;
use dotenvy::dotenv;

use pubmed_splitter::{pipeline, telemetry};

#[derive(Parser)]
#[command(name = "pubsplit", about = "PubMed abstract extraction and sentence-aware chunking")]
struct Cli {
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(global = true, long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream a PubMed XML(.gz) file into per-article JSON records
    Parse(pipeline::parse::ParseCmd),
    /// Fetch articles by PMID through efetch
    Fetch(pipeline::fetch::FetchCmd),
    /// Split text into sentences
    Sentences(pipeline::sentences::SentencesCmd),
    /// Split text into token-bounded chunks
    Chunk(pipeline::chunk::ChunkCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    telemetry::config::set_json_mode(cli.json);

    // initialize logging/tracing (stderr). Respect RUST_LOG and PUBSPLIT_LOG_FORMAT
    telemetry::config::init_tracing();

    match cli.command {
        Commands::Parse(args) => pipeline::parse::run(args).await?,
        Commands::Fetch(args) => pipeline::fetch::run(args).await?,
        Commands::Sentences(args) => pipeline::sentences::run(args)?,
        Commands::Chunk(args) => pipeline::chunk::run(args)?,
    }

    Ok(())
}
