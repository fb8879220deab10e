use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use carescout::config::{self, CarescoutConfig};
use carescout::embedding::OpenAiEmbedder;
use carescout::engine::ChatEngine;
use carescout::extractor::OpenAiExtractor;
use carescout::gateway;
use carescout::generation::OpenAiGenerator;
use carescout::index::{self, SummaryIndex};
use carescout::retriever::IndexRetriever;

#[derive(Parser)]
#[command(name = "carescout")]
#[command(about = "A grounded conversational assistant for finding social-care services")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the chat gateway
    Serve {
        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Bind address
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Build the similarity index from a directory of plain-text summaries
    Index {
        /// Directory tree of *.txt summaries; each file's parent directory
        /// name becomes the document's tag
        summaries_dir: String,

        /// Where to write the index (defaults to retrieval.index_path)
        #[arg(long)]
        out: Option<String>,
    },

    /// Show version and index status
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, bind } => {
            let mut config = config::load()?;
            if let Some(port) = port {
                config.gateway.port = port;
            }
            if let Some(bind) = bind {
                config.gateway.bind = bind;
            }
            serve(config).await
        }
        Commands::Index { summaries_dir, out } => {
            let config = config::load()?;
            let out = out.unwrap_or_else(|| config.retrieval.index_path.clone());
            build_index(&config, &summaries_dir, &out).await
        }
        Commands::Status => {
            let config = config::load()?;
            println!("carescout v{}", env!("CARGO_PKG_VERSION"));
            match SummaryIndex::load(Path::new(&config.retrieval.index_path)) {
                Ok(index) => println!(
                    "index: {} documents at {}",
                    index.len(),
                    config.retrieval.index_path
                ),
                Err(_) => println!("index: not built ({})", config.retrieval.index_path),
            }
            Ok(())
        }
    }
}

fn require_api_key(config: &CarescoutConfig) -> anyhow::Result<String> {
    config
        .llm
        .api_key
        .clone()
        .ok_or_else(|| anyhow::anyhow!("no OpenAI API key. Set OPENAI_API_KEY env var."))
}

async fn serve(config: CarescoutConfig) -> anyhow::Result<()> {
    let api_key = require_api_key(&config)?;
    let timeout = Duration::from_secs(config.llm.timeout_secs);

    let index = match SummaryIndex::load(Path::new(&config.retrieval.index_path)) {
        Ok(index) => {
            info!(documents = index.len(), "similarity index loaded");
            index
        }
        Err(e) => {
            warn!("no usable index, chat will fail until one is built: {e}");
            SummaryIndex::default()
        }
    };

    let embedder = Arc::new(OpenAiEmbedder::new(
        api_key.clone(),
        config.llm.embedding_model.clone(),
        timeout,
    )?);
    let extractor = Arc::new(OpenAiExtractor::new(
        api_key.clone(),
        config.llm.model.clone(),
        timeout,
    )?);
    let generator = Arc::new(OpenAiGenerator::new(
        api_key,
        config.llm.model.clone(),
        config.llm.max_tokens,
        config.llm.temperature,
        timeout,
    )?);
    let retriever = Arc::new(IndexRetriever::new(index, embedder));

    let engine = ChatEngine::new(extractor, retriever, generator, config.retrieval.top_k);

    gateway::run(config, engine).await
}

async fn build_index(
    config: &CarescoutConfig,
    summaries_dir: &str,
    out: &str,
) -> anyhow::Result<()> {
    let api_key = require_api_key(config)?;
    let timeout = Duration::from_secs(config.llm.timeout_secs);

    let embedder = OpenAiEmbedder::new(api_key, config.llm.embedding_model.clone(), timeout)?;
    let index = index::build_from_dir(Path::new(summaries_dir), &embedder).await?;

    if index.is_empty() {
        anyhow::bail!("no *.txt summaries found under {summaries_dir}");
    }

    index.save(Path::new(out))?;
    println!("indexed {} documents -> {out}", index.len());
    Ok(())
}
