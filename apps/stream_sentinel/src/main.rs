use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use wordbloom_core::{
    ArtifactFormat, FilterParams, LoadFailurePolicy, MembershipOracle, StatsSnapshot, StreamFilter,
    WordBloomError,
};

#[derive(Parser)]
#[command(author, version, about = "Sentence filter over a blocklist Bloom filter")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Filter artifact produced by `wordbloom build`
    #[arg(long, default_value = "data/bloom_filter_base64.txt")]
    filter: PathBuf,

    /// Artifact is headerless; give its parameters with --bloom-size/--num-hashes
    #[arg(long, default_value_t = false)]
    legacy: bool,

    #[arg(long, default_value_t = 1500)]
    bloom_size: u32,

    #[arg(long, default_value_t = 3)]
    num_hashes: u32,

    #[arg(long, value_enum, default_value_t = OnLoadFailure::Refuse)]
    on_load_failure: OnLoadFailure,
}

#[derive(ValueEnum, Clone, Copy)]
enum OnLoadFailure {
    Refuse,
    SuppressAll,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read lines from a socket source and print the clean ones
    Connect {
        host: String,
        port: u16,
    },
    /// HTTP filtering endpoint
    Serve {
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    let stream = Arc::new(open_filter(&cli)?);
    info!(loaded = stream.oracle().is_loaded(), policy = ?stream.policy(), "filter ready");

    match cli.command {
        Commands::Connect { host, port } => {
            let sock = TcpStream::connect((host.as_str(), port))
                .await
                .with_context(|| format!("connecting to {host}:{port}"))?;
            info!(%host, port, "reading lines");
            let (rd, _wr) = sock.into_split();
            pump(&stream, BufReader::new(rd), tokio::io::stdout()).await?;
            let s = stream.stats();
            info!(seen = s.seen, accepted = s.accepted, suppressed = s.suppressed, "source closed");
        }
        Commands::Serve { addr } => {
            let listener = TcpListener::bind(&addr).await?;
            info!(%addr, "serving");
            axum::serve(listener, app(stream)).await?;
        }
    }

    Ok(())
}

/// Load the filter once. Depending on policy a failed load either aborts
/// start-up or leaves the oracle empty so every unit is suppressed.
fn open_filter(cli: &Cli) -> Result<StreamFilter> {
    let policy = match cli.on_load_failure {
        OnLoadFailure::Refuse => LoadFailurePolicy::RefuseToStart,
        OnLoadFailure::SuppressAll => LoadFailurePolicy::SuppressAll,
    };
    let format = if cli.legacy { ArtifactFormat::Legacy } else { ArtifactFormat::Framed };
    let legacy_params = FilterParams::new(cli.bloom_size, cli.num_hashes);
    let oracle = Arc::new(MembershipOracle::empty());
    if let Err(e) = oracle.load_path(&cli.filter, format, legacy_params) {
        match policy {
            LoadFailurePolicy::RefuseToStart => {
                bail!("cannot load filter {}: {e}", cli.filter.display())
            }
            LoadFailurePolicy::SuppressAll => {
                warn!(error = %e, path = %cli.filter.display(), "filter unavailable, suppressing all input")
            }
        }
    }
    Ok(StreamFilter::new(oracle, policy))
}

/// Copy clean lines from `input` to `output`.
async fn pump<R, W>(stream: &StreamFilter, input: R, mut output: W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if let Some(kept) = stream.admit(&line)? {
            output.write_all(kept.as_bytes()).await?;
            output.write_all(b"\n").await?;
            output.flush().await?;
        }
    }
    Ok(())
}

fn app(stream: Arc<StreamFilter>) -> Router {
    Router::new()
        .route("/filter", post(filter_text))
        .route("/contains/:word", get(contains_word))
        .route("/stats", get(stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(stream)
}

fn status_of(e: &WordBloomError) -> StatusCode {
    match e {
        WordBloomError::Uninitialized => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Deserialize)]
struct TextRequest {
    text: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct FilterResponse {
    accepted: bool,
    text: Option<String>,
}

async fn filter_text(
    State(stream): State<Arc<StreamFilter>>,
    Json(body): Json<TextRequest>,
) -> Result<Json<FilterResponse>, StatusCode> {
    let kept = stream.admit(&body.text).map_err(|e| status_of(&e))?;
    Ok(Json(FilterResponse { accepted: kept.is_some(), text: kept.map(str::to_string) }))
}

async fn contains_word(
    State(stream): State<Arc<StreamFilter>>,
    Path(word): Path<String>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let hit = stream.oracle().might_contain(&word).map_err(|e| status_of(&e))?;
    Ok(Json(serde_json::json!({ "word": word, "possibly_present": hit })))
}

async fn stats(State(stream): State<Arc<StreamFilter>>) -> Json<StatsSnapshot> {
    Json(stream.stats())
}
