use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use wordbloom_core::{
    blocklist::{load_blocklist, read_blocklist},
    builder::{build_filter, EmptyPolicy},
    codec::{decode_as, encode_as, read_artifact, write_artifact, ArtifactFormat},
    config::BuildConfig,
    hashing::{probe, seeded_digest, HashScheme},
    BloomFilter, FilterParams, LoadFailurePolicy, MembershipOracle, StreamFilter,
};

#[derive(Parser)]
#[command(name = "wordbloom", version, about = "Blocklist Bloom filter: build, inspect, query")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(ValueEnum, Clone, Copy)]
enum CliScheme {
    Md5,
    Sha256,
    Blake3,
    Xxh3,
}

#[derive(ValueEnum, Clone, Copy, Default)]
enum CliLoadPolicy {
    #[default]
    Refuse,
    SuppressAll,
}

/// Filter parameters. For `build` they override the config file; for readers
/// they describe a legacy (headerless) artifact.
#[derive(Args, Clone)]
struct ParamArgs {
    #[arg(long)]
    bloom_size: Option<u32>,
    #[arg(long)]
    num_hashes: Option<u32>,
    #[arg(long, value_enum)]
    scheme: Option<CliScheme>,
    /// Lowercase words before hashing
    #[arg(long, default_value_t = false)]
    fold_case: bool,
    /// Strip leading/trailing ASCII punctuation before hashing
    #[arg(long, default_value_t = false)]
    trim_punctuation: bool,
}

impl ParamArgs {
    fn apply(&self, mut p: FilterParams) -> FilterParams {
        if let Some(m) = self.bloom_size { p.bloom_size = m; }
        if let Some(k) = self.num_hashes { p.num_hashes = k; }
        if let Some(s) = self.scheme {
            p.scheme = match s {
                CliScheme::Md5 => HashScheme::Md5,
                CliScheme::Sha256 => HashScheme::Sha256,
                CliScheme::Blake3 => HashScheme::Blake3,
                CliScheme::Xxh3 => HashScheme::Xxh3,
            };
        }
        if self.fold_case { p.normalization.fold_case = true; }
        if self.trim_punctuation { p.normalization.trim_punctuation = true; }
        p
    }
}

#[derive(Args)]
struct ReaderArgs {
    /// Filter artifact path
    #[arg(long)]
    filter: PathBuf,
    /// Artifact is headerless; parameters come from the flags below
    #[arg(long, default_value_t = false)]
    legacy: bool,
    #[command(flatten)]
    params: ParamArgs,
}

impl ReaderArgs {
    fn format(&self) -> ArtifactFormat {
        if self.legacy { ArtifactFormat::Legacy } else { ArtifactFormat::Framed }
    }

    fn legacy_params(&self) -> FilterParams { self.params.apply(FilterParams::reference()) }
}

#[derive(Subcommand)]
enum Cmd {
    /// Build a filter artifact from a `word<TAB>score` blocklist
    Build {
        /// Blocklist path, `-` for stdin
        #[arg(long)]
        blocklist: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// JSON build config; flags override it
        #[arg(long)]
        config: Option<PathBuf>,
        /// Keep words with score <= threshold
        #[arg(long, allow_hyphen_values = true)]
        threshold: Option<i64>,
        #[command(flatten)]
        params: ParamArgs,
        /// Write an all-zero filter instead of failing when nothing is selected
        #[arg(long, default_value_t = false)]
        allow_empty: bool,
        /// Write the headerless reference format
        #[arg(long, default_value_t = false)]
        legacy: bool,
        /// Store the effective build config (file + flags) as JSON
        #[arg(long)]
        save_config: Option<PathBuf>,
    },

    /// Test words against a filter
    Query {
        #[command(flatten)]
        reader: ReaderArgs,
        #[arg(required = true)]
        words: Vec<String>,
    },

    /// Print probe indices and digests without a filter
    Probe {
        #[command(flatten)]
        params: ParamArgs,
        #[arg(required = true)]
        words: Vec<String>,
    },

    /// Print filter parameters and fill statistics as JSON
    Inspect {
        #[command(flatten)]
        reader: ReaderArgs,
    },

    /// Copy stdin to stdout, dropping lines that contain a blocked word
    Filter {
        #[command(flatten)]
        reader: ReaderArgs,
        #[arg(long, value_enum, default_value_t = CliLoadPolicy::Refuse)]
        on_load_failure: CliLoadPolicy,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();
}

fn load_filter(reader: &ReaderArgs) -> Result<BloomFilter> {
    let text = read_artifact(&reader.filter)
        .with_context(|| format!("reading {}", reader.filter.display()))?;
    Ok(decode_as(&text, reader.format(), reader.legacy_params())?)
}

fn load_entries(path: &Path) -> Result<Vec<wordbloom_core::BlocklistEntry>> {
    let entries = if path == Path::new("-") {
        read_blocklist(io::stdin().lock())?
    } else {
        load_blocklist(path).with_context(|| format!("reading blocklist {}", path.display()))?
    };
    Ok(entries)
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Build { blocklist, out, config, threshold, params, allow_empty, legacy, save_config } => {
            let mut cfg = match config {
                Some(p) => BuildConfig::load(&p).with_context(|| format!("config {}", p.display()))?,
                None => BuildConfig::default(),
            };
            if let Some(t) = threshold { cfg.threshold = t; }
            cfg.params = params.apply(cfg.params);
            if allow_empty { cfg.empty_policy = EmptyPolicy::AllowEmpty; }
            if legacy { cfg.format = ArtifactFormat::Legacy; }

            let entries = load_entries(&blocklist)?;
            let (filter, report) = build_filter(&entries, cfg.threshold, cfg.params, cfg.empty_policy)?;
            write_artifact(&out, &encode_as(&filter, cfg.format))?;
            println!("built: {}", out.display());
            println!(
                "       words={} distinct={} bits_set={}/{} fill≈{:.3} fpr≈{:.5}",
                report.words_selected,
                report.distinct_words,
                report.bits_set,
                cfg.params.bloom_size,
                report.fill_ratio,
                report.expected_fpr
            );
            println!("       num_hashes={} optimal_num_hashes={}", cfg.params.num_hashes, report.optimal_num_hashes);
            if let Some(p) = save_config {
                cfg.save(&p).with_context(|| format!("saving config {}", p.display()))?;
                println!("config: {}", p.display());
            }
        }
        Cmd::Query { reader, words } => {
            let filter = load_filter(&reader)?;
            for w in &words {
                let verdict = if filter.might_contain(w) { "possibly-present" } else { "absent" };
                println!("{w}\t{verdict}");
            }
        }
        Cmd::Probe { params, words } => {
            let p = params.apply(FilterParams::reference());
            p.validate()?;
            for w in &words {
                let key = p.normalization.apply(w);
                println!("{w}");
                for seed in 0..p.num_hashes {
                    let idx = probe(&key, seed, p.bloom_size, p.scheme);
                    let digest = hex::encode(seeded_digest(&key, seed, p.scheme));
                    println!("  seed={seed} index={idx} digest={digest}");
                }
            }
        }
        Cmd::Inspect { reader } => {
            let filter = load_filter(&reader)?;
            let p = filter.params();
            let info = serde_json::json!({
                "path": reader.filter.display().to_string(),
                "format": if reader.legacy { "legacy" } else { "framed" },
                "params": p,
                "bits_set": filter.bits_set(),
                "fill_ratio": filter.bits().fill_ratio(),
                "estimated_fpr": filter.estimated_fpr(),
            });
            println!("{}", serde_json::to_string_pretty(&info)?);
        }
        Cmd::Filter { reader, on_load_failure } => {
            let oracle = Arc::new(MembershipOracle::empty());
            let policy = match on_load_failure {
                CliLoadPolicy::Refuse => LoadFailurePolicy::RefuseToStart,
                CliLoadPolicy::SuppressAll => LoadFailurePolicy::SuppressAll,
            };
            match load_filter(&reader) {
                Ok(f) => oracle.load(f)?,
                Err(e) if policy == LoadFailurePolicy::SuppressAll => {
                    warn!(error = %e, "filter unavailable, suppressing all input");
                }
                Err(e) => bail!("refusing to filter without a valid filter: {e:#}"),
            }
            let stream = StreamFilter::new(oracle, policy);
            let stdout = io::stdout();
            let mut out = stdout.lock();
            for line in io::stdin().lock().lines() {
                let line = line?;
                if let Some(kept) = stream.admit(&line)? {
                    writeln!(out, "{kept}")?;
                }
            }
            let s = stream.stats();
            tracing::info!(seen = s.seen, accepted = s.accepted, suppressed = s.suppressed, "stream done");
        }
    }
    Ok(())
}
