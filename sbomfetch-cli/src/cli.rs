//! CLI argument parsing using clap derive API
//!
//! Purely declarative: no I/O happens here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// sbomfetch -- fetch and unpack the source archives an SPDX SBOM points at.
///
/// Use `sbomfetch <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "sbomfetch", version, about, long_about = None)]
pub struct Cli {
    /// Path to a sbomfetch.toml configuration file (defaults + env when omitted).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve, download and extract every source archive in an SBOM.
    Fetch(FetchArgs),

    /// Resolve download tasks without fetching anything.
    Resolve(ResolveArgs),

    /// Extract local archives into a directory.
    Extract(ExtractArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

/// Where the SBOM comes from.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// SPDX JSON file, or an attestation file with `--attestation`.
    pub input: PathBuf,

    /// Treat INPUT as DSSE envelopes (one per line) carrying an SPDX predicate.
    #[arg(long)]
    pub attestation: bool,

    /// Fail when a GENERATED_FROM relationship cannot be validated.
    #[arg(long)]
    pub strict: bool,
}

// ---- fetch ----

/// Full pipeline into OUT_DIR.
#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output directory; archives land in OUT_DIR/archives.
    pub out_dir: PathBuf,

    /// Number of concurrent downloads.
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// Download only, skip extraction.
    #[arg(long)]
    pub no_extract: bool,
}

// ---- resolve ----

/// Dry run: list the tasks that `fetch` would download.
#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

// ---- extract ----

/// Extract local tarballs.
#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    /// Archives to extract (.tar.gz, .tgz, .tar.xz, .tar.bz2).
    #[arg(required = true)]
    pub archives: Vec<PathBuf>,

    /// Extraction root; created if missing.
    #[arg(long)]
    pub into: PathBuf,

    /// Number of archives extracted in parallel.
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,
}

// ---- config ----

/// Manage sbomfetch configuration.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, resolve, download, extract).
        #[arg(long)]
        section: Option<String>,
    },
}
