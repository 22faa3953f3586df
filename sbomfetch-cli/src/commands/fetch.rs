//! `sbomfetch fetch` command handler
//!
//! Runs the full pipeline: prepare directories, read the SBOM, resolve
//! tasks, download into `<out>/archives`, extract into `<out>`.
//! Download and extraction failures are recovered and reported; only setup
//! and document errors abort the run.

use std::io::Write;

use serde::Serialize;
use tracing::info;

use sbomfetch_core::SbomfetchConfig;
use sbomfetch_downloader::{DownloadEngine, DownloadSummary, DownloaderConfig};
use sbomfetch_extractor::{ArchiveJob, ExtractOptions, extract_all};
use sbomfetch_resolver::Resolver;

use crate::cli::FetchArgs;
use crate::commands::extract::ExtractionReport;
use crate::commands::resolve::ResolveSummary;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Archive subdirectory under the output directory.
pub const ARCHIVES_DIR: &str = "archives";

/// Where the SPDX document pulled out of an attestation is saved.
pub const SBOM_COPY: &str = "sbom.json";

/// Execute the `fetch` command.
pub async fn execute(
    args: &FetchArgs,
    config: &SbomfetchConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let report = run(args, config).await?;
    writer.render(&report)
}

/// Run the pipeline and return the combined report.
pub async fn run(args: &FetchArgs, config: &SbomfetchConfig) -> Result<FetchReport, CliError> {
    let resolver_config = super::resolver_config(config, &args.input)?;

    let mut download_config = DownloaderConfig::from_core(&config.download);
    if let Some(concurrency) = args.concurrency {
        download_config.concurrency = concurrency;
    }
    download_config.validate()?;

    let extract_options = ExtractOptions::from_core(&config.extract);
    extract_options.validate()?;
    let extract_enabled = config.extract.enabled && !args.no_extract;

    let out_dir = &args.out_dir;
    let archives_dir = out_dir.join(ARCHIVES_DIR);
    tokio::fs::create_dir_all(&archives_dir).await?;

    let bytes = super::read_document(&args.input, &resolver_config).await?;
    if args.input.attestation {
        let copy = out_dir.join(SBOM_COPY);
        tokio::fs::write(&copy, &bytes).await?;
        info!(path = %copy.display(), "saved SBOM from attestation");
    }

    let resolution = Resolver::new(resolver_config).resolve_bytes(&bytes)?;
    let resolve = ResolveSummary::from_resolution(&resolution);

    let engine = DownloadEngine::new(download_config)?;
    let downloads = engine.run(resolution.tasks, &archives_dir).await;

    let extraction = if extract_enabled {
        let jobs = downloads
            .files
            .iter()
            .map(|path| {
                let owners = downloads
                    .file_packages
                    .get(path)
                    .cloned()
                    .unwrap_or_default();
                ArchiveJob::new(path.clone(), owners)
            })
            .collect();
        let summary = extract_all(jobs, out_dir, &extract_options).await;
        Some(ExtractionReport::from_summary(out_dir, &summary))
    } else {
        info!("extraction disabled");
        None
    };

    info!(
        tasks = resolve.task_count,
        downloaded = downloads.success_count,
        download_failures = downloads.failure_count,
        "fetch finished"
    );

    Ok(FetchReport {
        input: args.input.input.display().to_string(),
        out_dir: out_dir.display().to_string(),
        resolve,
        downloads: DownloadReport::from_summary(&downloads),
        extraction,
    })
}

#[derive(Serialize)]
pub struct FetchReport {
    pub input: String,
    pub out_dir: String,
    pub resolve: ResolveSummary,
    pub downloads: DownloadReport,
    /// `None` when extraction was disabled.
    pub extraction: Option<ExtractionReport>,
}

#[derive(Serialize)]
pub struct DownloadReport {
    pub succeeded: usize,
    pub failed: usize,
    pub files: Vec<String>,
    pub failures: Vec<DownloadFailure>,
}

#[derive(Serialize)]
pub struct DownloadFailure {
    pub url: String,
    pub owners: Vec<String>,
    pub error: String,
}

impl DownloadReport {
    pub fn from_summary(summary: &DownloadSummary) -> Self {
        Self {
            succeeded: summary.success_count,
            failed: summary.failure_count,
            files: summary
                .files
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            failures: summary
                .failures()
                .map(|outcome| DownloadFailure {
                    url: outcome.url.clone(),
                    owners: outcome.owners.iter().cloned().collect(),
                    error: outcome
                        .result
                        .as_ref()
                        .err()
                        .map(ToString::to_string)
                        .unwrap_or_default(),
                })
                .collect(),
        }
    }
}

impl Render for FetchReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "SBOM: {}", self.input.bold())?;
        self.resolve.render_section(w)?;
        writeln!(w)?;

        writeln!(
            w,
            "Downloaded: {} ok, {} failed (into {}/{})",
            self.downloads.succeeded.to_string().green(),
            self.downloads.failed.to_string().red(),
            self.out_dir,
            ARCHIVES_DIR
        )?;
        for failure in &self.downloads.failures {
            writeln!(
                w,
                "  {} {} [{}]: {}",
                "✗".red().bold(),
                failure.url,
                failure.owners.join(", "),
                failure.error
            )?;
        }

        match &self.extraction {
            Some(extraction) => extraction.render_section(w)?,
            None => writeln!(w, "Extraction: {}", "skipped".dimmed())?,
        }
        Ok(())
    }
}
