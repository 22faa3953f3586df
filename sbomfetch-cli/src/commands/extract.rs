//! `sbomfetch extract` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use sbomfetch_core::SbomfetchConfig;
use sbomfetch_extractor::{ArchiveJob, ExtractOptions, ExtractionSummary, SkippedEntry, extract_all};

use crate::cli::ExtractArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `extract` command.
pub async fn execute(
    args: &ExtractArgs,
    config: &SbomfetchConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let report = run(args, config).await?;
    writer.render(&report)
}

/// Extract local archives. Per-archive failures end up in the report.
pub async fn run(args: &ExtractArgs, config: &SbomfetchConfig) -> Result<ExtractionReport, CliError> {
    let mut options = ExtractOptions::from_core(&config.extract);
    if let Some(concurrency) = args.concurrency {
        options.concurrency = concurrency;
    }
    options.validate()?;

    tokio::fs::create_dir_all(&args.into).await?;
    info!(root = %args.into.display(), archives = args.archives.len(), "extracting local archives");

    let jobs = args
        .archives
        .iter()
        .map(|path| ArchiveJob::new(path.clone(), Vec::<String>::new()))
        .collect();
    let summary = extract_all(jobs, &args.into, &options).await;
    Ok(ExtractionReport::from_summary(&args.into, &summary))
}

/// Extraction results, also embedded in the `fetch` report.
#[derive(Serialize)]
pub struct ExtractionReport {
    pub root: String,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped_entries: usize,
    pub archives: Vec<ArchiveEntry>,
}

#[derive(Serialize)]
pub struct ArchiveEntry {
    pub archive: String,
    pub owners: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    pub files: usize,
    pub skipped: Vec<SkippedEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractionReport {
    pub fn from_summary(root: &Path, summary: &ExtractionSummary) -> Self {
        let archives = summary
            .results
            .iter()
            .map(|r| {
                let mut entry = ArchiveEntry {
                    archive: r.job.path.display().to_string(),
                    owners: r.job.owners.iter().cloned().collect(),
                    format: None,
                    files: 0,
                    skipped: Vec::new(),
                    error: None,
                };
                match &r.result {
                    Ok(report) => {
                        entry.format = Some(report.format.to_string());
                        entry.files = report.files;
                        entry.skipped = report.skipped.clone();
                    }
                    Err(e) => entry.error = Some(e.to_string()),
                }
                entry
            })
            .collect();

        Self {
            root: root.display().to_string(),
            succeeded: summary.success_count,
            failed: summary.failure_count,
            skipped_entries: summary.skipped_entries(),
            archives,
        }
    }

    pub(crate) fn render_section(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Extracted: {} ok, {} failed, {} entries skipped (root: {})",
            self.succeeded.to_string().green(),
            self.failed.to_string().red(),
            self.skipped_entries,
            self.root
        )?;
        for entry in &self.archives {
            match &entry.error {
                Some(error) => writeln!(
                    w,
                    "  {} {} [{}]: {}",
                    "✗".red().bold(),
                    entry.archive,
                    entry.owners.join(", "),
                    error
                )?,
                None if !entry.skipped.is_empty() => {
                    writeln!(
                        w,
                        "  {} {} ({} files, {} skipped)",
                        "!".yellow().bold(),
                        entry.archive,
                        entry.files,
                        entry.skipped.len()
                    )?;
                    for skipped in &entry.skipped {
                        writeln!(w, "      {}: {}", skipped.entry, skipped.reason)?;
                    }
                }
                None => {}
            }
        }
        Ok(())
    }
}

impl Render for ExtractionReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        self.render_section(w)
    }
}
