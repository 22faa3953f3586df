//! `sbomfetch resolve` command handler

use std::io::Write;

use serde::Serialize;

use sbomfetch_core::SbomfetchConfig;
use sbomfetch_resolver::{ResolveCounts, Resolution, Resolver, WarningKind};

use crate::cli::ResolveArgs;
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `resolve` command.
pub async fn execute(
    args: &ResolveArgs,
    config: &SbomfetchConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let report = run(args, config).await?;
    writer.render(&report)
}

/// Read and resolve the SBOM without touching the network.
pub async fn run(args: &ResolveArgs, config: &SbomfetchConfig) -> Result<ResolveReport, CliError> {
    let resolver_config = super::resolver_config(config, &args.input)?;
    let bytes = super::read_document(&args.input, &resolver_config).await?;
    let resolution = Resolver::new(resolver_config).resolve_bytes(&bytes)?;

    Ok(ResolveReport {
        input: args.input.input.display().to_string(),
        summary: ResolveSummary::from_resolution(&resolution),
        tasks: resolution
            .tasks
            .iter()
            .map(|task| TaskEntry {
                url: task.url.clone(),
                owners: task.owners.iter().cloned().collect(),
            })
            .collect(),
    })
}

#[derive(Serialize)]
pub struct ResolveReport {
    pub input: String,
    #[serde(flatten)]
    pub summary: ResolveSummary,
    pub tasks: Vec<TaskEntry>,
}

#[derive(Serialize)]
pub struct TaskEntry {
    pub url: String,
    pub owners: Vec<String>,
}

/// Counts and warnings shared by the `resolve` and `fetch` reports.
#[derive(Serialize)]
pub struct ResolveSummary {
    pub counts: ResolveCounts,
    pub task_count: usize,
    pub warnings: Vec<WarningEntry>,
}

#[derive(Serialize)]
pub struct WarningEntry {
    pub kind: WarningKind,
    pub message: String,
}

impl ResolveSummary {
    pub fn from_resolution(resolution: &Resolution) -> Self {
        Self {
            counts: resolution.counts,
            task_count: resolution.tasks.len(),
            warnings: resolution
                .warnings
                .iter()
                .map(|w| WarningEntry {
                    kind: w.kind,
                    message: w.to_string(),
                })
                .collect(),
        }
    }

    pub(crate) fn render_section(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(
            w,
            "Packages: {}  GENERATED_FROM: {}  Candidates: {}  Tasks: {}",
            self.counts.packages,
            self.counts.relationships,
            self.counts.candidates,
            self.task_count.to_string().bold()
        )?;
        if !self.warnings.is_empty() {
            writeln!(w, "Warnings ({}):", self.warnings.len())?;
            for warning in &self.warnings {
                writeln!(w, "  {} {}", "!".yellow().bold(), warning.message)?;
            }
        }
        Ok(())
    }
}

impl Render for ResolveReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "SBOM: {}", self.input.bold())?;
        self.summary.render_section(w)?;

        if self.tasks.is_empty() {
            writeln!(w, "No downloadable source archives found.")?;
            return Ok(());
        }

        writeln!(w)?;
        writeln!(w, "{:<70} {}", "URL", "Packages")?;
        writeln!(w, "{}", "-".repeat(90))?;
        for task in &self.tasks {
            writeln!(w, "{:<70} {}", task.url, task.owners.join(", "))?;
        }
        Ok(())
    }
}
