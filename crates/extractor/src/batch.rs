//! 여러 아카이브의 병렬 추출
//!
//! 아카이브마다 블로킹 스레드에서 실행됩니다. `concurrency == 1`이면
//! 입력 순서대로 하나씩 추출합니다. 실패한 아카이브는 기록만 되고
//! 다른 아카이브를 멈추지 않습니다.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::StreamExt;
use futures::stream;
use tracing::{info, warn};

use sbomfetch_core::types::UNKNOWN_OWNER;

use crate::error::ExtractorError;
use crate::options::ExtractOptions;
use crate::unpack::{ExtractReport, extract};

/// 추출할 아카이브 하나와 그 소유 패키지
#[derive(Debug, Clone)]
pub struct ArchiveJob {
    /// 디스크 상의 아카이브 경로
    pub path: PathBuf,
    /// 소유 패키지 이름 (보고용)
    pub owners: BTreeSet<String>,
}

impl ArchiveJob {
    /// 작업을 생성합니다. 소유자가 비어 있으면 `{"unknown"}`이 됩니다.
    pub fn new<I, S>(path: impl Into<PathBuf>, owners: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut owners: BTreeSet<String> = owners.into_iter().map(Into::into).collect();
        if owners.is_empty() {
            owners.insert(UNKNOWN_OWNER.to_owned());
        }
        Self {
            path: path.into(),
            owners,
        }
    }

    fn owner_list(&self) -> String {
        self.owners.iter().cloned().collect::<Vec<_>>().join(", ")
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// 아카이브 하나의 결과
#[derive(Debug)]
pub struct ArchiveResult {
    /// 이 결과를 만든 작업
    pub job: ArchiveJob,
    /// 성공 시 보고서, 실패 시 아카이브 단위 에러
    pub result: Result<ExtractReport, ExtractorError>,
}

/// [`extract_all`]의 집계 결과
#[derive(Debug, Default)]
pub struct ExtractionSummary {
    /// 스트림 끝까지 추출된 아카이브 수
    pub success_count: usize,
    /// 실패한 아카이브 수
    pub failure_count: usize,
    /// 아카이브별 결과 (완료 순서)
    pub results: Vec<ArchiveResult>,
}

impl ExtractionSummary {
    /// 시도한 아카이브 총 개수
    pub fn total(&self) -> usize {
        self.success_count + self.failure_count
    }

    /// 성공한 모든 아카이브에서 건너뛴 엔트리 수
    pub fn skipped_entries(&self) -> usize {
        self.results
            .iter()
            .filter_map(|r| r.result.as_ref().ok())
            .map(|report| report.skipped.len())
            .sum()
    }
}

/// 모든 아카이브를 `root` 아래에 추출합니다.
///
/// 동시에 처리하는 아카이브는 최대 `options.concurrency`개입니다.
/// 아카이브별 실패는 요약에 기록되므로 이 함수 자체는 실패하지 않습니다.
pub async fn extract_all(
    archives: Vec<ArchiveJob>,
    root: &Path,
    options: &ExtractOptions,
) -> ExtractionSummary {
    let total = archives.len();
    let concurrency = options.concurrency.max(1);
    let root = Arc::new(root.to_path_buf());
    let options = Arc::new(options.clone());

    info!(archives = total, concurrency, root = %root.display(), "starting extraction");

    let results: Vec<ArchiveResult> = stream::iter(archives.into_iter().enumerate())
        .map(|(i, job)| {
            let root = Arc::clone(&root);
            let options = Arc::clone(&options);
            async move {
                info!(
                    index = i + 1,
                    total,
                    file = %job.file_name(),
                    owners = %job.owner_list(),
                    "extracting"
                );
                let path = job.path.clone();
                let result = tokio::task::spawn_blocking(move || extract(&path, &root, &options))
                    .await
                    .unwrap_or_else(|e| Err(ExtractorError::Task(e.to_string())));

                match &result {
                    Ok(report) => info!(
                        file = %job.file_name(),
                        owners = %job.owner_list(),
                        files = report.files,
                        skipped = report.skipped.len(),
                        "extracted"
                    ),
                    Err(e) => warn!(archive = %job.path.display(), error = %e, "extraction failed"),
                }
                ArchiveResult { job, result }
            }
        })
        .buffer_unordered(concurrency)
        .collect()
        .await;

    let mut summary = ExtractionSummary::default();
    for result in results {
        if result.result.is_ok() {
            summary.success_count += 1;
        } else {
            summary.failure_count += 1;
        }
        summary.results.push(result);
    }

    info!(
        success = summary.success_count,
        failure = summary.failure_count,
        "extraction finished"
    );
    summary
}
