//! 워커 풀과 결과 집계
//!
//! 고정된 수의 워커가 공유 큐에서 작업을 가져갑니다. 큐는 실행 가능한
//! 모든 작업으로 채워진 뒤 닫힙니다. 워커는 작업마다 결과 하나를 보냅니다.
//! 코디네이터가 워커를 모두 join한 뒤 마지막 결과 송신자를 drop하면
//! 집계기는 채널이 닫힐 때까지 결과를 모읍니다.
//! 보고 없이 워커가 죽은 작업에는 실패 결과를 대신 만들어 넣습니다.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use metrics::counter;
use tokio::sync::{Mutex, mpsc};
use tracing::{info, warn};

use sbomfetch_core::metrics as m;
use sbomfetch_core::types::DownloadTask;

use crate::config::DownloaderConfig;
use crate::error::DownloaderError;
use crate::fetcher::{ArchiveFetcher, HttpFetcher};
use crate::filename::{filename_from_url, plan_destinations};

/// 다운로드 작업 하나의 결과
#[derive(Debug)]
pub struct DownloadOutcome {
    /// 아카이브 URL
    pub url: String,
    /// 작업에서 복사한 소유 패키지 이름
    pub owners: BTreeSet<String>,
    /// 계획된 저장 경로
    pub destination: PathBuf,
    /// 성공 시 기록한 바이트 수, 실패 시 원인
    pub result: Result<u64, DownloaderError>,
}

impl DownloadOutcome {
    /// 아카이브를 끝까지 기록했으면 `true`를 반환합니다.
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// 다운로드 실행의 집계 결과
#[derive(Debug, Default)]
pub struct DownloadSummary {
    /// 성공한 다운로드 수
    pub success_count: usize,
    /// 실패한 다운로드 수
    pub failure_count: usize,
    /// 성공한 다운로드의 저장 경로 (완료 순서)
    pub files: Vec<PathBuf>,
    /// 성공한 다운로드의 저장 경로 -> 소유 패키지 이름
    pub file_packages: HashMap<PathBuf, BTreeSet<String>>,
    /// 모든 결과 (완료 순서)
    pub outcomes: Vec<DownloadOutcome>,
}

impl DownloadSummary {
    /// 결과 총 개수
    pub fn total(&self) -> usize {
        self.success_count + self.failure_count
    }

    /// 실패한 결과 (완료 순서)
    pub fn failures(&self) -> impl Iterator<Item = &DownloadOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    fn record(&mut self, outcome: DownloadOutcome) {
        match &outcome.result {
            Ok(_) => {
                self.success_count += 1;
                self.files.push(outcome.destination.clone());
                self.file_packages
                    .insert(outcome.destination.clone(), outcome.owners.clone());
            }
            Err(_) => self.failure_count += 1,
        }
        self.outcomes.push(outcome);
    }
}

struct Job {
    index: usize,
    total: usize,
    task: DownloadTask,
    destination: PathBuf,
}

/// 동시성 제한 다운로드 엔진
pub struct DownloadEngine<F: ArchiveFetcher = HttpFetcher> {
    fetcher: Arc<F>,
    config: DownloaderConfig,
}

impl DownloadEngine<HttpFetcher> {
    /// `config`로 만든 reqwest 클라이언트를 쓰는 엔진을 생성합니다.
    ///
    /// # Errors
    ///
    /// - `DownloaderError::Config`: 설정 값 검증 실패
    /// - `DownloaderError::ClientBuild`: HTTP 클라이언트 생성 실패
    pub fn new(config: DownloaderConfig) -> Result<Self, DownloaderError> {
        config.validate()?;
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self {
            fetcher: Arc::new(fetcher),
            config,
        })
    }
}

impl<F: ArchiveFetcher> DownloadEngine<F> {
    /// 사용자 지정 fetcher로 엔진을 생성합니다.
    ///
    /// # Errors
    ///
    /// 설정 값 검증 실패 시 `DownloaderError::Config` 반환
    pub fn with_fetcher(fetcher: F, config: DownloaderConfig) -> Result<Self, DownloaderError> {
        config.validate()?;
        Ok(Self {
            fetcher: Arc::new(fetcher),
            config,
        })
    }

    /// 엔진 설정을 반환합니다.
    pub fn config(&self) -> &DownloaderConfig {
        &self.config
    }

    /// 모든 작업을 이미 존재하는 `dest_dir`에 다운로드합니다.
    ///
    /// 작업마다 정확히 하나의 결과를 반환합니다. 작업별 실패는 요약에
    /// 기록되며 다른 다운로드를 중단시키지 않습니다.
    pub async fn run(&self, tasks: Vec<DownloadTask>, dest_dir: &Path) -> DownloadSummary {
        let total = tasks.len();
        let mut summary = DownloadSummary::default();
        if total == 0 {
            return summary;
        }

        let (job_tx, job_rx) = mpsc::unbounded_channel::<Job>();
        let (result_tx, mut result_rx) = mpsc::unbounded_channel::<(usize, DownloadOutcome)>();

        // 아직 결과를 보고하지 않은 작업: index -> (task, destination)
        let mut pending: BTreeMap<usize, (DownloadTask, PathBuf)> = BTreeMap::new();

        let plan = plan_destinations(&tasks, dest_dir, self.config.collision_policy);
        for (i, planned) in plan.into_iter().enumerate() {
            let index = i + 1;
            match planned.destination {
                Ok(destination) => {
                    pending.insert(index, (planned.task.clone(), destination.clone()));
                    // 워커가 끝날 때까지 수신자는 살아 있음
                    let _ = job_tx.send(Job {
                        index,
                        total,
                        task: planned.task,
                        destination,
                    });
                }
                Err(e) => {
                    warn!(url = %planned.task.url, error = %e, "skipping download");
                    let outcome = DownloadOutcome {
                        destination: dest_dir.join(filename_from_url(&planned.task.url)),
                        url: planned.task.url,
                        owners: planned.task.owners,
                        result: Err(e),
                    };
                    count_outcome(&outcome);
                    summary.record(outcome);
                }
            }
        }
        drop(job_tx);

        let workers = self.config.concurrency.clamp(1, pending.len().max(1));
        info!(
            tasks = total,
            runnable = pending.len(),
            workers,
            dir = %dest_dir.display(),
            "starting downloads"
        );

        let job_rx = Arc::new(Mutex::new(job_rx));
        let handles: Vec<_> = (0..workers)
            .map(|id| {
                tokio::spawn(worker(
                    id,
                    Arc::clone(&self.fetcher),
                    Arc::clone(&job_rx),
                    result_tx.clone(),
                ))
            })
            .collect();

        let coordinator = tokio::spawn(async move {
            for handle in handles {
                if let Err(e) = handle.await {
                    warn!(error = %e, "download worker terminated abnormally");
                }
            }
            drop(result_tx);
        });

        while let Some((index, outcome)) = result_rx.recv().await {
            pending.remove(&index);
            summary.record(outcome);
        }

        if let Err(e) = coordinator.await {
            warn!(error = %e, "download coordinator failed");
        }

        for (_, (task, destination)) in pending {
            warn!(url = %task.url, "no outcome reported, recording failure");
            let outcome = DownloadOutcome {
                result: Err(DownloaderError::WorkerLost {
                    url: task.url.clone(),
                }),
                url: task.url,
                owners: task.owners,
                destination,
            };
            count_outcome(&outcome);
            summary.record(outcome);
        }

        info!(
            success = summary.success_count,
            failure = summary.failure_count,
            "downloads finished"
        );
        summary
    }
}

async fn worker<F: ArchiveFetcher>(
    id: usize,
    fetcher: Arc<F>,
    jobs: Arc<Mutex<mpsc::UnboundedReceiver<Job>>>,
    results: mpsc::UnboundedSender<(usize, DownloadOutcome)>,
) {
    loop {
        // 작업을 꺼내는 동안만 락 보유
        let job = jobs.lock().await.recv().await;
        let Some(job) = job else {
            break;
        };

        let file = job
            .destination
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!(
            worker = id,
            index = job.index,
            total = job.total,
            file = %file,
            owners = %job.task.owner_list(),
            "starting download"
        );

        let result = fetcher.fetch(&job.task.url, &job.destination).await;
        match &result {
            Ok(bytes) => info!(file = %file, bytes, owners = %job.task.owner_list(), "downloaded"),
            Err(e) => warn!(url = %job.task.url, error = %e, "download failed"),
        }

        let outcome = DownloadOutcome {
            url: job.task.url,
            owners: job.task.owners,
            destination: job.destination,
            result,
        };
        count_outcome(&outcome);

        if results.send((job.index, outcome)).is_err() {
            break;
        }
    }
}

fn count_outcome(outcome: &DownloadOutcome) {
    match &outcome.result {
        Ok(bytes) => {
            counter!(m::DOWNLOADS_TOTAL, m::LABEL_RESULT => m::RESULT_SUCCESS).increment(1);
            counter!(m::DOWNLOAD_BYTES_TOTAL).increment(*bytes);
        }
        Err(_) => {
            counter!(m::DOWNLOADS_TOTAL, m::LABEL_RESULT => m::RESULT_FAILURE).increment(1);
        }
    }
}
