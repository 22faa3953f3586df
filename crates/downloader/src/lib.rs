//! # sbomfetch-downloader
//!
//! 해석된 소스 아카이브를 고정 크기 워커 풀로 내려받습니다.
//!
//! 엔진은 해석기가 만든 [`DownloadTask`](sbomfetch_core::DownloadTask) 목록을 받아
//! URL마다 서로 다른 저장 파일 이름을 정하고 각 아카이브를 디스크로 스트리밍합니다.
//! 작업마다 정확히 하나의 [`DownloadOutcome`]이 나오며, 실패한 작업이
//! 다른 작업을 중단시키지 않습니다.
//!
//! # Architecture
//!
//! ```text
//! tasks ──> plan_destinations ──> job queue ──┬─> worker 1 ─┐
//!                                             ├─> worker 2 ─┼─> results ──> DownloadSummary
//!                                             └─> worker N ─┘
//!                                                   │
//!                                             ArchiveFetcher (trait)
//!                                               │         │
//!                                          HttpFetcher   Mock (tests)
//! ```
//!
//! # Module Structure
//!
//! - [`engine`]: 워커 풀과 결과 집계 (`DownloadEngine`, `DownloadSummary`)
//! - [`fetcher`]: HTTP 전송 추상화 (`ArchiveFetcher`, `HttpFetcher`)
//! - [`filename`]: URL에서 파일 이름 도출과 충돌 계획
//! - [`config`]: 엔진 설정과 빌더
//! - [`error`]: 도메인 에러 타입 (`DownloaderError`)

pub mod config;
pub mod engine;
pub mod error;
pub mod fetcher;
pub mod filename;

pub use config::{CollisionPolicy, DownloaderConfig, DownloaderConfigBuilder};
pub use engine::{DownloadEngine, DownloadOutcome, DownloadSummary};
pub use error::DownloaderError;
pub use fetcher::{ArchiveFetcher, HttpFetcher};
pub use filename::{PlannedDownload, filename_from_url, plan_destinations};
