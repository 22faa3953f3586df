//! sbomfetch 공통 크레이트
//!
//! SBOM 해석기(resolver), 다운로드 엔진(downloader), 아카이브 추출기(extractor),
//! CLI가 공유하는 타입과 설정, 에러, 메트릭 이름을 정의합니다.
//!
//! # 모듈 구조
//!
//! - [`config`]: `sbomfetch.toml` 파싱 및 환경변수 오버라이드
//! - [`error`]: 최상위 에러 타입 (`SbomfetchError`)
//! - [`metrics`]: 메트릭 이름 상수
//! - [`types`]: 공유 도메인 타입 (`DownloadTask`)

pub mod config;
pub mod error;
pub mod metrics;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, DocumentError, DownloadError, ExtractError, SbomfetchError};

// 설정
pub use config::SbomfetchConfig;

// 도메인 타입
pub use types::{DownloadTask, TARBALL_SUFFIXES, UNKNOWN_OWNER, has_tarball_suffix};
