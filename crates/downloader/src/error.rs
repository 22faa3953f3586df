//! 다운로드 엔진 에러 타입
//!
//! [`DownloaderError`]는 개별 다운로드 실패와 엔진 초기화 실패를 모두 표현합니다.
//! 개별 실패는 [`DownloadOutcome`](crate::DownloadOutcome)에 기록되고
//! 실행 전체를 중단시키지 않습니다.

use sbomfetch_core::error::{ConfigError, DownloadError, SbomfetchError};

/// 다운로드 엔진 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum DownloaderError {
    /// 2xx가 아닌 HTTP 응답
    #[error("bad status: {status} for {url}")]
    Http {
        /// 요청 URL
        url: String,
        /// 응답 상태 코드
        status: u16,
    },

    /// 연결, TLS, 본문 스트림 등 전송 계층 실패
    #[error("transport error for {url}: {reason}")]
    Transport {
        /// 요청 URL
        url: String,
        /// 실패 사유
        reason: String,
    },

    /// 로컬 파일 쓰기 실패
    #[error("io error: {path}: {source}")]
    Io {
        /// 관련 파일 경로
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },

    /// 다른 URL과 같은 파일명으로 귀결됨 (`fail` 충돌 정책)
    #[error("filename collision: {url} and {other_url} both map to {path}")]
    Collision {
        /// 건너뛴 URL
        url: String,
        /// 먼저 파일명을 차지한 URL
        other_url: String,
        /// 충돌한 대상 경로
        path: String,
    },

    /// 작업을 처리하던 워커가 결과 없이 종료됨
    #[error("worker terminated before reporting {url}")]
    WorkerLost {
        /// 처리 중이던 URL
        url: String,
    },

    /// HTTP 클라이언트 초기화 실패
    #[error("client setup error: {0}")]
    ClientBuild(String),

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },
}

impl From<DownloaderError> for SbomfetchError {
    fn from(err: DownloaderError) -> Self {
        match err {
            DownloaderError::Config { field, reason } => {
                SbomfetchError::Config(ConfigError::InvalidValue { field, reason })
            }
            DownloaderError::ClientBuild(msg) => SbomfetchError::Download(DownloadError::Setup(msg)),
            other => SbomfetchError::Download(DownloadError::Failed(other.to_string())),
        }
    }
}
