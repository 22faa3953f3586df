//! 에러 타입 — 도메인별 에러 정의
//!
//! 각 도메인 크레이트는 자체 에러 타입을 가지며, `From` 구현을 통해
//! [`SbomfetchError`]로 변환되어 `?` 연산자로 전파됩니다.

/// sbomfetch 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum SbomfetchError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// SBOM 문서 에러 (파싱 실패, 검증 실패, 소스 접근 실패)
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// 다운로드 엔진 에러
    #[error("download error: {0}")]
    Download(#[from] DownloadError),

    /// 아카이브 추출 에러
    #[error("extract error: {0}")]
    Extract(#[from] ExtractError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// SBOM 문서 에러
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// JSON 구조가 잘못됨
    #[error("failed to parse SBOM: {reason}")]
    ParseFailed { reason: String },

    /// 엄격 모드에서 관계 검증 실패
    #[error("relationship validation failed: {0}")]
    Validation(String),

    /// SBOM 바이트를 얻을 수 없음
    #[error("sbom source unavailable: {0}")]
    SourceUnavailable(String),
}

/// 다운로드 엔진 에러
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// HTTP 클라이언트 초기화 실패
    #[error("download setup failed: {0}")]
    Setup(String),

    /// 개별 다운로드 실패
    #[error("download failed: {0}")]
    Failed(String),
}

/// 아카이브 추출 에러
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// 지원하지 않는 아카이브 형식
    #[error("unsupported archive format: {0}")]
    UnsupportedFormat(String),

    /// 추출 실패
    #[error("extraction failed: {0}")]
    Failed(String),
}
