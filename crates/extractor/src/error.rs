//! 추출기 도메인 에러 타입
//!
//! [`ExtractorError`]는 아카이브 전체를 포기하게 만드는 실패만 다룹니다.
//! 개별 엔트리 문제는 [`ExtractReport`](crate::ExtractReport)에 기록되며
//! 여기로 올라오지 않습니다.

use sbomfetch_core::error::{ConfigError, ExtractError, SbomfetchError};

/// 아카이브 단위 추출 실패
#[derive(Debug, thiserror::Error)]
pub enum ExtractorError {
    /// 지원하는 아카이브 확장자가 아님
    #[error("unsupported archive format: {archive}")]
    UnsupportedFormat {
        /// 아카이브 경로
        archive: String,
    },

    /// 아카이브 파일 열기 실패
    #[error("failed to open archive {archive}: {source}")]
    Open {
        /// 아카이브 경로
        archive: String,
        /// 원인 I/O 에러
        source: std::io::Error,
    },

    /// 압축 스트림 또는 tar 구조를 읽을 수 없음
    #[error("corrupt archive {archive}: {reason}")]
    Corrupt {
        /// 아카이브 경로
        archive: String,
        /// 디코더 또는 tar 리더 에러 메시지
        reason: String,
    },

    /// 추출한 파일 또는 디렉토리 쓰기 실패
    #[error("failed to write {path}: {source}")]
    Write {
        /// 디스크 상의 대상 경로
        path: String,
        /// 원인 I/O 에러
        source: std::io::Error,
    },

    /// 블로킹 추출 태스크가 완료되지 않음
    #[error("extraction task failed: {0}")]
    Task(String),

    /// 잘못된 옵션 값
    #[error("config error: {field}: {reason}")]
    Config {
        /// 옵션 이름
        field: String,
        /// 사유
        reason: String,
    },
}

impl From<ExtractorError> for SbomfetchError {
    fn from(err: ExtractorError) -> Self {
        match err {
            ExtractorError::UnsupportedFormat { archive } => {
                SbomfetchError::Extract(ExtractError::UnsupportedFormat(archive))
            }
            ExtractorError::Config { field, reason } => {
                SbomfetchError::Config(ConfigError::InvalidValue { field, reason })
            }
            other => SbomfetchError::Extract(ExtractError::Failed(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_format_keeps_archive_name() {
        let err: SbomfetchError = ExtractorError::UnsupportedFormat {
            archive: "openssl-3.3.zip".to_owned(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "extract error: unsupported archive format: openssl-3.3.zip"
        );
    }

    #[test]
    fn corrupt_converts_to_failed() {
        let err: SbomfetchError = ExtractorError::Corrupt {
            archive: "zlib.tar.gz".to_owned(),
            reason: "invalid gzip header".to_owned(),
        }
        .into();
        assert!(matches!(err, SbomfetchError::Extract(ExtractError::Failed(_))));
        assert!(err.to_string().contains("invalid gzip header"));
    }
}
