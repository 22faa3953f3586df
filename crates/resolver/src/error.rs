//! 관계 해석기 에러 타입
//!
//! [`ResolverError`]는 SBOM 획득, 파싱, 관계 검증 중 발생할 수 있는 모든 에러를 나타냅니다.
//! `From<ResolverError> for SbomfetchError` 구현을 통해 `?` 연산자로
//! 상위 에러 타입으로 전파됩니다.
//!
//! # 에러 카테고리
//!
//! - **문서 파싱**: `DocumentParse`
//! - **관계 검증**: `Validation` (엄격 모드 전용)
//! - **SBOM 획득**: `Source`, `Attestation`, `Io`, `FileTooBig`
//! - **설정**: `Config`

use sbomfetch_core::error::{ConfigError, DocumentError, SbomfetchError};

use crate::resolve::ResolveWarning;

/// 관계 해석기 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    /// SPDX JSON 파싱 실패 (부분 결과 없음)
    #[error("sbom parse error: {0}")]
    DocumentParse(String),

    /// 엄격 모드에서 관계 검증 경고 발생
    #[error("relationship validation failed with {} warning(s)", .0.len())]
    Validation(Vec<ResolveWarning>),

    /// SBOM 바이트를 얻을 수 없음
    #[error("sbom source error: {0}")]
    Source(String),

    /// 어테스테이션에서 SPDX 문서를 추출할 수 없음
    #[error("attestation error: {0}")]
    Attestation(String),

    /// 파일 I/O 에러
    #[error("io error: {path}: {source}")]
    Io {
        /// 관련 파일 경로
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },

    /// 파일 크기 초과
    #[error("file too large: {path}: {size} bytes (max: {max})")]
    FileTooBig {
        /// 파일 경로
        path: String,
        /// 실제 파일 크기 (바이트)
        size: u64,
        /// 최대 허용 크기 (바이트)
        max: u64,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },
}

impl From<ResolverError> for SbomfetchError {
    fn from(err: ResolverError) -> Self {
        match err {
            ResolverError::DocumentParse(reason) => {
                SbomfetchError::Document(DocumentError::ParseFailed { reason })
            }
            ResolverError::Validation(warnings) => {
                let joined = warnings
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                SbomfetchError::Document(DocumentError::Validation(joined))
            }
            ResolverError::Source(msg) | ResolverError::Attestation(msg) => {
                SbomfetchError::Document(DocumentError::SourceUnavailable(msg))
            }
            ResolverError::Io { path, source } => SbomfetchError::Document(
                DocumentError::SourceUnavailable(format!("{path}: {source}")),
            ),
            ResolverError::FileTooBig { path, size, max } => {
                SbomfetchError::Document(DocumentError::SourceUnavailable(format!(
                    "file too large: {path}: {size} bytes (max: {max})"
                )))
            }
            ResolverError::Config { field, reason } => {
                SbomfetchError::Config(ConfigError::InvalidValue { field, reason })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::WarningKind;

    #[test]
    fn parse_error_converts_to_document_error() {
        let err: SbomfetchError = ResolverError::DocumentParse("missing field `packages`".into()).into();
        assert!(matches!(
            err,
            SbomfetchError::Document(DocumentError::ParseFailed { .. })
        ));
        assert!(err.to_string().contains("packages"));
    }

    #[test]
    fn validation_error_lists_warning_count() {
        let err = ResolverError::Validation(vec![
            ResolveWarning::new(WarningKind::MissingSource, "SPDXRef-1", "SPDXRef-9"),
            ResolveWarning::new(WarningKind::UnknownDerived, "SPDXRef-7", "SPDXRef-1"),
        ]);
        assert_eq!(
            err.to_string(),
            "relationship validation failed with 2 warning(s)"
        );
    }

    #[test]
    fn validation_error_converts_with_all_warnings() {
        let err: SbomfetchError = ResolverError::Validation(vec![ResolveWarning::new(
            WarningKind::MissingSource,
            "SPDXRef-2",
            "SPDXRef-404",
        )])
        .into();
        let msg = err.to_string();
        assert!(msg.contains("SPDXRef-404"), "{msg}");
    }

    #[test]
    fn config_error_converts_to_config() {
        let err: SbomfetchError = ResolverError::Config {
            field: "relationship_policy".into(),
            reason: "unknown".into(),
        }
        .into();
        assert!(matches!(err, SbomfetchError::Config(_)));
    }

    #[test]
    fn io_error_keeps_path() {
        let err = ResolverError::Io {
            path: "/tmp/sbom.json".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("/tmp/sbom.json"));
    }
}
