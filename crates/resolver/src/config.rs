//! 관계 해석기 설정
//!
//! [`ResolverConfig`]는 core의 [`ResolveConfig`](sbomfetch_core::config::ResolveConfig)를
//! 타입 있는 값으로 변환하고 해석기 고유 설정(SBOM 파일 크기 제한)을 추가합니다.
//!
//! # 사용 예시
//!
//! ```
//! use sbomfetch_resolver::{RelationshipPolicy, ResolverConfigBuilder};
//!
//! let config = ResolverConfigBuilder::new()
//!     .relationship_policy(RelationshipPolicy::Strict)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.relationship_policy, RelationshipPolicy::Strict);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ResolverError;

/// GENERATED_FROM 관계 검증 정책
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipPolicy {
    /// 경고를 기록하고 계속 진행
    #[default]
    Warn,
    /// 경고가 하나라도 있으면 해석 실패
    Strict,
}

impl RelationshipPolicy {
    /// 대소문자를 구분하지 않고 문자열에서 정책을 파싱합니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "warn" | "warning" => Some(Self::Warn),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }
}

impl fmt::Display for RelationshipPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warn => write!(f, "warn"),
            Self::Strict => write!(f, "strict"),
        }
    }
}

/// 관계 해석기 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// 관계 검증 정책
    pub relationship_policy: RelationshipPolicy,

    // --- 모듈 고유 확장 ---
    /// SBOM 입력 파일 최대 크기 (바이트)
    pub max_document_size: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            relationship_policy: RelationshipPolicy::Warn,
            max_document_size: 256 * 1024 * 1024, // 256 MB
        }
    }
}

/// SBOM 파일 크기 상한 (1 GB)
const MAX_DOCUMENT_SIZE_LIMIT: u64 = 1024 * 1024 * 1024;

impl ResolverConfig {
    /// core의 `ResolveConfig`에서 해석기 설정을 생성합니다.
    ///
    /// 알 수 없는 정책 문자열은 `Warn`으로 대체합니다.
    pub fn from_core(core: &sbomfetch_core::config::ResolveConfig) -> Self {
        Self {
            relationship_policy: RelationshipPolicy::from_str_loose(&core.relationship_policy)
                .unwrap_or_default(),
            ..Self::default()
        }
    }

    /// 설정 값의 유효성을 검증합니다.
    ///
    /// - `max_document_size`: 1-1073741824 (1GB)
    pub fn validate(&self) -> Result<(), ResolverError> {
        if self.max_document_size == 0 || self.max_document_size > MAX_DOCUMENT_SIZE_LIMIT {
            return Err(ResolverError::Config {
                field: "max_document_size".to_owned(),
                reason: format!("must be 1-{MAX_DOCUMENT_SIZE_LIMIT}"),
            });
        }
        Ok(())
    }
}

/// [`ResolverConfig`] 빌더
#[derive(Default)]
pub struct ResolverConfigBuilder {
    config: ResolverConfig,
}

impl ResolverConfigBuilder {
    /// 기본값을 가진 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 관계 검증 정책을 설정합니다.
    pub fn relationship_policy(mut self, policy: RelationshipPolicy) -> Self {
        self.config.relationship_policy = policy;
        self
    }

    /// SBOM 파일 최대 크기(바이트)를 설정합니다.
    pub fn max_document_size(mut self, size: u64) -> Self {
        self.config.max_document_size = size;
        self
    }

    /// 설정을 검증하고 빌드합니다.
    ///
    /// # Errors
    ///
    /// 유효성 검증 실패 시 `ResolverError::Config` 반환
    pub fn build(self) -> Result<ResolverConfig, ResolverError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
