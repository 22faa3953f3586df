//! 추출 옵션

use std::fmt;

use serde::{Deserialize, Serialize};

use sbomfetch_core::config::MAX_EXTRACT_CONCURRENCY;

use crate::error::ExtractorError;

/// 심볼릭 링크 엔트리를 디스크에 만드는 방식
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SymlinkPolicy {
    /// 대상이 루트 안에 머물 때만 링크 생성
    #[default]
    Contained,
    /// 기록된 대상 그대로 검사 없이 링크 생성
    Verbatim,
    /// 대상 문자열을 담은 일반 파일로 기록
    AsFile,
}

impl SymlinkPolicy {
    /// 정책 이름을 파싱합니다 (대소문자 무시).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "contained" | "strict" => Some(Self::Contained),
            "verbatim" => Some(Self::Verbatim),
            "as-file" | "as_file" | "file" => Some(Self::AsFile),
            _ => None,
        }
    }
}

impl fmt::Display for SymlinkPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contained => write!(f, "contained"),
            Self::Verbatim => write!(f, "verbatim"),
            Self::AsFile => write!(f, "as-file"),
        }
    }
}

/// [`extract`](crate::extract)와 [`extract_all`](crate::extract_all) 옵션
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractOptions {
    /// 심볼릭 링크 처리 정책
    pub symlink_policy: SymlinkPolicy,
    /// unix에서 엔트리 권한 비트 적용 여부
    pub preserve_permissions: bool,
    /// `extract_all`이 동시에 추출하는 아카이브 수
    pub concurrency: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            symlink_policy: SymlinkPolicy::Contained,
            preserve_permissions: true,
            concurrency: 1,
        }
    }
}

impl ExtractOptions {
    /// `[extract]` 설정 섹션으로부터 옵션을 생성합니다.
    pub fn from_core(core: &sbomfetch_core::config::ExtractConfig) -> Self {
        Self {
            symlink_policy: SymlinkPolicy::from_str_loose(&core.symlink_policy).unwrap_or_default(),
            preserve_permissions: core.preserve_permissions,
            concurrency: core.concurrency,
        }
    }

    /// 옵션 값의 범위를 검증합니다.
    ///
    /// # Errors
    ///
    /// `concurrency`가 범위를 벗어나면 `ExtractorError::Config` 반환
    pub fn validate(&self) -> Result<(), ExtractorError> {
        if self.concurrency == 0 || self.concurrency > MAX_EXTRACT_CONCURRENCY {
            return Err(ExtractorError::Config {
                field: "concurrency".to_owned(),
                reason: format!("must be 1-{MAX_EXTRACT_CONCURRENCY}"),
            });
        }
        Ok(())
    }
}

/// [`ExtractOptions`] 빌더
#[derive(Default)]
pub struct ExtractOptionsBuilder {
    options: ExtractOptions,
}

impl ExtractOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn symlink_policy(mut self, policy: SymlinkPolicy) -> Self {
        self.options.symlink_policy = policy;
        self
    }

    pub fn preserve_permissions(mut self, preserve: bool) -> Self {
        self.options.preserve_permissions = preserve;
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.options.concurrency = concurrency;
        self
    }

    /// 검증 후 옵션을 반환합니다.
    ///
    /// # Errors
    ///
    /// 유효성 검증 실패 시 `ExtractorError::Config` 반환
    pub fn build(self) -> Result<ExtractOptions, ExtractorError> {
        self.options.validate()?;
        Ok(self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_contained_and_sequential() {
        let options = ExtractOptions::default();
        options.validate().unwrap();
        assert_eq!(options.symlink_policy, SymlinkPolicy::Contained);
        assert_eq!(options.concurrency, 1);
    }

    #[test]
    fn from_core_maps_policy() {
        let core = sbomfetch_core::config::ExtractConfig {
            enabled: true,
            concurrency: 4,
            symlink_policy: "as-file".to_owned(),
            preserve_permissions: false,
        };
        let options = ExtractOptions::from_core(&core);
        assert_eq!(options.symlink_policy, SymlinkPolicy::AsFile);
        assert_eq!(options.concurrency, 4);
        assert!(!options.preserve_permissions);
    }

    #[test]
    fn unknown_policy_falls_back_to_contained() {
        let core = sbomfetch_core::config::ExtractConfig {
            symlink_policy: "follow".to_owned(),
            ..Default::default()
        };
        assert_eq!(
            ExtractOptions::from_core(&core).symlink_policy,
            SymlinkPolicy::Contained
        );
    }

    #[test]
    fn builder_rejects_zero_concurrency() {
        assert!(ExtractOptionsBuilder::new().concurrency(0).build().is_err());
        assert!(
            ExtractOptionsBuilder::new()
                .concurrency(MAX_EXTRACT_CONCURRENCY + 1)
                .build()
                .is_err()
        );
    }

    #[test]
    fn policy_display_matches_config_names() {
        for policy in [
            SymlinkPolicy::Contained,
            SymlinkPolicy::Verbatim,
            SymlinkPolicy::AsFile,
        ] {
            assert_eq!(SymlinkPolicy::from_str_loose(&policy.to_string()), Some(policy));
        }
    }
}
