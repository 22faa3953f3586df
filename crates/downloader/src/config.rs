//! 다운로드 엔진 설정
//!
//! [`DownloaderConfig`]는 core의 [`DownloadConfig`](sbomfetch_core::config::DownloadConfig)를
//! 타입 있는 값으로 변환합니다.
//!
//! # 사용 예시
//! ```
//! use sbomfetch_downloader::{CollisionPolicy, DownloaderConfigBuilder};
//!
//! let config = DownloaderConfigBuilder::new()
//!     .concurrency(8)
//!     .collision_policy(CollisionPolicy::Fail)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.concurrency, 8);
//! ```

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use sbomfetch_core::config::MAX_DOWNLOAD_CONCURRENCY;

use crate::error::DownloaderError;

/// 서로 다른 URL이 같은 파일명으로 귀결될 때의 처리 정책
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// 뒤에 오는 URL의 파일명에 URL 해시를 붙임
    #[default]
    Rename,
    /// 뒤에 오는 URL을 실패로 기록하고 다운로드하지 않음
    Fail,
}

impl CollisionPolicy {
    /// 대소문자를 구분하지 않고 문자열에서 정책을 파싱합니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "rename" | "hash" => Some(Self::Rename),
            "fail" | "error" => Some(Self::Fail),
            _ => None,
        }
    }
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rename => write!(f, "rename"),
            Self::Fail => write!(f, "fail"),
        }
    }
}

/// 다운로드 엔진 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloaderConfig {
    /// 워커 수
    pub concurrency: usize,
    /// 요청 전체 타임아웃 (초). 0이면 제한 없음
    pub timeout_secs: u64,
    /// 연결 타임아웃 (초). 0이면 제한 없음
    pub connect_timeout_secs: u64,
    /// HTTP User-Agent
    pub user_agent: String,
    /// 파일명 충돌 정책
    pub collision_policy: CollisionPolicy,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self::from_core(&sbomfetch_core::config::DownloadConfig::default())
    }
}

impl DownloaderConfig {
    /// core의 `DownloadConfig`에서 엔진 설정을 생성합니다.
    pub fn from_core(core: &sbomfetch_core::config::DownloadConfig) -> Self {
        Self {
            concurrency: core.concurrency,
            timeout_secs: core.timeout_secs,
            connect_timeout_secs: core.connect_timeout_secs,
            user_agent: core.user_agent.clone(),
            collision_policy: CollisionPolicy::from_str_loose(&core.collision_policy)
                .unwrap_or_default(),
        }
    }

    /// 요청 타임아웃 (0이면 `None`)
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// 연결 타임아웃 (0이면 `None`)
    pub fn connect_timeout(&self) -> Option<Duration> {
        (self.connect_timeout_secs > 0).then(|| Duration::from_secs(self.connect_timeout_secs))
    }

    /// 설정 값의 유효성을 검증합니다.
    ///
    /// - `concurrency`: 1-256
    /// - `user_agent`: 비어 있으면 안 됨
    pub fn validate(&self) -> Result<(), DownloaderError> {
        if self.concurrency == 0 || self.concurrency > MAX_DOWNLOAD_CONCURRENCY {
            return Err(DownloaderError::Config {
                field: "concurrency".to_owned(),
                reason: format!("must be 1-{MAX_DOWNLOAD_CONCURRENCY}"),
            });
        }

        if self.user_agent.trim().is_empty() {
            return Err(DownloaderError::Config {
                field: "user_agent".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        Ok(())
    }
}

/// [`DownloaderConfig`] 빌더
#[derive(Default)]
pub struct DownloaderConfigBuilder {
    config: DownloaderConfig,
}

impl DownloaderConfigBuilder {
    /// 기본값을 가진 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 워커 수를 설정합니다.
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = concurrency;
        self
    }

    /// 요청 타임아웃(초)을 설정합니다.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    /// 연결 타임아웃(초)을 설정합니다.
    pub fn connect_timeout_secs(mut self, secs: u64) -> Self {
        self.config.connect_timeout_secs = secs;
        self
    }

    /// User-Agent를 설정합니다.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// 파일명 충돌 정책을 설정합니다.
    pub fn collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.config.collision_policy = policy;
        self
    }

    /// 설정을 검증하고 빌드합니다.
    ///
    /// # Errors
    ///
    /// 유효성 검증 실패 시 `DownloaderError::Config` 반환
    pub fn build(self) -> Result<DownloaderConfig, DownloaderError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
