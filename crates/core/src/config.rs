//! 설정 관리 — sbomfetch.toml 파싱 및 런타임 설정
//!
//! [`SbomfetchConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`SBOMFETCH_DOWNLOAD_CONCURRENCY=8` 형식)
//! 3. 설정 파일 (`sbomfetch.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), sbomfetch_core::error::SbomfetchError> {
//! use sbomfetch_core::config::SbomfetchConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = SbomfetchConfig::load("sbomfetch.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = SbomfetchConfig::parse("[download]\nconcurrency = 8")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, SbomfetchError};

/// 다운로드 동시성 상한
pub const MAX_DOWNLOAD_CONCURRENCY: usize = 256;

/// 추출 동시성 상한
pub const MAX_EXTRACT_CONCURRENCY: usize = 64;

/// sbomfetch 통합 설정
///
/// `sbomfetch.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 모듈은 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SbomfetchConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 관계 해석 설정
    #[serde(default)]
    pub resolve: ResolveConfig,
    /// 다운로드 엔진 설정
    #[serde(default)]
    pub download: DownloadConfig,
    /// 아카이브 추출 설정
    #[serde(default)]
    pub extract: ExtractConfig,
}

impl SbomfetchConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SbomfetchError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 기본값에 환경변수 오버라이드만 적용한 설정을 반환합니다.
    ///
    /// 설정 파일 없이 실행할 때 사용합니다.
    pub fn from_env() -> Result<Self, SbomfetchError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, SbomfetchError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SbomfetchError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                SbomfetchError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, SbomfetchError> {
        toml::from_str(toml_str).map_err(|e| {
            SbomfetchError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `SBOMFETCH_{SECTION}_{FIELD}`
    /// 예: `SBOMFETCH_DOWNLOAD_CONCURRENCY=8`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "SBOMFETCH_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "SBOMFETCH_GENERAL_LOG_FORMAT");

        // Resolve
        override_string(
            &mut self.resolve.relationship_policy,
            "SBOMFETCH_RESOLVE_RELATIONSHIP_POLICY",
        );

        // Download
        override_usize(
            &mut self.download.concurrency,
            "SBOMFETCH_DOWNLOAD_CONCURRENCY",
        );
        override_u64(
            &mut self.download.timeout_secs,
            "SBOMFETCH_DOWNLOAD_TIMEOUT_SECS",
        );
        override_u64(
            &mut self.download.connect_timeout_secs,
            "SBOMFETCH_DOWNLOAD_CONNECT_TIMEOUT_SECS",
        );
        override_string(&mut self.download.user_agent, "SBOMFETCH_DOWNLOAD_USER_AGENT");
        override_string(
            &mut self.download.collision_policy,
            "SBOMFETCH_DOWNLOAD_COLLISION_POLICY",
        );

        // Extract
        override_bool(&mut self.extract.enabled, "SBOMFETCH_EXTRACT_ENABLED");
        override_usize(&mut self.extract.concurrency, "SBOMFETCH_EXTRACT_CONCURRENCY");
        override_string(
            &mut self.extract.symlink_policy,
            "SBOMFETCH_EXTRACT_SYMLINK_POLICY",
        );
        override_bool(
            &mut self.extract.preserve_permissions,
            "SBOMFETCH_EXTRACT_PRESERVE_PERMISSIONS",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), SbomfetchError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        let valid_policies = ["warn", "strict"];
        if !valid_policies.contains(&self.resolve.relationship_policy.as_str()) {
            return Err(invalid(
                "resolve.relationship_policy",
                format!("must be one of: {}", valid_policies.join(", ")),
            ));
        }

        if self.download.concurrency == 0 || self.download.concurrency > MAX_DOWNLOAD_CONCURRENCY
        {
            return Err(invalid(
                "download.concurrency",
                format!("must be 1-{MAX_DOWNLOAD_CONCURRENCY}"),
            ));
        }

        let valid_collisions = ["rename", "fail"];
        if !valid_collisions.contains(&self.download.collision_policy.as_str()) {
            return Err(invalid(
                "download.collision_policy",
                format!("must be one of: {}", valid_collisions.join(", ")),
            ));
        }

        if self.download.user_agent.trim().is_empty() {
            return Err(invalid(
                "download.user_agent",
                "user agent must not be empty".to_owned(),
            ));
        }

        if self.extract.concurrency == 0 || self.extract.concurrency > MAX_EXTRACT_CONCURRENCY {
            return Err(invalid(
                "extract.concurrency",
                format!("must be 1-{MAX_EXTRACT_CONCURRENCY}"),
            ));
        }

        let valid_symlinks = ["contained", "verbatim", "as-file"];
        if !valid_symlinks.contains(&self.extract.symlink_policy.as_str()) {
            return Err(invalid(
                "extract.symlink_policy",
                format!("must be one of: {}", valid_symlinks.join(", ")),
            ));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: String) -> SbomfetchError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason,
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 관계 해석 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// GENERATED_FROM 관계 검증 정책 (warn, strict)
    pub relationship_policy: String,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            relationship_policy: "warn".to_owned(),
        }
    }
}

/// 다운로드 엔진 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// 동시 다운로드 워커 수
    pub concurrency: usize,
    /// 요청 전체 타임아웃 (초). 0이면 제한 없음
    pub timeout_secs: u64,
    /// 연결 타임아웃 (초). 0이면 제한 없음
    pub connect_timeout_secs: u64,
    /// HTTP User-Agent
    pub user_agent: String,
    /// 파일명 충돌 처리 정책 (rename, fail)
    pub collision_policy: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            timeout_secs: 600,
            connect_timeout_secs: 30,
            user_agent: format!("sbomfetch/{}", env!("CARGO_PKG_VERSION")),
            collision_policy: "rename".to_owned(),
        }
    }
}

/// 아카이브 추출 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// 다운로드 후 추출 여부
    pub enabled: bool,
    /// 동시에 추출할 아카이브 수 (1이면 순차)
    pub concurrency: usize,
    /// 심볼릭 링크 처리 정책 (contained, verbatim, as-file)
    pub symlink_policy: String,
    /// 엔트리의 권한 비트 적용 여부
    pub preserve_permissions: bool,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            concurrency: 1,
            symlink_policy: "contained".to_owned(),
            preserve_permissions: true,
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
