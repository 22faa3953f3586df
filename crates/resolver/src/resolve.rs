//! GENERATED_FROM 관계 해석
//!
//! 패키지와 관계 레코드로부터 URL별 다운로드 작업 목록을 만듭니다.
//!
//! # 알고리즘
//!
//! 1. 패키지를 SPDXID로 색인 (중복 시 마지막 항목 우선, 조회에만 사용)
//! 2. `GENERATED_FROM` 관계를 소스 SPDXID → 파생 패키지 이름으로 역색인
//! 3. 모든 패키지 중 http/https tarball 위치를 가진 패키지를 후보로 선택
//! 4. 같은 URL의 후보를 하나의 작업으로 묶고 소유자를 합집합으로 병합
//!
//! 결과는 URL 순으로 정렬되어 실행마다 동일합니다.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use sbomfetch_core::metrics as m;
use sbomfetch_core::types::{DownloadTask, UNKNOWN_OWNER, has_tarball_suffix};

use crate::config::{RelationshipPolicy, ResolverConfig};
use crate::error::ResolverError;
use crate::spdx::{SpdxDocument, SpdxPackage, SpdxRelationship};

/// 관계 검증 경고 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// 관계가 가리키는 소스 패키지가 문서에 없음
    MissingSource,
    /// 소스 패키지에 사용 가능한 다운로드 위치가 없음
    SourceWithoutLocation,
    /// 관계의 파생 패키지가 문서에 없음 (소유자에 기여하지 않음)
    UnknownDerived,
}

/// 관계 검증 경고
///
/// 해석 결과에는 영향을 주지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveWarning {
    /// 경고 종류
    pub kind: WarningKind,
    /// 관계의 파생 패키지 식별자 (`spdxElementId`)
    pub derived: String,
    /// 관계의 소스 패키지 식별자 (`relatedSpdxElement`)
    pub source: String,
}

impl ResolveWarning {
    /// 새 경고를 생성합니다.
    pub fn new(kind: WarningKind, derived: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            kind,
            derived: derived.into(),
            source: source.into(),
        }
    }
}

impl fmt::Display for ResolveWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            WarningKind::MissingSource => write!(
                f,
                "{} is generated from non-existent source package {}",
                self.derived, self.source
            ),
            WarningKind::SourceWithoutLocation => write!(
                f,
                "{} is generated from {} which lacks a downloadLocation",
                self.derived, self.source
            ),
            WarningKind::UnknownDerived => write!(
                f,
                "relationship from unknown package {} to {} ignored",
                self.derived, self.source
            ),
        }
    }
}

/// 해석 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveCounts {
    /// 문서의 패키지 수
    pub packages: usize,
    /// 검토한 `GENERATED_FROM` 관계 수
    pub relationships: usize,
    /// 다운로드 후보 패키지 수 (URL 병합 전)
    pub candidates: usize,
}

/// 해석 결과
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Resolution {
    /// URL 순으로 정렬된 다운로드 작업
    pub tasks: Vec<DownloadTask>,
    /// 관계 검증 경고
    pub warnings: Vec<ResolveWarning>,
    /// 해석 통계
    pub counts: ResolveCounts,
}

/// 다운로드 위치가 가져올 수 있는 tarball URL인지 확인합니다.
///
/// http/https 스킴이고 URL 경로가 지원 접미사로 끝나야 합니다.
/// 쿼리 문자열과 프래그먼트는 판정에 쓰지 않습니다.
pub fn is_candidate_location(location: &str) -> bool {
    let Ok(url) = Url::parse(location) else {
        return false;
    };
    matches!(url.scheme(), "http" | "https") && has_tarball_suffix(url.path())
}

/// 패키지와 관계로부터 다운로드 작업을 만듭니다. I/O를 하지 않는 순수 함수입니다.
pub fn resolve(packages: &[SpdxPackage], relationships: &[SpdxRelationship]) -> Resolution {
    let by_id: HashMap<&str, &SpdxPackage> = packages
        .iter()
        .map(|pkg| (pkg.spdx_id.as_str(), pkg))
        .collect();

    let mut warnings = Vec::new();
    let mut considered = 0usize;
    let mut owners_of: HashMap<&str, Vec<&str>> = HashMap::new();

    for rel in relationships.iter().filter(|r| r.is_generated_from()) {
        considered += 1;

        let Some(derived) = by_id.get(rel.spdx_element_id.as_str()) else {
            warnings.push(ResolveWarning::new(
                WarningKind::UnknownDerived,
                &rel.spdx_element_id,
                &rel.related_spdx_element,
            ));
            continue;
        };

        owners_of
            .entry(rel.related_spdx_element.as_str())
            .or_default()
            .push(derived.name.as_str());

        match by_id.get(rel.related_spdx_element.as_str()) {
            None => warnings.push(ResolveWarning::new(
                WarningKind::MissingSource,
                &rel.spdx_element_id,
                &rel.related_spdx_element,
            )),
            Some(source) if source.location().is_none() => warnings.push(ResolveWarning::new(
                WarningKind::SourceWithoutLocation,
                &rel.spdx_element_id,
                &rel.related_spdx_element,
            )),
            Some(_) => {}
        }
    }

    // 마지막 항목 우선은 조회 인덱스에만 적용; 후보는 모든 패키지에서 고름
    let mut grouped: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    let mut candidates = 0usize;
    for pkg in packages {
        let Some(location) = pkg.location().filter(|loc| is_candidate_location(loc)) else {
            continue;
        };
        candidates += 1;

        let names = grouped.entry(location).or_default();
        match owners_of.get(pkg.spdx_id.as_str()) {
            Some(owners) if !owners.is_empty() => names.extend(owners.iter().copied()),
            _ => {
                names.insert(UNKNOWN_OWNER);
            }
        }
    }

    let tasks = grouped
        .into_iter()
        .map(|(url, owners)| DownloadTask::new(url, owners))
        .collect();

    Resolution {
        tasks,
        warnings,
        counts: ResolveCounts {
            packages: packages.len(),
            relationships: considered,
            candidates,
        },
    }
}

/// 설정 기반 관계 해석기
///
/// 순수 [`resolve`] 함수를 감싸 경고 정책 적용, 로깅, 메트릭 기록을 담당합니다.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    config: ResolverConfig,
}

impl Resolver {
    /// 주어진 설정으로 해석기를 생성합니다.
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// 현재 설정을 반환합니다.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// 문서를 해석합니다.
    ///
    /// # Errors
    ///
    /// 엄격 모드에서 경고가 하나라도 있으면 `ResolverError::Validation` 반환
    pub fn resolve(&self, document: &SpdxDocument) -> Result<Resolution, ResolverError> {
        let resolution = resolve(&document.packages, &document.relationships);

        for warning in &resolution.warnings {
            match warning.kind {
                WarningKind::UnknownDerived => debug!(
                    derived = %warning.derived,
                    source = %warning.source,
                    "skipping relationship from unknown package"
                ),
                _ => warn!(
                    kind = ?warning.kind,
                    derived = %warning.derived,
                    source = %warning.source,
                    "GENERATED_FROM validation warning: {warning}"
                ),
            }
        }
        counter!(m::RESOLVER_WARNINGS_TOTAL).increment(resolution.warnings.len() as u64);

        if self.config.relationship_policy == RelationshipPolicy::Strict
            && !resolution.warnings.is_empty()
        {
            return Err(ResolverError::Validation(resolution.warnings));
        }

        counter!(m::RESOLVER_TASKS_TOTAL).increment(resolution.tasks.len() as u64);
        info!(
            packages = resolution.counts.packages,
            relationships = resolution.counts.relationships,
            candidates = resolution.counts.candidates,
            tasks = resolution.tasks.len(),
            "sbom resolved"
        );

        Ok(resolution)
    }

    /// JSON 바이트를 파싱한 뒤 해석합니다.
    pub fn resolve_bytes(&self, bytes: &[u8]) -> Result<Resolution, ResolverError> {
        let document = SpdxDocument::from_slice(bytes)?;
        self.resolve(&document)
    }
}
