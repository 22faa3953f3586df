//! 도메인 타입 — 크레이트 간에 공유되는 작업 단위
//!
//! 해석기가 만들고 다운로드 엔진이 읽기 전용으로 소비하는 [`DownloadTask`]를 정의합니다.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// 소유 패키지를 알 수 없을 때 사용하는 이름
pub const UNKNOWN_OWNER: &str = "unknown";

/// 지원하는 tar 아카이브 접미사 (소문자)
///
/// `.tar` 단독은 의도적으로 제외합니다.
pub const TARBALL_SUFFIXES: [&str; 4] = [".tar.gz", ".tgz", ".tar.xz", ".tar.bz2"];

/// 이름이 지원하는 tar 아카이브 접미사로 끝나는지 확인합니다 (대소문자 구분 없음).
pub fn has_tarball_suffix(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    TARBALL_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix))
}

/// 다운로드 작업
///
/// 아카이브 URL 하나와 그 URL에서 파생된 상위 패키지 이름 집합입니다.
/// 해석기가 한 번 생성한 뒤에는 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadTask {
    /// 아카이브 URL (중복 제거 키)
    pub url: String,
    /// 소유 패키지 이름 집합 (비어 있지 않음)
    pub owners: BTreeSet<String>,
}

impl DownloadTask {
    /// 소유자 목록으로 작업을 생성합니다.
    ///
    /// 소유자가 하나도 없으면 `{"unknown"}`으로 대체합니다.
    pub fn new<I, S>(url: impl Into<String>, owners: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut owners: BTreeSet<String> = owners.into_iter().map(Into::into).collect();
        if owners.is_empty() {
            owners.insert(UNKNOWN_OWNER.to_owned());
        }
        Self {
            url: url.into(),
            owners,
        }
    }

    /// 소유자 이름을 `, `로 이어 붙인 문자열을 반환합니다.
    pub fn owner_list(&self) -> String {
        self.owners
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for DownloadTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.url, self.owner_list())
    }
}
