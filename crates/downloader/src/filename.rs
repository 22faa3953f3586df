//! 저장 파일 이름 도출
//!
//! 워커가 시작되기 전에 모든 작업의 저장 경로를 정하므로
//! 두 워커가 같은 경로에 쓰는 일은 없습니다.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use url::Url;

use sbomfetch_core::types::{DownloadTask, TARBALL_SUFFIXES, has_tarball_suffix};

use crate::config::CollisionPolicy;
use crate::error::DownloaderError;

/// URL에 경로 세그먼트도 호스트도 없을 때 쓰는 이름
const FALLBACK_NAME: &str = "download";

/// tarball 확장자로 끝나지 않는 이름에 붙이는 확장자
const DEFAULT_SUFFIX: &str = ".tar.gz";

/// 충돌 시 삽입하는 URL 해시의 16진수 자릿수
const HASH_PREFIX_LEN: usize = 8;

/// URL에서 아카이브 파일 이름을 도출합니다.
///
/// 비어 있지 않은 마지막 경로 세그먼트를 쓰고, 없으면 호스트, 그다음
/// `download`를 씁니다. 알려진 tarball 확장자가 없으면 `.tar.gz`를 붙입니다.
/// 이름만 맞출 뿐 실제 내용 형식과는 무관합니다.
pub fn filename_from_url(url: &str) -> String {
    let base = match Url::parse(url) {
        Ok(parsed) => last_segment(parsed.path())
            .or_else(|| parsed.host_str().and_then(sanitize))
            .unwrap_or_else(|| FALLBACK_NAME.to_owned()),
        Err(_) => {
            let without_query = url.split(['?', '#']).next().unwrap_or(url);
            last_segment(without_query).unwrap_or_else(|| FALLBACK_NAME.to_owned())
        }
    };

    if has_tarball_suffix(&base) {
        base
    } else {
        format!("{base}{DEFAULT_SUFFIX}")
    }
}

fn last_segment(path: &str) -> Option<String> {
    path.rsplit('/').find(|s| !s.is_empty()).and_then(sanitize)
}

/// 대상 디렉토리 안의 단일 파일로 남지 않는 이름을 거부합니다.
fn sanitize(name: &str) -> Option<String> {
    if name == "." || name == ".." || name.contains(['\\', '\0']) {
        return None;
    }
    Some(name.to_owned())
}

/// 이름 본체와 tarball 확장자 사이에 `url`의 짧은 해시를 넣습니다.
fn hashed_name(name: &str, url: &str, digits: usize) -> String {
    let digest = hex::encode(Sha256::digest(url.as_bytes()));
    let tag = &digest[..digits.min(digest.len())];

    let lower = name.to_ascii_lowercase();
    let suffix_len = TARBALL_SUFFIXES
        .iter()
        .find(|suffix| lower.ends_with(*suffix))
        .map_or(0, |suffix| suffix.len());
    let (stem, suffix) = name.split_at(name.len() - suffix_len);
    format!("{stem}-{tag}{suffix}")
}

/// 작업과 계획된 저장 경로, 또는 실행하지 않는 이유
#[derive(Debug)]
pub struct PlannedDownload {
    /// 해석기가 만든 작업
    pub task: DownloadTask,
    /// 저장 경로, 또는 [`CollisionPolicy::Fail`]에서의 충돌 실패
    pub destination: Result<PathBuf, DownloaderError>,
}

/// 모든 작업에 대해 `dir` 아래의 서로 다른 저장 경로를 계획합니다.
///
/// 이름은 URL 순서로 배정하므로 입력 순서와 관계없이 같은 작업 목록은
/// 항상 같은 배치를 만듭니다. 반환 목록은 입력 순서를 유지합니다.
pub fn plan_destinations(
    tasks: &[DownloadTask],
    dir: &Path,
    policy: CollisionPolicy,
) -> Vec<PlannedDownload> {
    let mut order: Vec<usize> = (0..tasks.len()).collect();
    order.sort_by(|&a, &b| tasks[a].url.cmp(&tasks[b].url));

    let mut claimed: HashMap<String, &str> = HashMap::new();
    let mut destinations: Vec<Option<Result<PathBuf, DownloaderError>>> =
        (0..tasks.len()).map(|_| None).collect();

    for index in order {
        let url = tasks[index].url.as_str();
        let name = filename_from_url(url);

        let planned = match claimed.get(&name).copied() {
            None => {
                claimed.insert(name.clone(), url);
                Ok(dir.join(name))
            }
            Some(owner) => match policy {
                CollisionPolicy::Fail => Err(DownloaderError::Collision {
                    url: url.to_owned(),
                    other_url: owner.to_owned(),
                    path: dir.join(&name).display().to_string(),
                }),
                CollisionPolicy::Rename => {
                    let mut digits = HASH_PREFIX_LEN;
                    let mut renamed = hashed_name(&name, url, digits);
                    while claimed.contains_key(&renamed) && digits < 64 {
                        digits *= 2;
                        renamed = hashed_name(&name, url, digits);
                    }
                    match claimed.get(&renamed).copied() {
                        None => {
                            claimed.insert(renamed.clone(), url);
                            Ok(dir.join(renamed))
                        }
                        Some(other) => Err(DownloaderError::Collision {
                            url: url.to_owned(),
                            other_url: other.to_owned(),
                            path: dir.join(&renamed).display().to_string(),
                        }),
                    }
                }
            },
        };
        destinations[index] = Some(planned);
    }

    tasks
        .iter()
        .cloned()
        .zip(destinations)
        .filter_map(|(task, destination)| {
            destination.map(|destination| PlannedDownload { task, destination })
        })
        .collect()
}
