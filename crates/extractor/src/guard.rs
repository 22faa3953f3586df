//! 경로 격리 검사
//!
//! 엔트리 이름 검사는 어휘적으로만 수행합니다. [`escapes_via_symlink`]와
//! [`symlink_target_contained`]는 루트 아래에 이미 만들어진 항목을
//! 디스크에서 확인합니다.

use std::path::{Component, Path, PathBuf};

/// 파일시스템에 접근하지 않고 `.`과 `..`을 해석합니다.
///
/// 커널과 마찬가지로 절대 경로 최상단의 `..`은 루트에 머뭅니다.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// `root` 아래에서 `entry_name`의 정규화된 대상 경로를 반환합니다.
///
/// 절대 경로이거나 `root` 밖으로 나가는 엔트리는 `None`입니다.
/// `root`는 이미 정규화된 절대 경로여야 합니다.
pub fn contained_target(root: &Path, entry_name: &Path) -> Option<PathBuf> {
    if entry_name.has_root() || entry_name.is_absolute() {
        return None;
    }
    let target = normalize(&root.join(entry_name));
    target.starts_with(root).then_some(target)
}

/// `link` 위치의 심볼릭 링크가 가리키는 `link_target`이 `root` 안에 머무는지 확인합니다.
///
/// 링크의 부모 디렉토리는 디스크에서 물리적으로 해석한 뒤 대상과 결합합니다.
/// 앞선 엔트리가 만든 심볼릭 링크 체인(`s1 -> .`, `s1/s2 -> ..`)도 여기서 걸러집니다.
/// 절대 경로 대상은 항상 거부합니다.
pub fn symlink_target_contained(root: &Path, link: &Path, link_target: &Path) -> bool {
    if link_target.has_root() || link_target.is_absolute() {
        return false;
    }
    let Some(base) = physical_path(link.parent().unwrap_or(root)) else {
        return false;
    };
    if !base.starts_with(root) {
        return false;
    }
    normalize(&base.join(link_target)).starts_with(root)
}

/// 존재하는 가장 깊은 조상을 `canonicalize`하고 나머지 구성 요소를 붙입니다.
///
/// 아직 없는 경로 부분은 이후 일반 디렉토리로 만들어지므로 그대로 둡니다.
fn physical_path(path: &Path) -> Option<PathBuf> {
    let mut existing = path;
    let mut rest = Vec::new();
    loop {
        match std::fs::canonicalize(existing) {
            Ok(mut resolved) => {
                resolved.extend(rest.iter().rev());
                return Some(normalize(&resolved));
            }
            Err(_) => {
                rest.push(existing.file_name()?);
                existing = existing.parent()?;
            }
        }
    }
}

/// `root`와 `target` 사이에 이미 존재하는 구성 요소 중 `root` 밖을 가리키거나
/// 해석할 수 없는 심볼릭 링크가 있으면 `true`를 반환합니다.
///
/// `root` 자체는 검사하지 않으며, `target`은 `include_target`일 때만 검사합니다.
pub fn escapes_via_symlink(root: &Path, target: &Path, include_target: bool) -> bool {
    let Ok(relative) = target.strip_prefix(root) else {
        return true;
    };

    let components: Vec<_> = relative.components().collect();
    let checked = if include_target {
        components.len()
    } else {
        components.len().saturating_sub(1)
    };

    let mut current = root.to_path_buf();
    for component in components.into_iter().take(checked) {
        current.push(component);
        let Ok(meta) = std::fs::symlink_metadata(&current) else {
            // 더 깊은 경로는 아직 없음
            return false;
        };
        if meta.file_type().is_symlink() {
            match std::fs::canonicalize(&current) {
                Ok(resolved) if resolved.starts_with(root) => {}
                _ => return true,
            }
        }
    }
    false
}
