//! 단일 아카이브 스트리밍 추출

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use metrics::counter;
use serde::Serialize;
use tracing::{debug, warn};

use sbomfetch_core::metrics as m;

use crate::error::ExtractorError;
use crate::format::ArchiveFormat;
use crate::guard;
use crate::options::{ExtractOptions, SymlinkPolicy};

/// 엔트리를 쓰지 않은 이유
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// 절대 경로 이름 또는 루트 밖으로 나가는 `..`
    EscapesRoot,
    /// 루트 자체로 해석되는 디렉토리가 아닌 엔트리
    TargetIsRoot,
    /// 대상까지의 경로에 있는 기존 심볼릭 링크가 루트 밖을 가리킴
    SymlinkAncestor,
    /// 링크 대상이 루트 밖으로 해석됨
    SymlinkTargetEscapes {
        /// 기록된 링크 대상
        target: String,
    },
    /// 심볼릭 링크 생성 실패
    LinkFailed {
        /// OS 에러 메시지
        error: String,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EscapesRoot => write!(f, "path escapes extraction root"),
            Self::TargetIsRoot => write!(f, "entry resolves to extraction root"),
            Self::SymlinkAncestor => write!(f, "parent symlink escapes extraction root"),
            Self::SymlinkTargetEscapes { target } => {
                write!(f, "symlink target {target} escapes extraction root")
            }
            Self::LinkFailed { error } => write!(f, "failed to create symlink: {error}"),
        }
    }
}

/// 추출에서 제외된 엔트리
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    /// 아카이브에 기록된 엔트리 이름
    pub entry: String,
    /// 사유
    pub reason: SkipReason,
}

/// 아카이브 하나가 디스크에 남긴 결과
#[derive(Debug, Clone, Serialize)]
pub struct ExtractReport {
    /// 아카이브 경로
    pub archive: PathBuf,
    /// 판별된 형식
    pub format: ArchiveFormat,
    /// 생성한 디렉토리 엔트리 수
    pub directories: usize,
    /// 기록한 일반 파일 수
    pub files: usize,
    /// 생성한 심볼릭 링크 수 (`as-file`에서는 파일로 기록한 수)
    pub symlinks: usize,
    /// 그 외 유형의 엔트리 수 (하드 링크, 장치, fifo)
    pub ignored: usize,
    /// 안전 검사나 링크 실패로 건너뛴 엔트리
    pub skipped: Vec<SkippedEntry>,
}

impl ExtractReport {
    fn new(archive: &Path, format: ArchiveFormat) -> Self {
        Self {
            archive: archive.to_path_buf(),
            format,
            directories: 0,
            files: 0,
            symlinks: 0,
            ignored: 0,
            skipped: Vec::new(),
        }
    }

    fn skip(&mut self, entry: &Path, reason: SkipReason) {
        warn!(
            archive = %self.archive.display(),
            entry = %entry.display(),
            reason = %reason,
            "skipping archive entry"
        );
        counter!(m::EXTRACT_ENTRIES_SKIPPED_TOTAL).increment(1);
        self.skipped.push(SkippedEntry {
            entry: entry.display().to_string(),
            reason,
        });
    }
}

/// `archive`를 이미 존재하는 `root` 아래에 추출합니다.
///
/// 안전하지 않은 엔트리는 보고서에 기록하고 건너뛰며 나머지 엔트리는 계속 처리합니다.
/// 블로킹 함수이므로 async 코드에서는 블로킹 스레드에서 호출해야 합니다.
///
/// # Errors
///
/// - `ExtractorError::UnsupportedFormat`: 지원하지 않는 확장자
/// - `ExtractorError::Open`: 아카이브 파일 열기 실패
/// - `ExtractorError::Corrupt`: 압축 해제 또는 tar 읽기 실패
/// - `ExtractorError::Write`: 루트 해석 또는 디스크 쓰기 실패
///
/// 에러가 나도 그때까지 기록한 파일은 그대로 남습니다.
pub fn extract(
    archive: &Path,
    root: &Path,
    options: &ExtractOptions,
) -> Result<ExtractReport, ExtractorError> {
    let format = ArchiveFormat::detect(archive)?;
    let result = extract_stream(archive, root, options, format);

    let label = if result.is_ok() {
        m::RESULT_SUCCESS
    } else {
        m::RESULT_FAILURE
    };
    counter!(m::EXTRACTIONS_TOTAL, m::LABEL_RESULT => label, m::LABEL_FORMAT => format.as_str())
        .increment(1);
    result
}

fn extract_stream(
    archive: &Path,
    root: &Path,
    options: &ExtractOptions,
    format: ArchiveFormat,
) -> Result<ExtractReport, ExtractorError> {
    let archive_name = archive.display().to_string();
    let corrupt = |e: io::Error| ExtractorError::Corrupt {
        archive: archive_name.clone(),
        reason: e.to_string(),
    };

    let root = fs::canonicalize(root).map_err(|source| ExtractorError::Write {
        path: root.display().to_string(),
        source,
    })?;
    let file = File::open(archive).map_err(|source| ExtractorError::Open {
        archive: archive_name.clone(),
        source,
    })?;

    let mut tar = tar::Archive::new(format.decoder(BufReader::new(file)));
    let mut report = ExtractReport::new(archive, format);

    for entry in tar.entries().map_err(corrupt)? {
        let mut entry = entry.map_err(corrupt)?;
        let name = entry.path().map_err(corrupt)?.into_owned();
        let entry_type = entry.header().entry_type();

        let Some(target) = guard::contained_target(&root, &name) else {
            report.skip(&name, SkipReason::EscapesRoot);
            continue;
        };

        let is_dir = entry_type.is_dir();
        if !is_dir && target == root {
            report.skip(&name, SkipReason::TargetIsRoot);
            continue;
        }
        if guard::escapes_via_symlink(&root, &target, is_dir) {
            report.skip(&name, SkipReason::SymlinkAncestor);
            continue;
        }

        let mode = entry.header().mode().ok();

        if is_dir {
            fs::create_dir_all(&target).map_err(write_err(&target))?;
            if target != root {
                apply_mode(&target, mode.map(|bits| bits | 0o700), options)?;
            }
            report.directories += 1;
        } else if entry_type.is_file() {
            create_parent(&target)?;
            remove_link(&target)?;
            let mut out = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&target)
                .map_err(write_err(&target))?;
            copy_body(&mut entry, &mut out, &target, &corrupt)?;
            drop(out);
            apply_mode(&target, mode.map(|bits| bits & 0o777), options)?;
            report.files += 1;
        } else if entry_type.is_symlink() {
            let link_target = match entry.link_name() {
                Ok(Some(link)) => link.into_owned(),
                Ok(None) => {
                    report.skip(
                        &name,
                        SkipReason::LinkFailed {
                            error: "missing link target".to_owned(),
                        },
                    );
                    continue;
                }
                Err(e) => return Err(corrupt(e)),
            };
            write_symlink(&root, &target, &name, &link_target, options, &mut report)?;
        } else {
            debug!(entry = %name.display(), kind = ?entry_type, "ignoring entry type");
            report.ignored += 1;
        }
    }

    debug!(
        archive = %archive.display(),
        directories = report.directories,
        files = report.files,
        symlinks = report.symlinks,
        skipped = report.skipped.len(),
        "archive extracted"
    );
    Ok(report)
}

fn write_symlink(
    root: &Path,
    target: &Path,
    name: &Path,
    link_target: &Path,
    options: &ExtractOptions,
    report: &mut ExtractReport,
) -> Result<(), ExtractorError> {
    match options.symlink_policy {
        SymlinkPolicy::AsFile => {
            create_parent(target)?;
            remove_link(target)?;
            fs::write(target, link_target.as_os_str().as_encoded_bytes())
                .map_err(write_err(target))?;
            report.symlinks += 1;
            return Ok(());
        }
        SymlinkPolicy::Contained => {
            if !guard::symlink_target_contained(root, target, link_target) {
                report.skip(
                    name,
                    SkipReason::SymlinkTargetEscapes {
                        target: link_target.display().to_string(),
                    },
                );
                return Ok(());
            }
        }
        SymlinkPolicy::Verbatim => {}
    }

    create_parent(target)?;
    remove_link(target)?;
    match make_symlink(link_target, target) {
        Ok(()) => report.symlinks += 1,
        Err(e) => report.skip(
            name,
            SkipReason::LinkFailed {
                error: e.to_string(),
            },
        ),
    }
    Ok(())
}

/// 엔트리 본문을 `out`으로 복사합니다.
///
/// 읽기 실패는 압축 해제나 tar 스트림 문제이므로 `corrupt`로, 쓰기 실패는
/// [`ExtractorError::Write`]로 구분합니다.
fn copy_body(
    entry: &mut impl Read,
    out: &mut File,
    target: &Path,
    corrupt: &impl Fn(io::Error) -> ExtractorError,
) -> Result<u64, ExtractorError> {
    let mut buf = [0u8; 32 * 1024];
    let mut written = 0u64;
    loop {
        let n = match entry.read(&mut buf) {
            Ok(0) => return Ok(written),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(corrupt(e)),
        };
        out.write_all(&buf[..n]).map_err(write_err(target))?;
        written += n as u64;
    }
}

fn write_err(path: &Path) -> impl Fn(io::Error) -> ExtractorError + '_ {
    move |source| ExtractorError::Write {
        path: path.display().to_string(),
        source,
    }
}

fn create_parent(target: &Path) -> Result<(), ExtractorError> {
    match target.parent() {
        Some(parent) => fs::create_dir_all(parent).map_err(write_err(parent)),
        None => Ok(()),
    }
}

/// `target`에 있는 기존 심볼릭 링크나 파일을 지워, 새 엔트리가 그것을 통해
/// 쓰지 않고 대체하도록 합니다. 디렉토리는 건드리지 않습니다.
fn remove_link(target: &Path) -> Result<(), ExtractorError> {
    match fs::symlink_metadata(target) {
        Ok(meta) if !meta.is_dir() => fs::remove_file(target).map_err(write_err(target)),
        _ => Ok(()),
    }
}

#[cfg(unix)]
fn make_symlink(link_target: &Path, at: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(link_target, at)
}

#[cfg(not(unix))]
fn make_symlink(_link_target: &Path, _at: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symlinks are not supported on this platform",
    ))
}

#[cfg(unix)]
fn apply_mode(
    target: &Path,
    mode: Option<u32>,
    options: &ExtractOptions,
) -> Result<(), ExtractorError> {
    use std::os::unix::fs::PermissionsExt;

    let Some(mode) = mode.filter(|_| options.preserve_permissions) else {
        return Ok(());
    };
    fs::set_permissions(target, fs::Permissions::from_mode(mode)).map_err(write_err(target))
}

#[cfg(not(unix))]
fn apply_mode(
    _target: &Path,
    _mode: Option<u32>,
    _options: &ExtractOptions,
) -> Result<(), ExtractorError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use flate2::Compression;
    use flate2::write::GzEncoder;

    fn gz_archive(dir: &Path, name: &str, build: impl FnOnce(&mut tar::Builder<GzEncoder<File>>)) -> PathBuf {
        let path = dir.join(name);
        let file = File::create(&path).unwrap();
        let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
        build(&mut builder);
        builder.into_inner().unwrap().finish().unwrap();
        path
    }

    fn append_file<W: io::Write>(builder: &mut tar::Builder<W>, name: &str, body: &[u8], mode: u32) {
        let mut header = tar::Header::new_gnu();
        header.set_size(body.len() as u64);
        header.set_mode(mode);
        header.set_entry_type(tar::EntryType::Regular);
        builder.append_data(&mut header, name, body).unwrap();
    }

    #[test]
    fn unsupported_suffix_fails_before_opening() {
        let err = extract(
            Path::new("/nonexistent/source.zip"),
            Path::new("/tmp"),
            &ExtractOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ExtractorError::UnsupportedFormat { .. }));
    }

    #[test]
    fn missing_archive_is_open_error() {
        let root = tempfile::tempdir().unwrap();
        let err = extract(
            Path::new("/nonexistent/source.tar.gz"),
            root.path(),
            &ExtractOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ExtractorError::Open { .. }));
    }

    #[test]
    fn counts_entries_by_type() {
        let work = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let archive = gz_archive(work.path(), "pkg.tar.gz", |b| {
            let mut dir = tar::Header::new_gnu();
            dir.set_entry_type(tar::EntryType::Directory);
            dir.set_mode(0o755);
            dir.set_size(0);
            b.append_data(&mut dir, "pkg/", io::empty()).unwrap();
            append_file(b, "pkg/README", b"readme", 0o644);
            append_file(b, "pkg/src/main.c", b"int main(){}", 0o644);

            let mut fifo = tar::Header::new_gnu();
            fifo.set_entry_type(tar::EntryType::Fifo);
            fifo.set_size(0);
            b.append_data(&mut fifo, "pkg/pipe", io::empty()).unwrap();
        });

        let report = extract(&archive, root.path(), &ExtractOptions::default()).unwrap();
        assert_eq!(report.format, ArchiveFormat::Gzip);
        assert_eq!(report.directories, 1);
        assert_eq!(report.files, 2);
        assert_eq!(report.ignored, 1);
        assert!(report.skipped.is_empty());
        assert_eq!(
            fs::read_to_string(root.path().join("pkg/src/main.c")).unwrap(),
            "int main(){}"
        );
        assert!(!root.path().join("pkg/pipe").exists());
    }

    #[cfg(unix)]
    #[test]
    fn applies_permission_bits() {
        use std::os::unix::fs::PermissionsExt;

        let work = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let archive = gz_archive(work.path(), "perm.tgz", |b| {
            append_file(b, "bin/run.sh", b"#!/bin/sh\n", 0o755);
            append_file(b, "etc/secret", b"x", 0o600);
        });

        extract(&archive, root.path(), &ExtractOptions::default()).unwrap();
        let mode = |p: &str| {
            fs::metadata(root.path().join(p))
                .unwrap()
                .permissions()
                .mode()
                & 0o777
        };
        assert_eq!(mode("bin/run.sh"), 0o755);
        assert_eq!(mode("etc/secret"), 0o600);
    }

    #[test]
    fn reextraction_overwrites_files() {
        let work = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let archive = gz_archive(work.path(), "twice.tar.gz", |b| {
            append_file(b, "a.txt", b"second", 0o644);
        });
        fs::write(root.path().join("a.txt"), "first version, longer").unwrap();

        extract(&archive, root.path(), &ExtractOptions::default()).unwrap();
        extract(&archive, root.path(), &ExtractOptions::default()).unwrap();
        assert_eq!(fs::read_to_string(root.path().join("a.txt")).unwrap(), "second");
    }
}
