//! 파일 이름 확장자 기반 아카이브 형식 판별

use std::fmt;
use std::io::Read;
use std::path::Path;

use serde::Serialize;

use crate::error::ExtractorError;

/// tar 스트림을 감싼 압축 형식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    /// `.tar.gz`, `.tgz`
    Gzip,
    /// `.tar.xz`
    Xz,
    /// `.tar.bz2`
    Bzip2,
}

impl ArchiveFormat {
    /// 파일 이름으로 형식을 고릅니다 (대소문자 무시). 내용은 검사하지 않습니다.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_ascii_lowercase();
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::Gzip)
        } else if name.ends_with(".tar.xz") {
            Some(Self::Xz)
        } else if name.ends_with(".tar.bz2") {
            Some(Self::Bzip2)
        } else {
            None
        }
    }

    /// [`from_path`](Self::from_path)와 같지만 실패를 에러로 반환합니다.
    ///
    /// # Errors
    ///
    /// 지원하지 않는 확장자이면 `ExtractorError::UnsupportedFormat` 반환
    ///
    /// ```
    /// use std::path::Path;
    /// use sbomfetch_extractor::{ArchiveFormat, ExtractorError};
    ///
    /// let format = ArchiveFormat::detect(Path::new("zlib-1.3.1.tar.gz")).unwrap();
    /// assert_eq!(format, ArchiveFormat::Gzip);
    ///
    /// let err = ArchiveFormat::detect(Path::new("zlib-1.3.1.zip")).unwrap_err();
    /// assert!(matches!(err, ExtractorError::UnsupportedFormat { .. }));
    /// ```
    pub fn detect(path: &Path) -> Result<Self, ExtractorError> {
        Self::from_path(path).ok_or_else(|| ExtractorError::UnsupportedFormat {
            archive: path.display().to_string(),
        })
    }

    /// `reader`를 형식에 맞는 스트리밍 디코더로 감쌉니다.
    ///
    /// 모든 형식에서 이어 붙인 멤버를 하나의 스트림으로 디코딩합니다.
    pub fn decoder<'a, R: Read + 'a>(self, reader: R) -> Box<dyn Read + 'a> {
        match self {
            Self::Gzip => Box::new(flate2::read::MultiGzDecoder::new(reader)),
            Self::Xz => Box::new(xz2::read::XzDecoder::new_multi_decoder(reader)),
            Self::Bzip2 => Box::new(bzip2::read::MultiBzDecoder::new(reader)),
        }
    }

    /// 메트릭 레이블 값
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Xz => "xz",
            Self::Bzip2 => "bzip2",
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
