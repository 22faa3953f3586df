//! # sbomfetch-extractor
//!
//! 압축된 tar 아카이브를 디스크에 스트리밍으로 풀되,
//! 어떤 엔트리도 추출 루트 밖으로 나가지 못하게 합니다.
//!
//! 지원 형식은 파일 이름 확장자로 고릅니다: `.tar.gz`/`.tgz`,
//! `.tar.xz`, `.tar.bz2`. 엔트리는 압축 해제기에서 바로 하나씩 처리하며
//! 아카이브 전체를 메모리에 올리지 않습니다.
//!
//! # 엔트리 처리
//!
//! | 조건                                    | 결과                          |
//! |-----------------------------------------|-------------------------------|
//! | 이름이 루트 밖으로 해석됨               | 엔트리 건너뜀, 아카이브 계속   |
//! | 기존 상위 심볼릭 링크가 루트 밖을 가리킴 | 엔트리 건너뜀, 아카이브 계속   |
//! | 링크 대상이 루트 밖 (contained 정책)    | 엔트리 건너뜀, 아카이브 계속   |
//! | 심볼릭 링크 생성 실패                   | 엔트리 건너뜀, 아카이브 계속   |
//! | 손상된 스트림 또는 쓰기 실패            | 아카이브 실패, 부분 결과 유지  |
//!
//! # Module Structure
//!
//! - [`unpack`]: 단일 아카이브 추출 (`extract`, `ExtractReport`)
//! - [`batch`]: 여러 아카이브의 제한된 병렬 추출
//! - [`guard`]: 경로 정규화 및 격리 검사
//! - [`format`]: 확장자 판별과 디코더 선택
//! - [`options`]: 추출 옵션 (`ExtractOptions`, `SymlinkPolicy`)
//! - [`error`]: 도메인 에러 타입 (`ExtractorError`)

pub mod batch;
pub mod error;
pub mod format;
pub mod guard;
pub mod options;
pub mod unpack;

pub use batch::{ArchiveJob, ArchiveResult, ExtractionSummary, extract_all};
pub use error::ExtractorError;
pub use format::ArchiveFormat;
pub use options::{ExtractOptions, ExtractOptionsBuilder, SymlinkPolicy};
pub use unpack::{ExtractReport, SkipReason, SkippedEntry, extract};
