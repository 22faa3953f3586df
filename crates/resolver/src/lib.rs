//! SPDX SBOM 관계 해석기
//!
//! SBOM 문서를 파싱하고 `GENERATED_FROM` 관계를 역색인하여,
//! 다운로드 가능한 소스 아카이브 URL별로 소유 패키지를 묶은
//! [`DownloadTask`](sbomfetch_core::DownloadTask) 목록을 만듭니다.
//!
//! # Module Structure
//!
//! - [`error`]: 도메인 에러 타입 (`ResolverError`)
//! - [`config`]: 해석기 설정 (`ResolverConfig`, 빌더)
//! - [`spdx`]: SPDX JSON 문서 모델 (`SpdxDocument`, `SpdxPackage`, `SpdxRelationship`)
//! - [`resolve`]: 관계 해석 (`Resolver`, `Resolution`, `ResolveWarning`)
//! - [`source`]: SBOM 바이트 공급자 (`SbomSource`, `SpdxFileSource`, `AttestationFileSource`)
//!
//! # Architecture
//!
//! ```text
//! SbomSource --bytes--> SpdxDocument --> Resolver --> Resolution
//!                                           |             |
//!                                     ResolveWarning   Vec<DownloadTask>
//! ```

pub mod config;
pub mod error;
pub mod resolve;
pub mod source;
pub mod spdx;

// --- Public API Re-exports ---

// Resolver
pub use resolve::{
    ResolveCounts, Resolution, ResolveWarning, Resolver, WarningKind, is_candidate_location,
    resolve,
};

// Configuration
pub use config::{RelationshipPolicy, ResolverConfig, ResolverConfigBuilder};

// Error
pub use error::ResolverError;

// SPDX model
pub use spdx::{GENERATED_FROM, NOASSERTION, SpdxDocument, SpdxPackage, SpdxRelationship};

// Sources
pub use source::{AttestationFileSource, SbomSource, SpdxFileSource, decode_envelope};
