//! SBOM 바이트 공급자
//!
//! 해석기는 SBOM을 "SPDX 문서의 바이트"로만 취급합니다.
//! [`SbomSource`] 트레잇은 그 바이트를 어디서 얻는지를 추상화합니다.
//!
//! - [`SpdxFileSource`]: 로컬 SPDX JSON 파일
//! - [`AttestationFileSource`]: 줄마다 DSSE 엔벨로프 하나가 담긴 파일
//!   (`cosign download attestation` 출력 형식)

use std::future::Future;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use tracing::debug;

use crate::error::ResolverError;

/// in-toto 문장의 SPDX predicate 타입 표식
pub const SPDX_PREDICATE_MARKER: &str = "spdx.dev/Document";

/// SBOM 바이트 공급자
pub trait SbomSource: Send + Sync {
    /// 로그와 에러 메시지에 쓰는 공급자 설명
    fn describe(&self) -> String;

    /// SPDX 문서의 바이트를 반환합니다.
    fn fetch_document(&self) -> impl Future<Output = Result<Vec<u8>, ResolverError>> + Send;
}

/// 로컬 SPDX JSON 파일
#[derive(Debug, Clone)]
pub struct SpdxFileSource {
    path: PathBuf,
    max_size: u64,
}

impl SpdxFileSource {
    /// 최대 크기 제한과 함께 파일 공급자를 생성합니다.
    pub fn new(path: impl Into<PathBuf>, max_size: u64) -> Self {
        Self {
            path: path.into(),
            max_size,
        }
    }
}

impl SbomSource for SpdxFileSource {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    async fn fetch_document(&self) -> Result<Vec<u8>, ResolverError> {
        read_limited(self.path.clone(), self.max_size).await
    }
}

/// DSSE 어테스테이션 파일
///
/// 줄마다 JSON 엔벨로프 하나를 읽어, predicate 타입이 SPDX인 첫 번째
/// 문장의 predicate를 SPDX 문서로 반환합니다. 디코딩할 수 없는 줄은 건너뜁니다.
#[derive(Debug, Clone)]
pub struct AttestationFileSource {
    path: PathBuf,
    max_size: u64,
}

impl AttestationFileSource {
    /// 최대 크기 제한과 함께 어테스테이션 공급자를 생성합니다.
    pub fn new(path: impl Into<PathBuf>, max_size: u64) -> Self {
        Self {
            path: path.into(),
            max_size,
        }
    }
}

impl SbomSource for AttestationFileSource {
    fn describe(&self) -> String {
        format!("attestations {}", self.path.display())
    }

    async fn fetch_document(&self) -> Result<Vec<u8>, ResolverError> {
        let raw = read_limited(self.path.clone(), self.max_size).await?;
        let text = String::from_utf8_lossy(&raw);

        let mut envelopes = 0usize;
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            envelopes += 1;
            match decode_envelope(line.as_bytes()) {
                Ok(Some(document)) => {
                    debug!(line = lineno + 1, "found SPDX attestation");
                    return Ok(document);
                }
                Ok(None) => debug!(line = lineno + 1, "attestation is not SPDX, skipping"),
                Err(e) => debug!(line = lineno + 1, error = %e, "undecodable attestation, skipping"),
            }
        }

        if envelopes == 0 {
            return Err(ResolverError::Attestation(format!(
                "no attestations found in {}",
                self.path.display()
            )));
        }
        Err(ResolverError::Attestation(format!(
            "no SPDX attestations found in {} ({envelopes} checked)",
            self.path.display()
        )))
    }
}

#[derive(Deserialize)]
struct DsseEnvelope {
    payload: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InTotoStatement {
    predicate_type: String,
    predicate: Option<serde_json::Value>,
}

/// DSSE 엔벨로프 하나를 디코딩합니다.
///
/// - SPDX predicate이면 `Ok(Some(문서 바이트))`
/// - 다른 predicate 타입이면 `Ok(None)`
/// - 구조가 잘못되었으면 `Err`
pub fn decode_envelope(envelope: &[u8]) -> Result<Option<Vec<u8>>, ResolverError> {
    let dsse: DsseEnvelope = serde_json::from_slice(envelope)
        .map_err(|e| ResolverError::Attestation(format!("invalid DSSE envelope: {e}")))?;

    let payload = STANDARD
        .decode(dsse.payload.trim())
        .map_err(|e| ResolverError::Attestation(format!("failed to decode base64 payload: {e}")))?;

    let statement: InTotoStatement = serde_json::from_slice(&payload)
        .map_err(|e| ResolverError::Attestation(format!("invalid in-toto statement: {e}")))?;

    if !statement.predicate_type.contains(SPDX_PREDICATE_MARKER) {
        return Ok(None);
    }

    let predicate = statement
        .predicate
        .ok_or_else(|| ResolverError::Attestation("no predicate found in statement".to_owned()))?;

    serde_json::to_vec(&predicate)
        .map(Some)
        .map_err(|e| ResolverError::Attestation(format!("failed to encode predicate: {e}")))
}

/// 크기 제한을 확인한 뒤 파일 전체를 읽습니다.
async fn read_limited(path: PathBuf, max_size: u64) -> Result<Vec<u8>, ResolverError> {
    tokio::task::spawn_blocking(move || read_limited_blocking(&path, max_size))
        .await
        .map_err(|e| ResolverError::Source(format!("spawn_blocking failed: {e}")))?
}

fn read_limited_blocking(path: &Path, max_size: u64) -> Result<Vec<u8>, ResolverError> {
    let display = path.display().to_string();
    let metadata = std::fs::metadata(path).map_err(|source| ResolverError::Io {
        path: display.clone(),
        source,
    })?;

    if metadata.len() > max_size {
        return Err(ResolverError::FileTooBig {
            path: display,
            size: metadata.len(),
            max: max_size,
        });
    }

    std::fs::read(path).map_err(|source| ResolverError::Io {
        path: display,
        source,
    })
}
