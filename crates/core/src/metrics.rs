//! 메트릭 이름 상수
//!
//! 모든 메트릭의 이름을 중앙에서 정의합니다.
//! 각 크레이트는 이 상수로 `metrics::counter!()` 매크로를 호출합니다.
//! 레코더가 설치되지 않으면 `metrics` 파사드는 아무 일도 하지 않습니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `sbomfetch_`
//! - 모듈명: `resolver_`, `download_`, `extract_`
//! - 접미어: `_total` (counter)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(sbomfetch_core::metrics::DOWNLOADS_TOTAL, "result" => "success").increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

/// 아카이브 형식 레이블 키 (gzip, xz, bzip2)
pub const LABEL_FORMAT: &str = "format";

/// 결과 레이블 값: 성공
pub const RESULT_SUCCESS: &str = "success";

/// 결과 레이블 값: 실패
pub const RESULT_FAILURE: &str = "failure";

// ─── Resolver 메트릭 ──────────────────────────────────────────────

/// Resolver: 생성된 다운로드 작업 수 (counter)
pub const RESOLVER_TASKS_TOTAL: &str = "sbomfetch_resolver_tasks_total";

/// Resolver: 관계 검증 경고 수 (counter)
pub const RESOLVER_WARNINGS_TOTAL: &str = "sbomfetch_resolver_warnings_total";

// ─── Download 메트릭 ──────────────────────────────────────────────

/// Download: 완료된 다운로드 수 (counter, label: result)
pub const DOWNLOADS_TOTAL: &str = "sbomfetch_download_downloads_total";

/// Download: 디스크에 기록된 바이트 수 (counter)
pub const DOWNLOAD_BYTES_TOTAL: &str = "sbomfetch_download_bytes_total";

// ─── Extract 메트릭 ───────────────────────────────────────────────

/// Extract: 처리된 아카이브 수 (counter, label: result, format)
pub const EXTRACTIONS_TOTAL: &str = "sbomfetch_extract_archives_total";

/// Extract: 보안 검사로 건너뛴 엔트리 수 (counter)
pub const EXTRACT_ENTRIES_SKIPPED_TOTAL: &str = "sbomfetch_extract_entries_skipped_total";
