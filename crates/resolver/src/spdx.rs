//! SPDX JSON 문서 모델
//!
//! 해석에 필요한 두 레코드(`packages`, `relationships`)만 읽습니다.
//! 나머지 SPDX 필드는 무시합니다.

use serde::{Deserialize, Serialize};

use crate::error::ResolverError;

/// 다운로드 위치가 없음을 뜻하는 SPDX 예약값
pub const NOASSERTION: &str = "NOASSERTION";

/// 파생 관계 종류 (`spdxElementId`가 `relatedSpdxElement`에서 생성됨)
pub const GENERATED_FROM: &str = "GENERATED_FROM";

/// SPDX 문서 루트 (해석에 필요한 부분)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpdxDocument {
    /// 패키지 목록 (필수)
    pub packages: Vec<SpdxPackage>,
    /// 관계 목록 (없으면 빈 목록)
    #[serde(default)]
    pub relationships: Vec<SpdxRelationship>,
}

/// SPDX 패키지
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpdxPackage {
    /// 문서 내 고유 식별자
    #[serde(rename = "SPDXID")]
    pub spdx_id: String,
    /// 표시 이름
    #[serde(default)]
    pub name: String,
    /// 다운로드 위치 URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_location: Option<String>,
}

/// SPDX 관계
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpdxRelationship {
    /// 파생 패키지 식별자
    pub spdx_element_id: String,
    /// 관계 종류
    pub relationship_type: String,
    /// 원본(소스) 패키지 식별자
    pub related_spdx_element: String,
}

impl SpdxDocument {
    /// JSON 바이트에서 문서를 파싱합니다.
    ///
    /// 구조가 맞지 않으면 부분 결과 없이 실패합니다.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ResolverError> {
        serde_json::from_slice(bytes).map_err(|e| ResolverError::DocumentParse(e.to_string()))
    }
}

impl SpdxPackage {
    /// 사용 가능한 다운로드 위치를 반환합니다.
    ///
    /// 없음, 빈 문자열, `NOASSERTION`은 모두 `None`입니다.
    pub fn location(&self) -> Option<&str> {
        self.download_location
            .as_deref()
            .filter(|loc| !loc.is_empty() && *loc != NOASSERTION)
    }
}

impl SpdxRelationship {
    /// `GENERATED_FROM` 관계인지 확인합니다.
    pub fn is_generated_from(&self) -> bool {
        self.relationship_type == GENERATED_FROM
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_document() {
        let json = br#"{
            "spdxVersion": "SPDX-2.3",
            "packages": [
                {"SPDXID": "SPDXRef-1", "name": "glibc", "downloadLocation": "https://x/glibc-2.41.tar.gz", "versionInfo": "2.41"}
            ],
            "relationships": [
                {"spdxElementId": "SPDXRef-2", "relationshipType": "GENERATED_FROM", "relatedSpdxElement": "SPDXRef-1"}
            ]
        }"#;
        let doc = SpdxDocument::from_slice(json).unwrap();
        assert_eq!(doc.packages.len(), 1);
        assert_eq!(doc.packages[0].name, "glibc");
        assert!(doc.relationships[0].is_generated_from());
    }

    #[test]
    fn relationships_are_optional() {
        let doc = SpdxDocument::from_slice(br#"{"packages": []}"#).unwrap();
        assert!(doc.relationships.is_empty());
    }

    #[test]
    fn missing_packages_is_parse_error() {
        let err = SpdxDocument::from_slice(br#"{"relationships": []}"#).unwrap_err();
        assert!(matches!(err, ResolverError::DocumentParse(_)));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = SpdxDocument::from_slice(b"{\"packages\": [").unwrap_err();
        assert!(matches!(err, ResolverError::DocumentParse(_)));
    }

    #[test]
    fn package_without_spdxid_is_rejected() {
        let err = SpdxDocument::from_slice(br#"{"packages": [{"name": "zlib"}]}"#).unwrap_err();
        assert!(matches!(err, ResolverError::DocumentParse(_)));
    }

    #[test]
    fn relationship_missing_field_is_rejected() {
        let json = br#"{"packages": [], "relationships": [{"spdxElementId": "a", "relationshipType": "GENERATED_FROM"}]}"#;
        assert!(SpdxDocument::from_slice(json).is_err());
    }

    #[test]
    fn location_filters_sentinels() {
        let mut pkg = SpdxPackage {
            spdx_id: "SPDXRef-1".into(),
            name: "zlib".into(),
            download_location: None,
        };
        assert_eq!(pkg.location(), None);

        pkg.download_location = Some(String::new());
        assert_eq!(pkg.location(), None);

        pkg.download_location = Some(NOASSERTION.into());
        assert_eq!(pkg.location(), None);

        pkg.download_location = Some("https://zlib.net/zlib-1.3.tar.gz".into());
        assert_eq!(pkg.location(), Some("https://zlib.net/zlib-1.3.tar.gz"));
    }
}
