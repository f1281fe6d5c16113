//! 내구 계층 레코드 모델.

use serde::{Deserialize, Serialize};

/// 현재 레코드 스키마 버전 (향후 마이그레이션용으로 예약)
pub const RECORD_SCHEMA_VERSION: u32 = 1;

/// 레코드 페이로드.
///
/// `compressed=false`면 JSON 텍스트, `compressed=true`면 gzip 바이트.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordPayload {
    /// 직렬화된 JSON 원문
    Text(String),
    /// 압축된 바이트
    Bytes(Vec<u8>),
}

impl RecordPayload {
    /// 저장되는 바이트 수 (텍스트는 UTF-8 기준)
    pub fn size_bytes(&self) -> usize {
        match self {
            Self::Text(text) => text.len(),
            Self::Bytes(bytes) => bytes.len(),
        }
    }
}

/// 내구 계층에 저장되는 단위 레코드
///
/// `id`는 저장소 내에서 유일하며, 같은 `id`로 다시 쓰면 덮어쓴다 (이력 없음).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageRecord {
    /// 호출자가 지정한 키
    pub id: String,
    /// 저장된 페이로드
    #[serde(rename = "data")]
    pub payload: RecordPayload,
    /// 생성/갱신 시각 (Unix epoch 밀리초)
    pub timestamp: i64,
    /// 레코드 스키마 버전
    #[serde(rename = "version")]
    pub schema_version: u32,
    /// 페이로드 압축 여부
    pub compressed: bool,
}

impl StorageRecord {
    /// 새 레코드 생성 (`compressed`는 페이로드 종류로 결정)
    pub fn new(id: impl Into<String>, payload: RecordPayload, timestamp: i64) -> Self {
        let compressed = matches!(payload, RecordPayload::Bytes(_));
        Self {
            id: id.into(),
            payload,
            timestamp,
            schema_version: RECORD_SCHEMA_VERSION,
            compressed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_payload_marks_compressed() {
        let record = StorageRecord::new("draft", RecordPayload::Bytes(vec![31, 139, 8]), 42);
        assert!(record.compressed);
        assert_eq!(record.payload.size_bytes(), 3);
    }

    #[test]
    fn serializes_with_persisted_field_names() {
        let record = StorageRecord::new("k", RecordPayload::Text("1".to_string()), 7);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["data"], "1");
        assert_eq!(json["version"], 1);
        assert_eq!(json["timestamp"], 7);
        assert_eq!(json["compressed"], false);
    }

    #[test]
    fn multibyte_text_size_is_utf8_bytes() {
        let payload = RecordPayload::Text("\"한글\"".to_string());
        assert_eq!(payload.size_bytes(), 8);
    }
}
