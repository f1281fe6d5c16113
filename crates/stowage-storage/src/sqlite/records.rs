//! 레코드 저장/조회/삭제 (StorageTier 포트 구현).
//!
//! 임계값을 넘는 페이로드는 압축해 BLOB으로, 나머지는 JSON 원문 TEXT로 저장한다.
//! 예전 형식(압축 바이트를 쉼표로 이은 10진수 문자열)도 읽을 수 있다.

use async_trait::async_trait;
use rusqlite::types::ValueRef;
use rusqlite::ToSql;
use serde_json::Value;
use stowage_core::error::StorageError;
use stowage_core::models::record::{RecordPayload, StorageRecord};
use stowage_core::models::tier::{TierKind, WriteReceipt};
use stowage_core::ports::tier::StorageTier;
use tracing::{debug, error, warn};

use super::{lock, now_millis, tx_error, ConnectionState, DbLocation, SqliteRecordStore};
use crate::compression::{try_compress, try_decompress};

/// 예전 형식의 바이트 목록 문자열 해석 ("31,139,8,...")
///
/// 형식이 맞지 않으면 None.
pub fn decode_legacy_byte_list(text: &str) -> Option<Vec<u8>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(Vec::new());
    }
    trimmed
        .split(',')
        .map(|part| part.trim().parse::<u8>().ok())
        .collect()
}

/// DB 컬럼 값을 페이로드로 변환
fn payload_from_column(value: ValueRef<'_>, compressed: bool) -> RecordPayload {
    let raw: &[u8] = match value {
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => bytes,
        _ => &[],
    };

    match (compressed, value) {
        (true, ValueRef::Text(_)) => {
            let text = String::from_utf8_lossy(raw);
            match decode_legacy_byte_list(&text) {
                Some(bytes) => RecordPayload::Bytes(bytes),
                None => RecordPayload::Bytes(raw.to_vec()),
            }
        }
        (true, _) => RecordPayload::Bytes(raw.to_vec()),
        (false, _) => RecordPayload::Text(String::from_utf8_lossy(raw).into_owned()),
    }
}

impl SqliteRecordStore {
    /// JSON 값 저장 (덮어쓰기)
    pub async fn put(&self, id: &str, value: &Value) -> Result<WriteReceipt, StorageError> {
        let serialized = serde_json::to_string(value)?;
        self.put_serialized(id, &serialized).await
    }

    /// 직렬화된 JSON 텍스트 저장 (덮어쓰기)
    pub async fn put_serialized(
        &self,
        id: &str,
        serialized: &str,
    ) -> Result<WriteReceipt, StorageError> {
        let payload = self.encode_payload(serialized);
        let record = StorageRecord::new(id, payload, now_millis());
        self.write_record(&record).await?;

        debug!(
            "내구 저장: {id} ({}bytes → {}bytes, 압축={})",
            serialized.len(),
            record.payload.size_bytes(),
            record.compressed
        );
        Ok(WriteReceipt::durable(record.compressed))
    }

    /// 레코드를 그대로 저장 (upsert)
    pub async fn write_record(&self, record: &StorageRecord) -> Result<(), StorageError> {
        let conn = self.connection().await?;
        let mut conn = lock(conn)?;

        let data: &dyn ToSql = match &record.payload {
            RecordPayload::Text(text) => text as &dyn ToSql,
            RecordPayload::Bytes(bytes) => bytes as &dyn ToSql,
        };

        let tx = conn.transaction().map_err(tx_error("트랜잭션 시작 실패"))?;
        tx.execute(
            "INSERT OR REPLACE INTO records (id, data, timestamp, version, compressed)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            [
                &record.id as &dyn ToSql,
                data,
                &record.timestamp,
                &record.schema_version,
                &record.compressed,
            ]
            .as_slice(),
        )
        .map_err(tx_error("레코드 저장 실패"))?;
        tx.commit().map_err(tx_error("트랜잭션 커밋 실패"))?;
        Ok(())
    }

    /// 저장된 레코드 원형 조회
    pub async fn read_record(&self, id: &str) -> Result<Option<StorageRecord>, StorageError> {
        let conn = self.connection().await?;
        let conn = lock(conn)?;

        let result = conn.query_row(
            "SELECT id, data, timestamp, version, compressed FROM records WHERE id = ?1",
            [id],
            |row| {
                let compressed: bool = row.get(4)?;
                Ok(StorageRecord {
                    id: row.get(0)?,
                    payload: payload_from_column(row.get_ref(1)?, compressed),
                    timestamp: row.get(2)?,
                    schema_version: row.get(3)?,
                    compressed,
                })
            },
        );

        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(tx_error("레코드 조회 실패")(e)),
        }
    }

    /// 직렬화된 JSON 텍스트 조회 (압축 해제 포함)
    pub async fn read_text(&self, id: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .read_record(id)
            .await?
            .map(|record| self.decode_payload(record)))
    }

    /// JSON 값 조회. 없거나 실패하면 None (에러는 로그로만 남김)
    pub async fn get(&self, id: &str) -> Option<Value> {
        let text = match self.read_text(id).await {
            Ok(Some(text)) => text,
            Ok(None) => return None,
            Err(e) => {
                error!("내구 저장소 조회 실패: {id}: {e}");
                return None;
            }
        };

        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("내구 저장소 값 파싱 실패: {id}: {e}");
                None
            }
        }
    }

    /// 삭제. 트랜잭션 성공 여부 반환 (없는 키도 true)
    pub async fn remove(&self, id: &str) -> bool {
        match self.delete_record(id).await {
            Ok(_) => true,
            Err(e) => {
                error!("내구 저장소 삭제 실패: {id}: {e}");
                false
            }
        }
    }

    /// 삭제. 실제로 삭제된 레코드가 있으면 true
    pub async fn delete_record(&self, id: &str) -> Result<bool, StorageError> {
        let conn = self.connection().await?;
        let conn = lock(conn)?;
        let deleted = conn
            .execute("DELETE FROM records WHERE id = ?1", [id])
            .map_err(tx_error("레코드 삭제 실패"))?;
        Ok(deleted > 0)
    }

    fn encode_payload(&self, serialized: &str) -> RecordPayload {
        if serialized.len() as u64 > self.compression_threshold_bytes {
            if let Some(bytes) = try_compress(self.codec.as_ref(), serialized) {
                return RecordPayload::Bytes(bytes);
            }
        }
        RecordPayload::Text(serialized.to_string())
    }

    fn decode_payload(&self, record: StorageRecord) -> String {
        match record.payload {
            RecordPayload::Text(text) => text,
            RecordPayload::Bytes(bytes) => match try_decompress(self.codec.as_ref(), &bytes) {
                Some(text) => text,
                None => {
                    warn!("압축 해제 실패, 저장된 원문으로 처리: {}", record.id);
                    String::from_utf8_lossy(&bytes).into_owned()
                }
            },
        }
    }
}

#[async_trait]
impl StorageTier for SqliteRecordStore {
    fn kind(&self) -> TierKind {
        TierKind::Durable
    }

    async fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.read_text(key).await
    }

    async fn write(&self, key: &str, serialized: &str) -> Result<WriteReceipt, StorageError> {
        self.put_serialized(key, serialized).await
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        self.delete_record(key).await
    }

    fn is_known_empty(&self) -> bool {
        if self.state() != ConnectionState::Uninitialized {
            return false;
        }
        match self.location() {
            DbLocation::Memory => true,
            DbLocation::File(path) => !path.exists(),
        }
    }
}
