//! 사용량 통계 및 오래된 임시 레코드 정리

use std::time::Duration;
use stowage_core::error::StorageError;
use stowage_core::models::quota::QuotaSnapshot;
use tracing::{debug, info};

use super::{lock, now_millis, tx_error, SqliteRecordStore};

impl SqliteRecordStore {
    /// 저장 레코드 통계
    pub async fn stats(&self) -> Result<QuotaSnapshot, StorageError> {
        let conn = self.connection().await?;
        let conn = lock(conn)?;

        let (item_count, used_bytes, oldest_timestamp, newest_timestamp) = conn
            .query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(length(CAST(data AS BLOB))), 0),
                        MIN(timestamp),
                        MAX(timestamp)
                 FROM records",
                [],
                |row| {
                    Ok((
                        row.get::<_, u64>(0)?,
                        row.get::<_, u64>(1)?,
                        row.get::<_, Option<i64>>(2)?,
                        row.get::<_, Option<i64>>(3)?,
                    ))
                },
            )
            .map_err(tx_error("통계 조회 실패"))?;

        Ok(QuotaSnapshot {
            used_bytes,
            available_bytes: self.reported_capacity_bytes.saturating_sub(used_bytes),
            item_count,
            oldest_timestamp,
            newest_timestamp,
        })
    }

    /// `max_age`보다 오래된 임시 레코드 삭제. 삭제 개수 반환
    ///
    /// 임시 마커에 걸리지 않는 키는 아무리 오래되어도 남긴다.
    pub async fn cleanup(&self, max_age: Duration) -> Result<usize, StorageError> {
        let max_age_ms = i64::try_from(max_age.as_millis()).unwrap_or(i64::MAX);
        let cutoff = now_millis().saturating_sub(max_age_ms);
        self.cleanup_older_than(cutoff).await
    }

    /// 타임스탬프(ms)가 `cutoff`보다 이전인 임시 레코드 삭제
    pub async fn cleanup_older_than(&self, cutoff: i64) -> Result<usize, StorageError> {
        let conn = self.connection().await?;
        let mut conn = lock(conn)?;

        let tx = conn.transaction().map_err(tx_error("트랜잭션 시작 실패"))?;
        let expired: Vec<String> = {
            let mut stmt = tx
                .prepare("SELECT id FROM records WHERE timestamp < ?1 ORDER BY timestamp ASC")
                .map_err(tx_error("정리 대상 조회 실패"))?;
            let rows = stmt
                .query_map([cutoff], |row| row.get(0))
                .map_err(tx_error("정리 대상 조회 실패"))?;
            rows.collect::<Result<_, _>>()
                .map_err(tx_error("정리 대상 조회 실패"))?
        };

        let mut deleted = 0;
        let mut kept = 0;
        for id in &expired {
            if !self.cleanup_policy.is_evictable(id) {
                kept += 1;
                continue;
            }
            deleted += tx
                .execute("DELETE FROM records WHERE id = ?1", [id])
                .map_err(tx_error("레코드 정리 실패"))?;
        }
        tx.commit().map_err(tx_error("트랜잭션 커밋 실패"))?;

        if deleted > 0 {
            info!("정리: 오래된 임시 레코드 {deleted}개 삭제 (보존 {kept}개)");
        } else {
            debug!("정리: 삭제 대상 없음 (오래된 레코드 {}개)", expired.len());
        }
        Ok(deleted)
    }
}
