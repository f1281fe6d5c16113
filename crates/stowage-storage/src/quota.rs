//! 빠른 계층 쿼터 추정.
//!
//! 문자 수가 아니라 UTF-8 바이트 길이로 계산한다.
//! 한도는 백엔드 실제 한도보다 작은 보수적 값(기본 4MB)을 쓴다.

use stowage_core::error::StorageError;
use stowage_core::models::quota::QuotaEstimate;
use stowage_core::ports::backend::KeyValueBackend;

/// 키-값 쌍 하나가 차지하는 바이트 (키 + 값, UTF-8)
pub fn entry_size(key: &str, value: &str) -> u64 {
    (key.len() + value.len()) as u64
}

/// 쿼터 추정기 (부수효과 없음)
#[derive(Debug, Clone, Copy)]
pub struct QuotaEstimator {
    quota_bytes: u64,
}

impl QuotaEstimator {
    pub fn new(quota_bytes: u64) -> Self {
        Self { quota_bytes }
    }

    /// 적용 한도 (bytes)
    pub fn quota_bytes(&self) -> u64 {
        self.quota_bytes
    }

    /// 현재 저장된 모든 키-값 쌍의 바이트 합
    pub fn usage(&self, backend: &dyn KeyValueBackend) -> Result<u64, StorageError> {
        Ok(backend
            .entries()?
            .iter()
            .map(|(key, value)| entry_size(key, value))
            .sum())
    }

    /// 직렬화된 페이로드를 추가로 저장할 수 있는지 추정
    pub fn estimate(&self, backend: &dyn KeyValueBackend, payload: &str) -> QuotaEstimate {
        match self.usage(backend) {
            Ok(used) => self.build_estimate(used, payload.len() as u64),
            Err(e) => QuotaEstimate::unavailable(e),
        }
    }

    /// 키를 포함해 추정. 같은 키의 기존 값은 덮어쓰므로 사용량에서 뺀다
    pub fn estimate_for_key(
        &self,
        backend: &dyn KeyValueBackend,
        key: &str,
        payload: &str,
    ) -> QuotaEstimate {
        let used = match self.usage(backend) {
            Ok(used) => used,
            Err(e) => return QuotaEstimate::unavailable(e),
        };
        let existing = match backend.get(key) {
            Ok(Some(previous)) => entry_size(key, &previous),
            Ok(None) => 0,
            Err(e) => return QuotaEstimate::unavailable(e),
        };

        let mut estimate = self.build_estimate(used, entry_size(key, payload));
        if existing > 0 {
            let adjusted = used.saturating_sub(existing) + entry_size(key, payload);
            estimate.can_save = adjusted <= self.quota_bytes;
        }
        estimate
    }

    fn build_estimate(&self, used: u64, incoming: u64) -> QuotaEstimate {
        let used_kb = used as f64 / 1024.0;
        let total_kb = self.quota_bytes as f64 / 1024.0;
        let incoming_kb = incoming as f64 / 1024.0;
        let percentage_used = if self.quota_bytes == 0 {
            100.0
        } else {
            used as f64 / self.quota_bytes as f64 * 100.0
        };

        QuotaEstimate {
            can_save: used.saturating_add(incoming) <= self.quota_bytes,
            used_kb,
            total_kb,
            percentage_used,
            summary: format!(
                "{used_kb:.1}KB / {total_kb:.1}KB 사용 ({percentage_used:.1}%), 추가 {incoming_kb:.1}KB"
            ),
        }
    }
}
