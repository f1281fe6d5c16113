//! 빠른 계층 (동기 키-값 저장소).
//!
//! 쓰기 전에 쿼터를 추정하고, 부족하면 임시 데이터를 회수한 뒤 한 번 더 추정한다.
//! 사전 추정을 통과해도 백엔드가 한도 초과로 거부할 수 있으므로
//! (다른 프로세스가 동시에 공간을 쓰는 경우 등) 그때도 회수 후 한 번 재시도한다.

mod file;
mod memory;

pub use file::FileBackend;
pub use memory::MemoryBackend;

use async_trait::async_trait;
use std::sync::Arc;
use stowage_core::config::StowageConfig;
use stowage_core::error::StorageError;
use stowage_core::models::quota::{QuotaEstimate, ReclaimReport};
use stowage_core::models::tier::{TierKind, WriteReceipt};
use stowage_core::ports::backend::KeyValueBackend;
use stowage_core::ports::tier::StorageTier;
use tracing::{debug, info, warn};

use crate::eviction::TransientKeyPolicy;
use crate::quota::{entry_size, QuotaEstimator};

/// 빠른 계층: `StorageTier` 포트 구현
pub struct LocalStore {
    backend: Arc<dyn KeyValueBackend>,
    estimator: QuotaEstimator,
    policy: TransientKeyPolicy,
}

impl LocalStore {
    pub fn new(
        backend: Arc<dyn KeyValueBackend>,
        estimator: QuotaEstimator,
        policy: TransientKeyPolicy,
    ) -> Self {
        Self {
            backend,
            estimator,
            policy,
        }
    }

    /// 설정의 쿼터/회수 정책으로 생성
    pub fn from_config(backend: Arc<dyn KeyValueBackend>, config: &StowageConfig) -> Self {
        Self::new(
            backend,
            QuotaEstimator::new(config.local.quota_bytes),
            TransientKeyPolicy::from_config(&config.eviction),
        )
    }

    /// 물리 백엔드 참조
    pub fn backend(&self) -> &Arc<dyn KeyValueBackend> {
        &self.backend
    }

    /// 직렬화된 페이로드의 쿼터 추정
    pub fn estimate_quota(&self, serialized: &str) -> QuotaEstimate {
        self.estimator.estimate(self.backend.as_ref(), serialized)
    }

    /// 현재 사용량 (bytes)
    pub fn usage(&self) -> Result<u64, StorageError> {
        self.estimator.usage(self.backend.as_ref())
    }

    /// 값 조회
    pub fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.backend.get(key)
    }

    /// 삭제. 원래 있었으면 true
    pub fn remove(&self, key: &str) -> Result<bool, StorageError> {
        let existed = self.backend.get(key)?.is_some();
        self.backend.remove(key)?;
        Ok(existed)
    }

    /// 임시 데이터 회수 (best-effort, 0바이트일 수 있음)
    pub fn reclaim(&self) -> ReclaimReport {
        let mut report = ReclaimReport::default();

        let entries = match self.backend.entries() {
            Ok(entries) => entries,
            Err(e) => {
                warn!("공간 회수 중 항목 조회 실패: {e}");
                return report;
            }
        };

        for (key, value) in entries {
            if !self.policy.is_evictable(&key) {
                continue;
            }
            match self.backend.remove(&key) {
                Ok(()) => {
                    report.freed_bytes += entry_size(&key, &value);
                    report.removed_keys.push(key);
                }
                Err(e) => warn!("임시 항목 삭제 실패: {key}: {e}"),
            }
        }

        if report.removed_keys.is_empty() {
            debug!("공간 회수: 삭제 대상 없음");
        } else {
            info!(
                "공간 회수: {}개 항목, {:.1}KB 확보",
                report.removed_keys.len(),
                report.freed_kb()
            );
        }
        report
    }

    /// 쿼터 확인 후 쓰기 (필요 시 회수 + 재시도)
    pub fn try_set(&self, key: &str, serialized: &str) -> Result<WriteReceipt, StorageError> {
        let backend = self.backend.as_ref();
        let mut freed_bytes = 0;

        let estimate = self.estimator.estimate_for_key(backend, key, serialized);
        if !estimate.can_save {
            warn!("로컬 저장소 용량 부족, 공간 회수 시도: {}", estimate.summary);
            freed_bytes += self.reclaim().freed_bytes;

            let retry = self.estimator.estimate_for_key(backend, key, serialized);
            if !retry.can_save {
                return Err(StorageError::QuotaExceeded {
                    summary: retry.summary,
                    freed_bytes,
                });
            }
        }

        match backend.set(key, serialized) {
            Ok(()) => {}
            Err(e) if e.is_quota_exceeded() => {
                warn!("사전 추정 통과 후 쓰기 거부, 회수 후 재시도: {e}");
                freed_bytes += self.reclaim().freed_bytes;
                backend.set(key, serialized).map_err(|e| match e {
                    StorageError::QuotaExceeded { summary, .. } => StorageError::QuotaExceeded {
                        summary,
                        freed_bytes,
                    },
                    other => other,
                })?;
            }
            Err(e) => return Err(e),
        }

        debug!("로컬 저장: {key} ({}bytes)", serialized.len());
        Ok(WriteReceipt::local(freed_bytes))
    }
}

#[async_trait]
impl StorageTier for LocalStore {
    fn kind(&self) -> TierKind {
        TierKind::Local
    }

    async fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.get(key)
    }

    async fn write(&self, key: &str, serialized: &str) -> Result<WriteReceipt, StorageError> {
        self.try_set(key, serialized)
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        self.remove(key)
    }
}
