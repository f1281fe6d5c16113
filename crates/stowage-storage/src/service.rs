//! 저장소 서비스.
//!
//! 앱 시작 시 한 번 구성해 호출자에게 주입한다. 내구 계층 연결은
//! 이 인스턴스가 보관하는 `SqliteRecordStore` 안에서 한 번만 열린다.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use stowage_core::config::StowageConfig;
use stowage_core::error::StorageError;
use stowage_core::models::quota::{QuotaEstimate, QuotaSnapshot, ReclaimReport};
use stowage_core::ports::codec::PayloadCodec;
use tracing::info;

use crate::compression::{DisabledCodec, GzipCodec};
use crate::hybrid::HybridStorage;
use crate::local::{FileBackend, LocalStore, MemoryBackend};
use crate::sqlite::{RecordStoreOptions, SqliteRecordStore};

/// 두 계층과 파사드를 묶은 저장소 서비스
#[derive(Clone)]
pub struct StowageService {
    local: Arc<LocalStore>,
    records: Arc<SqliteRecordStore>,
    storage: HybridStorage,
}

impl StowageService {
    /// 데이터 디렉토리 아래 파일 기반 구성
    ///
    /// 빠른 계층 파일은 즉시 읽고, 내구 계층 DB는 첫 사용 시 연다.
    pub fn open(config: &StowageConfig, data_dir: &Path) -> Result<Self, StorageError> {
        config.validate()?;
        std::fs::create_dir_all(data_dir)?;

        let backend = FileBackend::open(
            data_dir.join(&config.local.file_name),
            config.local.hard_limit_bytes,
        )?;
        let local = LocalStore::from_config(Arc::new(backend), config);
        let records = SqliteRecordStore::open(
            data_dir.join(&config.durable.file_name),
            RecordStoreOptions::from_config(config, codec_for(config)),
        );

        info!("저장소 서비스 구성: {}", data_dir.display());
        Ok(Self::from_parts(config, local, records))
    }

    /// 인메모리 구성 (테스트용)
    pub fn in_memory(config: &StowageConfig) -> Result<Self, StorageError> {
        config.validate()?;

        let backend = MemoryBackend::with_hard_limit(config.local.hard_limit_bytes);
        let local = LocalStore::from_config(Arc::new(backend), config);
        let records = SqliteRecordStore::in_memory(RecordStoreOptions::from_config(
            config,
            codec_for(config),
        ));
        Ok(Self::from_parts(config, local, records))
    }

    /// 이미 만든 계층으로 구성
    pub fn from_parts(config: &StowageConfig, local: LocalStore, records: SqliteRecordStore) -> Self {
        let local = Arc::new(local);
        let records = Arc::new(records);
        let storage = HybridStorage::new(
            local.clone(),
            records.clone(),
            config.routing.fast_tier_max_bytes,
        );
        Self {
            local,
            records,
            storage,
        }
    }

    /// get/set/remove 파사드
    pub fn storage(&self) -> &HybridStorage {
        &self.storage
    }

    /// 빠른 계층
    pub fn local(&self) -> &Arc<LocalStore> {
        &self.local
    }

    /// 내구 계층
    pub fn records(&self) -> &Arc<SqliteRecordStore> {
        &self.records
    }

    /// 빠른 계층에 `payload`를 더 쓸 수 있는지 추정
    pub fn local_quota(&self, payload: &str) -> QuotaEstimate {
        self.local.estimate_quota(payload)
    }

    /// 내구 계층 통계
    pub async fn durable_stats(&self) -> Result<QuotaSnapshot, StorageError> {
        self.records.stats().await
    }

    /// 빠른 계층 임시 데이터 회수
    pub fn reclaim_local(&self) -> ReclaimReport {
        self.local.reclaim()
    }

    /// 내구 계층의 오래된 임시 레코드 정리
    pub async fn cleanup_durable(&self, max_age: Duration) -> Result<usize, StorageError> {
        self.records.cleanup(max_age).await
    }
}

fn codec_for(config: &StowageConfig) -> Arc<dyn PayloadCodec> {
    if config.compression.enabled {
        Arc::new(GzipCodec::new())
    } else {
        Arc::new(DisabledCodec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stowage_core::models::tier::TierKind;
    use tempfile::TempDir;

    #[tokio::test]
    async fn file_service_round_trip() {
        let temp = TempDir::new().unwrap();
        let config = StowageConfig::default_config();

        let service = StowageService::open(&config, temp.path()).unwrap();
        let outcome = service
            .storage()
            .set_item("settings", &json!({ "theme": "dark" }))
            .await
            .unwrap();
        assert_eq!(outcome.method, TierKind::Local);
        drop(service);

        let reopened = StowageService::open(&config, temp.path()).unwrap();
        assert_eq!(
            reopened.storage().get_item("settings").await,
            Some(json!({ "theme": "dark" }))
        );
    }

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let mut config = StowageConfig::default_config();
        config.local.quota_bytes = 0;
        assert!(StowageService::in_memory(&config).is_err());
    }

    #[tokio::test]
    async fn durable_stats_open_lazily() {
        let service = StowageService::in_memory(&StowageConfig::default_config()).unwrap();
        assert_eq!(service.records().open_attempts(), 0);

        let stats = service.durable_stats().await.unwrap();
        assert_eq!(stats.item_count, 0);
        assert_eq!(service.records().open_attempts(), 1);
    }

    #[tokio::test]
    async fn maintenance_entry_points() {
        let service = StowageService::in_memory(&StowageConfig::default_config()).unwrap();
        service
            .storage()
            .set_item("post_draft", &json!("scratch"))
            .await
            .unwrap();

        let estimate = service.local_quota("\"more\"");
        assert!(estimate.can_save);

        let report = service.reclaim_local();
        assert_eq!(report.removed_keys, vec!["post_draft".to_string()]);
        assert_eq!(
            service
                .cleanup_durable(Duration::from_secs(60))
                .await
                .unwrap(),
            0
        );
    }
}
