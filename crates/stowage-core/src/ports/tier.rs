//! 저장 계층 포트.
//!
//! 구현: `stowage-storage::local::LocalStore` (빠른 계층),
//! `stowage-storage::sqlite::SqliteRecordStore` (내구 계층)

use async_trait::async_trait;

use crate::error::StorageError;
use crate::models::tier::{TierKind, WriteReceipt};

/// 직렬화된 JSON 텍스트를 키로 저장하는 계층
///
/// `HybridStorage`는 크기에 따라 두 구현 중 하나로 분배한다.
#[async_trait]
pub trait StorageTier: Send + Sync {
    /// 계층 종류
    fn kind(&self) -> TierKind;

    /// 직렬화된 값 조회 (없으면 None)
    async fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// 직렬화된 값 저장 (덮어쓰기)
    async fn write(&self, key: &str, serialized: &str) -> Result<WriteReceipt, StorageError>;

    /// 삭제. 실제로 삭제했으면 true, 원래 없었으면 false
    async fn delete(&self, key: &str) -> Result<bool, StorageError>;

    /// 아직 열리지 않았고 저장된 데이터가 없음이 확실하면 true
    ///
    /// true이면 파사드는 이 계층의 조회/삭제를 건너뛴다 (열기 비용 회피).
    fn is_known_empty(&self) -> bool {
        false
    }
}
