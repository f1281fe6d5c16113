//! 동기 키-값 백엔드 포트.
//!
//! 구현: `stowage-storage::local` (메모리, JSON 파일)

use crate::error::StorageError;

/// 동기 키-값 저장소 (빠른 계층의 물리 저장소)
///
/// 모든 연산은 블로킹이지만 메모리 접근 수준으로 짧다.
pub trait KeyValueBackend: Send + Sync {
    /// 값 조회
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// 값 저장
    ///
    /// 실패 시 이전 상태를 그대로 유지해야 한다 (부분 쓰기 금지).
    /// 실제 한도를 넘으면 `StorageError::QuotaExceeded`.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// 값 삭제 (없으면 no-op)
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// 모든 (키, 값) 쌍 (사용량 계산과 공간 회수용)
    fn entries(&self) -> Result<Vec<(String, String)>, StorageError>;
}
