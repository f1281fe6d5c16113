//! 메모리 키-값 백엔드.
//!
//! 테스트와 임시 세션용. 선택적으로 실제 한도(hard limit)를 흉내 낸다.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use stowage_core::error::StorageError;
use stowage_core::ports::backend::KeyValueBackend;

use crate::quota::entry_size;

/// 메모리 백엔드
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<BTreeMap<String, String>>,
    hard_limit_bytes: Option<u64>,
    disabled: AtomicBool,
}

impl MemoryBackend {
    /// 한도 없는 백엔드
    pub fn new() -> Self {
        Self::default()
    }

    /// 실제 한도를 가진 백엔드. 초과 쓰기는 `QuotaExceeded`로 거부된다
    pub fn with_hard_limit(hard_limit_bytes: u64) -> Self {
        Self {
            hard_limit_bytes: Some(hard_limit_bytes),
            ..Self::default()
        }
    }

    /// 저장소 비활성화 상태 흉내 (모든 연산 실패)
    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::SeqCst);
    }

    fn check_enabled(&self) -> Result<(), StorageError> {
        if self.disabled.load(Ordering::SeqCst) {
            return Err(StorageError::Backend(
                "로컬 저장소가 비활성화되어 있습니다".to_string(),
            ));
        }
        Ok(())
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_enabled()?;
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_enabled()?;
        let mut entries = self.entries.write();

        if let Some(limit) = self.hard_limit_bytes {
            let used: u64 = entries.iter().map(|(k, v)| entry_size(k, v)).sum();
            let existing = entries.get(key).map(|v| entry_size(key, v)).unwrap_or(0);
            let after = used - existing + entry_size(key, value);
            if after > limit {
                return Err(StorageError::QuotaExceeded {
                    summary: format!("백엔드 한도 초과: {after}bytes > {limit}bytes"),
                    freed_bytes: 0,
                });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check_enabled()?;
        self.entries.write().remove(key);
        Ok(())
    }

    fn entries(&self) -> Result<Vec<(String, String)>, StorageError> {
        self.check_enabled()?;
        Ok(self
            .entries
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove() {
        let backend = MemoryBackend::new();
        backend.set("a", "1").unwrap();
        assert_eq!(backend.get("a").unwrap().as_deref(), Some("1"));
        backend.remove("a").unwrap();
        assert!(backend.get("a").unwrap().is_none());
        // 없는 키 삭제는 no-op
        backend.remove("a").unwrap();
    }

    #[test]
    fn hard_limit_rejects_without_partial_write() {
        let backend = MemoryBackend::with_hard_limit(10);
        backend.set("a", "12345").unwrap();

        let err = backend.set("b", "123456").unwrap_err();
        assert!(err.is_quota_exceeded());
        assert!(backend.get("b").unwrap().is_none());
        assert_eq!(backend.get("a").unwrap().as_deref(), Some("12345"));
    }

    #[test]
    fn overwrite_within_limit() {
        let backend = MemoryBackend::with_hard_limit(10);
        backend.set("a", "123456789").unwrap();
        // 같은 키 덮어쓰기는 기존 크기를 제외하고 계산
        backend.set("a", "987654321").unwrap();
        assert_eq!(backend.get("a").unwrap().as_deref(), Some("987654321"));
    }

    #[test]
    fn disabled_backend_fails() {
        let backend = MemoryBackend::new();
        backend.set_disabled(true);
        assert!(backend.entries().is_err());
        assert!(backend.set("a", "1").is_err());
        backend.set_disabled(false);
        assert!(backend.entries().unwrap().is_empty());
    }
}
