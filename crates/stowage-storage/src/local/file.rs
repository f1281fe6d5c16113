//! JSON 파일 키-값 백엔드.
//!
//! 전체 맵을 메모리에 두고, 변경 시 임시 파일에 쓴 뒤 rename으로 교체한다.
//! 디스크 쓰기가 실패하면 메모리 상태도 바꾸지 않는다.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use stowage_core::error::StorageError;
use stowage_core::ports::backend::KeyValueBackend;
use tracing::{debug, info};

use crate::quota::entry_size;

/// 파일 백엔드
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
    hard_limit_bytes: u64,
}

impl FileBackend {
    /// 파일을 열거나 새로 만든다
    pub fn open(path: impl Into<PathBuf>, hard_limit_bytes: u64) -> Result<Self, StorageError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let entries = if path.exists() {
            let content = fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).map_err(|e| {
                    StorageError::Backend(format!(
                        "로컬 저장소 파일 파싱 실패: {}: {e}",
                        path.display()
                    ))
                })?
            }
        } else {
            BTreeMap::new()
        };

        info!(
            "로컬 저장소 열기: {} ({}개 항목)",
            path.display(),
            entries.len()
        );

        Ok(Self {
            path,
            entries: Mutex::new(entries),
            hard_limit_bytes,
        })
    }

    /// 파일 경로
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let content = serde_json::to_string(entries)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content)?;
        fs::rename(&tmp_path, &self.path)?;
        debug!("로컬 저장소 파일 저장: {}", self.path.display());
        Ok(())
    }
}

impl KeyValueBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock();

        let used: u64 = entries.iter().map(|(k, v)| entry_size(k, v)).sum();
        let existing = entries.get(key).map(|v| entry_size(key, v)).unwrap_or(0);
        let after = used - existing + entry_size(key, value);
        if after > self.hard_limit_bytes {
            return Err(StorageError::QuotaExceeded {
                summary: format!(
                    "백엔드 한도 초과: {after}bytes > {}bytes",
                    self.hard_limit_bytes
                ),
                freed_bytes: 0,
            });
        }

        let mut next = entries.clone();
        next.insert(key.to_string(), value.to_string());
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock();
        if !entries.contains_key(key) {
            return Ok(());
        }

        let mut next = entries.clone();
        next.remove(key);
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }

    fn entries(&self) -> Result<Vec<(String, String)>, StorageError> {
        Ok(self
            .entries
            .lock()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}
