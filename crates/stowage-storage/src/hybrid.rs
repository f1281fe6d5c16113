//! 크기 기반 분배 파사드.
//!
//! 직렬화 크기가 `fast_tier_max_bytes` 미만이면 빠른 계층에, 이상이면 내구 계층에 쓴다.
//! 빠른 계층 쓰기가 실패하면 내구 계층으로 대체한다 (어느 계층이든 저장은 보장).
//! 읽기는 빠른 계층을 먼저 보고, 없거나 파싱에 실패하면 내구 계층을 본다.
//! 쓰기 후에는 다른 계층의 이전 값을 지운다. 빠른 계층의 이전 값을 지우지 못해
//! 새 값이 가려지는 경우에는 내구 계층 쓰기를 되돌리고 에러를 반환한다.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use stowage_core::error::StorageError;
use stowage_core::models::tier::{SetOutcome, TierKind};
use stowage_core::ports::tier::StorageTier;
use tracing::{debug, error, warn};

/// 2계층 저장소 파사드
#[derive(Clone)]
pub struct HybridStorage {
    fast: Arc<dyn StorageTier>,
    durable: Arc<dyn StorageTier>,
    fast_tier_max_bytes: u64,
}

impl HybridStorage {
    pub fn new(
        fast: Arc<dyn StorageTier>,
        durable: Arc<dyn StorageTier>,
        fast_tier_max_bytes: u64,
    ) -> Self {
        Self {
            fast,
            durable,
            fast_tier_max_bytes,
        }
    }

    /// 빠른 계층 크기 상한 (bytes, 미만이면 빠른 계층)
    pub fn fast_tier_max_bytes(&self) -> u64 {
        self.fast_tier_max_bytes
    }

    /// 직렬화 크기로 목표 계층 결정
    pub fn route(&self, serialized_len: usize) -> TierKind {
        if (serialized_len as u64) < self.fast_tier_max_bytes {
            TierKind::Local
        } else {
            TierKind::Durable
        }
    }

    /// JSON 값 저장
    pub async fn set_item(&self, key: &str, value: &Value) -> Result<SetOutcome, StorageError> {
        self.save(key, value).await
    }

    /// 직렬화 가능한 값 저장
    pub async fn save<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<SetOutcome, StorageError> {
        let serialized = serde_json::to_string(value)?;
        self.set_serialized(key, &serialized).await
    }

    /// 직렬화된 JSON 텍스트 저장
    pub async fn set_serialized(
        &self,
        key: &str,
        serialized: &str,
    ) -> Result<SetOutcome, StorageError> {
        let outcome = match self.route(serialized.len()) {
            TierKind::Local => match self.fast.write(key, serialized).await {
                Ok(receipt) => SetOutcome {
                    method: receipt.tier,
                    compressed: receipt.compressed,
                    fell_back: false,
                },
                Err(e) => {
                    warn!("빠른 계층 저장 실패, 내구 계층으로 대체: {key}: {e}");
                    let receipt = self.durable.write(key, serialized).await?;
                    SetOutcome {
                        method: receipt.tier,
                        compressed: receipt.compressed,
                        fell_back: true,
                    }
                }
            },
            TierKind::Durable => {
                let receipt = self.durable.write(key, serialized).await?;
                SetOutcome {
                    method: receipt.tier,
                    compressed: receipt.compressed,
                    fell_back: false,
                }
            }
        };

        match outcome.method {
            TierKind::Local => {
                // 빠른 계층이 먼저 읽히므로 내구 계층 사본 삭제 실패는 값을 가리지 않는다
                if !self.durable.is_known_empty() {
                    if let Err(e) = self.durable.delete(key).await {
                        warn!("이전 내구 계층 사본 삭제 실패: {key}: {e}");
                    }
                }
            }
            TierKind::Durable => self.drop_fast_copy(key).await?,
        }

        debug!(
            "저장 완료: {key} → {} ({}bytes, 압축={})",
            outcome.method,
            serialized.len(),
            outcome.compressed
        );
        Ok(outcome)
    }

    /// 내구 계층에 쓴 뒤 빠른 계층의 이전 값 제거
    ///
    /// 삭제에 실패했는데 이전 값이 여전히 읽히면 새 값이 가려지므로
    /// 방금 쓴 내구 계층 레코드를 되돌리고 에러를 반환한다.
    async fn drop_fast_copy(&self, key: &str) -> Result<(), StorageError> {
        let err = match self.fast.delete(key).await {
            Ok(_) => return Ok(()),
            Err(e) => e,
        };

        match self.fast.read(key).await {
            Ok(Some(_)) => {}
            Ok(None) | Err(_) => {
                warn!("이전 빠른 계층 사본 삭제 실패 (조회되지 않음): {key}: {err}");
                return Ok(());
            }
        }

        error!("이전 빠른 계층 사본 삭제 실패, 내구 계층 쓰기 취소: {key}: {err}");
        if let Err(e) = self.durable.delete(key).await {
            error!("내구 계층 쓰기 취소 실패: {key}: {e}");
        }
        Err(err)
    }

    /// JSON 값 조회. 어느 계층에도 없거나 실패하면 None
    pub async fn get_item(&self, key: &str) -> Option<Value> {
        match self.try_get_item(key).await {
            Ok(value) => value,
            Err(e) => {
                error!("조회 실패: {key}: {e}");
                None
            }
        }
    }

    /// JSON 값 조회 (내구 계층 에러는 전달)
    pub async fn try_get_item(&self, key: &str) -> Result<Option<Value>, StorageError> {
        match self.fast.read(key).await {
            Ok(Some(text)) => match serde_json::from_str(&text) {
                Ok(value) => return Ok(Some(value)),
                Err(e) => warn!("빠른 계층 값 파싱 실패, 내구 계층 확인: {key}: {e}"),
            },
            Ok(None) => {}
            Err(e) => warn!("빠른 계층 조회 실패, 내구 계층 확인: {key}: {e}"),
        }

        if self.durable.is_known_empty() {
            return Ok(None);
        }

        match self.durable.read(key).await? {
            Some(text) => match serde_json::from_str(&text) {
                Ok(value) => Ok(Some(value)),
                Err(e) => {
                    warn!("내구 계층 값 파싱 실패: {key}: {e}");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// 타입 지정 조회. 없으면 `NotFound`
    pub async fn load<T: DeserializeOwned>(&self, key: &str) -> Result<T, StorageError> {
        let value = self
            .try_get_item(key)
            .await?
            .ok_or_else(|| StorageError::NotFound {
                key: key.to_string(),
            })?;
        Ok(serde_json::from_value(value)?)
    }

    /// 두 계층 모두에서 삭제. 어느 쪽도 실패하지 않았으면 true (없던 키 포함)
    pub async fn remove_item(&self, key: &str) -> bool {
        let mut ok = true;
        for tier in [&self.fast, &self.durable] {
            if tier.is_known_empty() {
                continue;
            }
            if let Err(e) = tier.delete(key).await {
                error!("{} 삭제 실패: {key}: {e}", tier.kind());
                ok = false;
            }
        }
        ok
    }
}
