//! 저장소 설정 구조체.
//!
//! 빠른 계층 쿼터, 계층 분배 기준, 압축, 내구 계층, 공간 회수 정책을 정의한다.
//! `ConfigManager`를 통해 JSON 파일에서 로드.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 최상위 저장소 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StowageConfig {
    /// 데이터 디렉토리 (None이면 플랫폼 기본 경로)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    /// 빠른 계층 설정
    #[serde(default)]
    pub local: LocalTierConfig,
    /// 계층 분배 설정
    #[serde(default)]
    pub routing: RoutingConfig,
    /// 압축 설정
    #[serde(default)]
    pub compression: CompressionConfig,
    /// 내구 계층 설정
    #[serde(default)]
    pub durable: DurableTierConfig,
    /// 빠른 계층 공간 회수 정책
    #[serde(default = "default_eviction")]
    pub eviction: TransientKeyConfig,
    /// 내구 계층 정리(cleanup) 정책
    #[serde(default = "default_cleanup")]
    pub cleanup: TransientKeyConfig,
}

// ============================================================
// 계층별 설정
// ============================================================

/// 빠른 계층 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalTierConfig {
    /// 보수적 쿼터 한도 (bytes). 실제 한도보다 작게 잡아 여유를 남긴다
    #[serde(default = "default_local_quota_bytes")]
    pub quota_bytes: u64,
    /// 백엔드 실제 한도 (bytes)
    #[serde(default = "default_local_hard_limit_bytes")]
    pub hard_limit_bytes: u64,
    /// 데이터 디렉토리 내 파일 이름
    #[serde(default = "default_local_file_name")]
    pub file_name: String,
}

impl Default for LocalTierConfig {
    fn default() -> Self {
        Self {
            quota_bytes: default_local_quota_bytes(),
            hard_limit_bytes: default_local_hard_limit_bytes(),
            file_name: default_local_file_name(),
        }
    }
}

/// 계층 분배 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// 이 크기 미만(bytes)의 페이로드만 빠른 계층으로 보낸다
    #[serde(default = "default_fast_tier_max_bytes")]
    pub fast_tier_max_bytes: u64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            fast_tier_max_bytes: default_fast_tier_max_bytes(),
        }
    }
}

/// 압축 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionConfig {
    /// 압축 사용 여부 (false면 항상 원문 저장)
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// 이 크기(bytes)를 초과할 때만 압축 시도
    #[serde(default = "default_compression_threshold_bytes")]
    pub threshold_bytes: u64,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold_bytes: default_compression_threshold_bytes(),
        }
    }
}

/// 내구 계층 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurableTierConfig {
    /// 데이터 디렉토리 내 SQLite 파일 이름
    #[serde(default = "default_durable_file_name")]
    pub file_name: String,
    /// 통계에 보고할 가용 용량 (플랫폼이 신뢰할 만한 값을 주지 않으므로 고정값)
    #[serde(default = "default_reported_capacity_bytes")]
    pub reported_capacity_bytes: u64,
}

impl Default for DurableTierConfig {
    fn default() -> Self {
        Self {
            file_name: default_durable_file_name(),
            reported_capacity_bytes: default_reported_capacity_bytes(),
        }
    }
}

/// 임시 데이터 키 규칙
///
/// 키의 단어 구간(`_`, `-` 등 구분자와 camelCase 경계로 분리)이 마커와 일치하고
/// 보호 목록에 없으면 삭제 대상. 대소문자는 무시한다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransientKeyConfig {
    /// 임시 데이터 마커 (예: "_draft", 앞뒤 구분자는 무시)
    #[serde(default)]
    pub transient_markers: Vec<String>,
    /// 마커와 무관하게 보호할 키
    #[serde(default)]
    pub protected_keys: Vec<String>,
}

impl StowageConfig {
    /// 기본 설정 생성
    pub fn default_config() -> Self {
        Self {
            data_dir: None,
            local: LocalTierConfig::default(),
            routing: RoutingConfig::default(),
            compression: CompressionConfig::default(),
            durable: DurableTierConfig::default(),
            eviction: default_eviction(),
            cleanup: default_cleanup(),
        }
    }

    /// 설정값 검증
    pub fn validate(&self) -> Result<(), crate::error::StorageError> {
        use crate::error::StorageError;

        if self.local.quota_bytes == 0 {
            return Err(StorageError::Config(
                "local.quota_bytes는 0보다 커야 합니다".to_string(),
            ));
        }
        if self.local.quota_bytes > self.local.hard_limit_bytes {
            return Err(StorageError::Config(format!(
                "local.quota_bytes({})가 hard_limit_bytes({})를 초과합니다",
                self.local.quota_bytes, self.local.hard_limit_bytes
            )));
        }
        if self.routing.fast_tier_max_bytes > self.local.quota_bytes {
            return Err(StorageError::Config(format!(
                "routing.fast_tier_max_bytes({})가 local.quota_bytes({})를 초과합니다",
                self.routing.fast_tier_max_bytes, self.local.quota_bytes
            )));
        }
        Ok(())
    }
}

impl Default for StowageConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

// ============================================================
// 기본값 함수
// ============================================================

fn default_true() -> bool {
    true
}

fn default_local_quota_bytes() -> u64 {
    4 * 1024 * 1024
}
fn default_local_hard_limit_bytes() -> u64 {
    5 * 1024 * 1024
}
fn default_local_file_name() -> String {
    "local_store.json".to_string()
}
fn default_fast_tier_max_bytes() -> u64 {
    50 * 1024
}
fn default_compression_threshold_bytes() -> u64 {
    100 * 1024
}
fn default_durable_file_name() -> String {
    "stowage.db".to_string()
}
fn default_reported_capacity_bytes() -> u64 {
    10 * 1024 * 1024 * 1024
}

fn default_eviction() -> TransientKeyConfig {
    TransientKeyConfig {
        transient_markers: vec!["_draft".into(), "_temp".into(), "_cache".into()],
        protected_keys: vec![
            "brand_kit".into(),
            "settings".into(),
            "saved_playbooks".into(),
            "saved_responses".into(),
            "cro_analyses".into(),
        ],
    }
}

fn default_cleanup() -> TransientKeyConfig {
    TransientKeyConfig {
        transient_markers: vec!["draft".into(), "temp".into()],
        protected_keys: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let json = r#"{ "local": { "quota_bytes": 1048576 } }"#;
        let config: StowageConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.local.quota_bytes, 1_048_576);
        assert_eq!(config.local.hard_limit_bytes, 5 * 1024 * 1024);
        assert_eq!(config.routing.fast_tier_max_bytes, 50 * 1024);
        assert_eq!(config.eviction.transient_markers.len(), 3);
        assert_eq!(config.cleanup.transient_markers, vec!["draft", "temp"]);
    }

    #[test]
    fn default_config_is_valid() {
        assert!(StowageConfig::default_config().validate().is_ok());
    }

    #[test]
    fn quota_above_hard_limit_is_rejected() {
        let mut config = StowageConfig::default_config();
        config.local.quota_bytes = config.local.hard_limit_bytes + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_quota_is_rejected() {
        let mut config = StowageConfig::default_config();
        config.local.quota_bytes = 0;
        assert!(config.validate().is_err());
    }
}
