//! 쿼터 추정 및 사용량 스냅샷.

use serde::{Deserialize, Serialize};

/// 빠른 계층 쓰기 가능 여부 추정 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaEstimate {
    /// 쓰기 후에도 한도 이내인지
    pub can_save: bool,
    /// 현재 사용량 (KB)
    pub used_kb: f64,
    /// 적용 한도 (KB)
    pub total_kb: f64,
    /// 사용률 (0~100, 쓰기 전 기준)
    pub percentage_used: f64,
    /// 사람이 읽을 수 있는 요약
    pub summary: String,
}

impl QuotaEstimate {
    /// 사용량 조회 자체가 실패한 경우
    pub fn unavailable(reason: impl std::fmt::Display) -> Self {
        Self {
            can_save: false,
            used_kb: 0.0,
            total_kb: 0.0,
            percentage_used: 0.0,
            summary: format!("저장소 사용량 확인 불가: {reason}"),
        }
    }
}

/// 내구 계층 사용량 스냅샷 (요청 시 계산, 저장하지 않음)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaSnapshot {
    /// 페이로드 총 바이트
    pub used_bytes: u64,
    /// 남은 용량 추정치
    pub available_bytes: u64,
    /// 레코드 수
    pub item_count: u64,
    /// 가장 오래된 레코드 시각 (ms)
    pub oldest_timestamp: Option<i64>,
    /// 가장 최근 레코드 시각 (ms)
    pub newest_timestamp: Option<i64>,
}

/// 공간 회수 결과
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReclaimReport {
    /// 확보한 바이트 수
    pub freed_bytes: u64,
    /// 삭제된 키
    pub removed_keys: Vec<String>,
}

impl ReclaimReport {
    pub fn freed_kb(&self) -> f64 {
        self.freed_bytes as f64 / 1024.0
    }
}
