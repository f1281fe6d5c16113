//! CLI 하위 명령 실행

use anyhow::{Context, Result};
use clap::Subcommand;
use serde_json::{json, Value};
use std::time::Duration;
use stowage_storage::StowageService;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 키 조회 (빠른 계층 → 내구 계층)
    Get { key: String },

    /// 키 저장 (값은 JSON 텍스트)
    Set {
        key: String,
        /// 저장할 JSON 값
        value: String,
        /// 저장 전 문자열 필드 앞뒤 공백 제거
        #[arg(long)]
        compact: bool,
    },

    /// 두 계층에서 키 삭제
    Remove { key: String },

    /// 빠른 계층 쿼터 사용량
    Quota,

    /// 내구 계층 통계
    Stats,

    /// 빠른 계층 임시 데이터 회수
    Reclaim,

    /// 내구 계층의 오래된 임시 레코드 정리
    Cleanup {
        /// 이 일수보다 오래된 레코드만 대상
        #[arg(long)]
        max_age_days: u64,
    },
}

/// 명령 실행 후 출력할 JSON 반환
pub async fn run(service: &StowageService, command: Command) -> Result<Value> {
    let storage = service.storage();

    let output = match command {
        Command::Get { key } => {
            let value = storage.try_get_item(&key).await?;
            json!({ "key": key, "found": value.is_some(), "value": value })
        }
        Command::Set {
            key,
            value,
            compact,
        } => {
            let mut parsed: Value = serde_json::from_str(&value)
                .with_context(|| format!("JSON 값 파싱 실패: {key}"))?;
            if compact {
                parsed = stowage_core::compact::compact(parsed);
            }
            let outcome = storage.set_item(&key, &parsed).await?;
            json!({ "key": key, "outcome": outcome })
        }
        Command::Remove { key } => {
            let removed = storage.remove_item(&key).await;
            json!({ "key": key, "success": removed })
        }
        Command::Quota => serde_json::to_value(service.local_quota(""))?,
        Command::Stats => serde_json::to_value(service.durable_stats().await?)?,
        Command::Reclaim => serde_json::to_value(service.reclaim_local())?,
        Command::Cleanup { max_age_days } => {
            let max_age = Duration::from_secs(max_age_days.saturating_mul(SECS_PER_DAY));
            let deleted = service.cleanup_durable(max_age).await?;
            json!({ "deleted": deleted, "max_age_days": max_age_days })
        }
    };
    Ok(output)
}
