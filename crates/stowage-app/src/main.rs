//! Stowage 운영 CLI 진입점.
//!
//! 설정 로드 → 저장소 서비스 구성 → 명령 실행 → JSON 출력.

mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use stowage_core::config_manager::ConfigManager;
use stowage_storage::StowageService;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::commands::Command;

/// Stowage 계층형 저장소 관리 도구
#[derive(Parser, Debug)]
#[command(name = "stowage")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 데이터 저장 경로 (기본: 설정값 또는 플랫폼 데이터 디렉토리)
    #[arg(long, short = 'd')]
    data_dir: Option<PathBuf>,

    /// 설정 파일 경로 (기본: 플랫폼 설정 디렉토리의 config.json)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_filter = format!(
        "stowage={},stowage_core={},stowage_storage={}",
        args.log_level, args.log_level, args.log_level
    );
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .init();

    let config_manager = match &args.config {
        Some(path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    }
    .context("설정 로드 실패")?;
    let config = config_manager.get();
    debug!("설정 파일: {}", config_manager.config_path().display());

    let data_dir = match args.data_dir.or_else(|| config.data_dir.clone()) {
        Some(dir) => dir,
        None => ConfigManager::data_dir().context("데이터 디렉토리 확인 실패")?,
    };

    let service = StowageService::open(config, &data_dir)
        .with_context(|| format!("저장소 열기 실패: {}", data_dir.display()))?;
    info!("저장소: {}", data_dir.display());

    let output = commands::run(&service, args.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
