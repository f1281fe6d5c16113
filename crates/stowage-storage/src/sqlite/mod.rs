//! SQLite 내구 계층 어댑터.
//!
//! `StorageTier` 포트 구현 (내구 계층).
//!
//! 연결은 첫 호출 시 지연 생성되고 인스턴스에 보관되어 재사용된다.
//! 동시에 들어온 첫 호출들은 하나의 열기 작업을 함께 기다린다.
//! 열기에 실패하면 그 호출자에게 에러를 돌려주고, 다음 호출에서 다시 시도한다.
//!
//! # 모듈 구조
//! - `records`: 레코드 저장/조회/삭제 (StorageTier 포트)
//! - `maintenance`: 사용량 통계, 오래된 임시 레코드 정리

mod maintenance;
mod records;

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use stowage_core::config::StowageConfig;
use stowage_core::error::StorageError;
use stowage_core::ports::codec::PayloadCodec;
use tokio::sync::OnceCell;
use tracing::{error, info};

use crate::compression::GzipCodec;
use crate::eviction::TransientKeyPolicy;
use crate::migration;

pub use records::decode_legacy_byte_list;

/// DB 위치
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    /// 파일 기반
    File(PathBuf),
    /// 인메모리 (테스트용, 프로세스 종료 시 소멸)
    Memory,
}

/// 연결 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Uninitialized,
    Opening,
    Ready,
    /// 마지막 열기 시도 실패 (다음 호출에서 재시도)
    Failed,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Opening,
            2 => Self::Ready,
            3 => Self::Failed,
            _ => Self::Uninitialized,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            Self::Uninitialized => 0,
            Self::Opening => 1,
            Self::Ready => 2,
            Self::Failed => 3,
        }
    }
}

/// 레코드 저장소 옵션
#[derive(Clone)]
pub struct RecordStoreOptions {
    /// 압축 코덱
    pub codec: Arc<dyn PayloadCodec>,
    /// 이 크기(bytes)를 초과하는 페이로드만 압축 시도
    pub compression_threshold_bytes: u64,
    /// 통계에 보고할 전체 용량
    pub reported_capacity_bytes: u64,
    /// 정리(cleanup) 대상 키 정책
    pub cleanup_policy: TransientKeyPolicy,
}

impl RecordStoreOptions {
    /// 설정에서 옵션 생성
    pub fn from_config(config: &StowageConfig, codec: Arc<dyn PayloadCodec>) -> Self {
        Self {
            codec,
            compression_threshold_bytes: config.compression.threshold_bytes,
            reported_capacity_bytes: config.durable.reported_capacity_bytes,
            cleanup_policy: TransientKeyPolicy::from_config(&config.cleanup),
        }
    }
}

impl Default for RecordStoreOptions {
    fn default() -> Self {
        Self::from_config(&StowageConfig::default_config(), Arc::new(GzipCodec::new()))
    }
}

/// SQLite 레코드 저장소: `StorageTier` 포트 구현
pub struct SqliteRecordStore {
    location: DbLocation,
    conn: OnceCell<Mutex<Connection>>,
    state: AtomicU8,
    open_attempts: AtomicU32,
    codec: Arc<dyn PayloadCodec>,
    compression_threshold_bytes: u64,
    reported_capacity_bytes: u64,
    cleanup_policy: TransientKeyPolicy,
}

impl SqliteRecordStore {
    /// 저장소 생성 (연결은 첫 호출 시 열린다)
    pub fn new(location: DbLocation, options: RecordStoreOptions) -> Self {
        Self {
            location,
            conn: OnceCell::new(),
            state: AtomicU8::new(ConnectionState::Uninitialized.as_u8()),
            open_attempts: AtomicU32::new(0),
            codec: options.codec,
            compression_threshold_bytes: options.compression_threshold_bytes,
            reported_capacity_bytes: options.reported_capacity_bytes,
            cleanup_policy: options.cleanup_policy,
        }
    }

    /// 파일 기반 저장소
    pub fn open(path: impl Into<PathBuf>, options: RecordStoreOptions) -> Self {
        Self::new(DbLocation::File(path.into()), options)
    }

    /// 인메모리 저장소 (테스트용)
    pub fn in_memory(options: RecordStoreOptions) -> Self {
        Self::new(DbLocation::Memory, options)
    }

    /// 현재 연결 상태
    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// 물리적으로 DB 열기를 시도한 횟수
    pub fn open_attempts(&self) -> u32 {
        self.open_attempts.load(Ordering::SeqCst)
    }

    /// DB 위치
    pub fn location(&self) -> &DbLocation {
        &self.location
    }

    /// 준비된 연결 반환 (필요 시 열기)
    async fn connection(&self) -> Result<&Mutex<Connection>, StorageError> {
        self.conn
            .get_or_try_init(|| async {
                self.state
                    .store(ConnectionState::Opening.as_u8(), Ordering::SeqCst);
                self.open_attempts.fetch_add(1, Ordering::SeqCst);

                let location = self.location.clone();
                let opened = tokio::task::spawn_blocking(move || open_connection(&location))
                    .await
                    .map_err(|e| StorageError::TransactionFailed(format!("DB 열기 태스크 실패: {e}")))
                    .and_then(|result| result);

                match opened {
                    Ok(conn) => {
                        self.state
                            .store(ConnectionState::Ready.as_u8(), Ordering::SeqCst);
                        Ok(Mutex::new(conn))
                    }
                    Err(e) => {
                        self.state
                            .store(ConnectionState::Failed.as_u8(), Ordering::SeqCst);
                        error!("내구 저장소 열기 실패: {e}");
                        Err(e)
                    }
                }
            })
            .await
    }
}

/// 연결 잠금
fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, StorageError> {
    conn.lock()
        .map_err(|e| StorageError::TransactionFailed(format!("잠금 획득 실패: {e}")))
}

/// rusqlite 에러를 트랜잭션 실패로 변환
fn tx_error(context: &str) -> impl Fn(rusqlite::Error) -> StorageError + '_ {
    move |e| StorageError::TransactionFailed(format!("{context}: {e}"))
}

/// 현재 시각 (Unix epoch 밀리초)
fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn open_connection(location: &DbLocation) -> Result<Connection, StorageError> {
    let conn = match location {
        DbLocation::File(path) => open_file(path)?,
        DbLocation::Memory => Connection::open_in_memory()
            .map_err(tx_error("인메모리 SQLite 생성 실패"))?,
    };

    migration::run_migrations(&conn).map_err(tx_error("마이그레이션 실패"))?;

    match location {
        DbLocation::File(path) => info!("내구 저장소 초기화: {}", path.display()),
        DbLocation::Memory => info!("내구 저장소 초기화: 인메모리"),
    }
    Ok(conn)
}

fn open_file(path: &Path) -> Result<Connection, StorageError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::TransactionFailed(format!(
                    "DB 디렉토리 생성 실패: {}: {e}",
                    parent.display()
                ))
            })?;
        }
    }

    let conn = Connection::open(path).map_err(tx_error("SQLite 열기 실패"))?;

    conn.execute_batch(
        "
        PRAGMA journal_mode=WAL;
        PRAGMA synchronous=NORMAL;
        PRAGMA temp_store=MEMORY;
        ",
    )
    .map_err(tx_error("PRAGMA 설정 실패"))?;

    Ok(conn)
}
