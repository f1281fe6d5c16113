//! # stowage-storage
//!
//! 계층형 저장소 어댑터.
//! 작은 페이로드는 동기 키-값 계층에, 큰 페이로드는 SQLite 내구 계층에
//! 저장하고 하나의 get/set/remove 인터페이스로 묶는다.
//!
//! ## 모듈
//! - `quota`: 빠른 계층 쿼터 추정
//! - `eviction`: 임시 데이터 키 판별 (공간 회수/정리 대상)
//! - `local`: 빠른 계층 (`LocalStore`) 및 메모리/파일 백엔드
//! - `compression`: gzip 페이로드 코덱
//! - `sqlite`: 내구 계층 (`SqliteRecordStore`)
//! - `migration`: 내구 계층 스키마 마이그레이션
//! - `hybrid`: 크기 기반 분배 파사드 (`HybridStorage`)
//! - `service`: 앱 시작 시 한 번 구성하는 저장소 서비스

pub mod compression;
pub mod eviction;
pub mod hybrid;
pub mod local;
pub mod migration;
pub mod quota;
pub mod service;
pub mod sqlite;

pub use hybrid::HybridStorage;
pub use service::StowageService;
