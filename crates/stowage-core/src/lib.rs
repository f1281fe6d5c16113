//! # stowage-core
//!
//! Stowage 도메인 모델, 포트(trait) 정의, 에러 타입.
//! 저장소 어댑터와 앱 크레이트가 공유하는 핵심 타입과 인터페이스를 제공한다.
//!
//! ## 구조
//!
//! - [`models`]: 레코드, 쿼터 스냅샷, 쓰기 결과 (serde Serialize/Deserialize)
//! - [`ports`]: 계층 포트 인터페이스 (async_trait)
//! - [`error`]: 저장소 에러 타입 (thiserror)
//! - [`config`]: 저장소 설정 구조체
//! - [`config_manager`]: 설정 파일 관리 (로드/저장)
//! - [`compact`]: 저장 전 JSON 문자열 정리

pub mod compact;
pub mod config;
pub mod config_manager;
pub mod error;
pub mod models;
pub mod ports;
