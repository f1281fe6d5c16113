//! 도메인 모델.
//!
//! - [`record`]: 내구 계층 레코드
//! - [`quota`]: 쿼터 추정/스냅샷, 회수 결과
//! - [`tier`]: 계층 종류와 쓰기 결과

pub mod quota;
pub mod record;
pub mod tier;
