//! 포트 인터페이스 (trait).
//!
//! 각 어댑터가 이 trait들을 구현하며,
//! 앱에서 `Arc<dyn T>`로 와이어링한다.
//!
//! async trait은 `async_trait` 매크로를 사용하여 object safety를 보장한다.

pub mod backend;
pub mod codec;
pub mod tier;
