//! 저장 계층 종류와 쓰기 결과.

use serde::{Deserialize, Serialize};

/// 저장 계층
///
/// 직렬화 이름은 기존 클라이언트가 보고하던 `method` 값과 같다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TierKind {
    /// 빠른 동기 키-값 계층 (용량 제한)
    #[serde(rename = "localStorage")]
    Local,
    /// 내구 트랜잭션 계층 (대용량)
    #[serde(rename = "indexedDB")]
    Durable,
}

impl TierKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "localStorage",
            Self::Durable => "indexedDB",
        }
    }
}

impl std::fmt::Display for TierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 단일 계층 쓰기 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteReceipt {
    /// 데이터를 보관한 계층
    pub tier: TierKind,
    /// 압축 적용 여부
    pub compressed: bool,
    /// 쓰기 과정에서 회수한 바이트 수
    pub freed_bytes: u64,
}

impl WriteReceipt {
    pub fn local(freed_bytes: u64) -> Self {
        Self {
            tier: TierKind::Local,
            compressed: false,
            freed_bytes,
        }
    }

    pub fn durable(compressed: bool) -> Self {
        Self {
            tier: TierKind::Durable,
            compressed,
            freed_bytes: 0,
        }
    }
}

/// `HybridStorage::set_item` 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetOutcome {
    /// 최종적으로 데이터를 보관한 계층
    pub method: TierKind,
    /// 압축 적용 여부
    pub compressed: bool,
    /// 빠른 계층이 실패해 내구 계층으로 대체되었는지
    pub fell_back: bool,
}
