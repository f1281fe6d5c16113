//! Stowage 저장소 에러 타입.
//!
//! 모든 계층은 이 에러를 반환하고, 공개 경계(`HybridStorage`)에서
//! 값/`Option`/`bool`로 정규화된다.

use thiserror::Error;

/// 저장소 에러.
/// 닫힌 집합: 호출자는 [`StorageError::kind`]로 분기한다.
#[derive(Debug, Error)]
pub enum StorageError {
    /// 빠른 계층 용량 초과 (사전 추정 또는 백엔드 거부)
    #[error("저장 공간 부족: {summary} (회수 {freed_bytes}bytes)")]
    QuotaExceeded {
        /// 사람이 읽을 수 있는 사용량 요약
        summary: String,
        /// 자동 회수로 확보한 바이트 수 (0일 수 있음)
        freed_bytes: u64,
    },

    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// 압축 기능 사용 불가 (비활성화 등)
    #[error("압축 사용 불가: {0}")]
    CompressionUnavailable(String),

    /// 압축/해제 중 실패 (손상된 입력 등)
    #[error("압축 에러: {0}")]
    Compression(String),

    /// 내구 계층 연결/트랜잭션 실패
    #[error("트랜잭션 실패: {0}")]
    TransactionFailed(String),

    /// 키 미발견
    #[error("키 미발견: {key}")]
    NotFound {
        /// 조회한 키
        key: String,
    },

    /// 빠른 계층 백엔드 접근 실패 (저장소 비활성화 등)
    #[error("백엔드 에러: {0}")]
    Backend(String),

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),
}

/// 에러 종류 (테스트/분기용, 메시지 비교 대신 사용)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorKind {
    QuotaExceeded,
    Serialization,
    CompressionUnavailable,
    Compression,
    TransactionFailed,
    NotFound,
    Backend,
    Config,
    Io,
}

impl StorageError {
    /// 에러 종류 반환
    pub fn kind(&self) -> StorageErrorKind {
        match self {
            Self::QuotaExceeded { .. } => StorageErrorKind::QuotaExceeded,
            Self::Serialization(_) => StorageErrorKind::Serialization,
            Self::CompressionUnavailable(_) => StorageErrorKind::CompressionUnavailable,
            Self::Compression(_) => StorageErrorKind::Compression,
            Self::TransactionFailed(_) => StorageErrorKind::TransactionFailed,
            Self::NotFound { .. } => StorageErrorKind::NotFound,
            Self::Backend(_) => StorageErrorKind::Backend,
            Self::Config(_) => StorageErrorKind::Config,
            Self::Io(_) => StorageErrorKind::Io,
        }
    }

    /// 용량 초과 에러인지
    pub fn is_quota_exceeded(&self) -> bool {
        self.kind() == StorageErrorKind::QuotaExceeded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        let err = StorageError::QuotaExceeded {
            summary: "4.0MB / 4.0MB".to_string(),
            freed_bytes: 0,
        };
        assert_eq!(err.kind(), StorageErrorKind::QuotaExceeded);
        assert!(err.is_quota_exceeded());

        let err = StorageError::NotFound {
            key: "brand_kit".to_string(),
        };
        assert_eq!(err.kind(), StorageErrorKind::NotFound);
        assert!(!err.is_quota_exceeded());
    }

    #[test]
    fn serde_error_converts() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: StorageError = parse.unwrap_err().into();
        assert_eq!(err.kind(), StorageErrorKind::Serialization);
    }

    #[test]
    fn quota_message_includes_freed_bytes() {
        let err = StorageError::QuotaExceeded {
            summary: "3.9MB / 4.0MB (97.5%)".to_string(),
            freed_bytes: 2048,
        };
        assert!(err.to_string().contains("2048"));
    }
}
