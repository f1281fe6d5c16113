//! 페이로드 압축 포트.
//!
//! 구현: `stowage-storage::compression` (flate2 gzip)

use crate::error::StorageError;

/// 텍스트 페이로드 압축/해제 인터페이스
pub trait PayloadCodec: Send + Sync {
    /// 코덱 이름 (로그용)
    fn name(&self) -> &'static str;

    /// UTF-8 텍스트 압축
    fn compress(&self, text: &str) -> Result<Vec<u8>, StorageError>;

    /// 압축 해제 후 UTF-8 텍스트 복원
    fn decompress(&self, data: &[u8]) -> Result<String, StorageError>;
}
