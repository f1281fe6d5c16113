//! 페이로드 압축 어댑터.
//!
//! `PayloadCodec` 포트 구현. gzip(flate2) 스트림을 고정 크기 청크로 끝까지 읽어
//! 하나의 버퍼로 이어 붙인다. 중간에 멈추면 데이터가 잘리므로 EOF까지 반드시 읽는다.

use flate2::read::{GzDecoder, GzEncoder};
use flate2::Compression;
use std::io::{self, Read};
use stowage_core::error::StorageError;
use stowage_core::ports::codec::PayloadCodec;
use tracing::{debug, warn};

/// 스트림 읽기 청크 크기
const CHUNK_SIZE: usize = 16 * 1024;

/// 리더를 EOF까지 청크 단위로 읽어 순서대로 이어 붙인다
pub(crate) fn drain<R: Read>(mut reader: R) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut chunk = vec![0u8; CHUNK_SIZE];
    loop {
        match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => out.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(out)
}

/// gzip 코덱
#[derive(Debug, Clone, Copy)]
pub struct GzipCodec {
    level: Compression,
}

impl GzipCodec {
    /// 기본 압축 레벨
    pub fn new() -> Self {
        Self {
            level: Compression::default(),
        }
    }

    /// 압축 레벨 지정 (0~9)
    pub fn with_level(level: u32) -> Self {
        Self {
            level: Compression::new(level.min(9)),
        }
    }
}

impl Default for GzipCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl PayloadCodec for GzipCodec {
    fn name(&self) -> &'static str {
        "gzip"
    }

    fn compress(&self, text: &str) -> Result<Vec<u8>, StorageError> {
        let encoder = GzEncoder::new(text.as_bytes(), self.level);
        drain(encoder).map_err(|e| StorageError::Compression(format!("gzip 압축 실패: {e}")))
    }

    fn decompress(&self, data: &[u8]) -> Result<String, StorageError> {
        let decoder = GzDecoder::new(data);
        let bytes =
            drain(decoder).map_err(|e| StorageError::Compression(format!("gzip 해제 실패: {e}")))?;
        String::from_utf8(bytes)
            .map_err(|e| StorageError::Compression(format!("해제 결과가 UTF-8이 아님: {e}")))
    }
}

/// 압축 기능이 없는 환경: 항상 `CompressionUnavailable`
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledCodec;

impl PayloadCodec for DisabledCodec {
    fn name(&self) -> &'static str {
        "disabled"
    }

    fn compress(&self, _text: &str) -> Result<Vec<u8>, StorageError> {
        Err(StorageError::CompressionUnavailable(
            "압축이 비활성화되어 있습니다".to_string(),
        ))
    }

    fn decompress(&self, _data: &[u8]) -> Result<String, StorageError> {
        Err(StorageError::CompressionUnavailable(
            "압축이 비활성화되어 있습니다".to_string(),
        ))
    }
}

/// 압축 시도. 실패하면 None (원문 저장으로 대체)
pub fn try_compress(codec: &dyn PayloadCodec, text: &str) -> Option<Vec<u8>> {
    match codec.compress(text) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            debug!("압축 건너뜀 ({}): {e}", codec.name());
            None
        }
    }
}

/// 해제 시도. 실패하면 None (원문 재해석으로 대체)
pub fn try_decompress(codec: &dyn PayloadCodec, data: &[u8]) -> Option<String> {
    match codec.decompress(data) {
        Ok(text) => Some(text),
        Err(e) => {
            warn!("압축 해제 실패 ({}): {e}", codec.name());
            None
        }
    }
}
