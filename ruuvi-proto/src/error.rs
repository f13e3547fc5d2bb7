use crate::models::DataFormat;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("truncated {format:?} payload: need at least {expected} bytes, got {actual}")]
    TruncatedPayload {
        format: DataFormat,
        expected: usize,
        actual: usize,
    },

    #[error("unsupported data format 0x{0:02X}")]
    UnsupportedFormat(u8),

    #[error("no Ruuvi manufacturer payload in frame")]
    NoRuuviPayload,
}
