//! Base64 codec for transport payloads
//!
//! Backup repositories return file content base64-encoded inside a JSON
//! envelope, wrapped at fixed width with literal newlines.

use base64::{engine::general_purpose, Engine as _};
use thiserror::Error;

/// Codec errors
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid base64 input: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),

    #[error("decoded payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Encode UTF-8 text as standard padded base64
pub fn encode(text: &str) -> String {
    general_purpose::STANDARD.encode(text.as_bytes())
}

/// Decode standard base64 into UTF-8 text
pub fn decode(encoded: &str) -> Result<String, CodecError> {
    let bytes = general_purpose::STANDARD.decode(encoded)?;
    Ok(String::from_utf8(bytes)?)
}

/// Decode line-wrapped base64 (newlines stripped first)
pub fn decode_wrapped(content: &str) -> Result<String, CodecError> {
    let joined: String = content
        .chars()
        .filter(|c| *c != '\n' && *c != '\r')
        .collect();
    decode(joined.trim())
}
