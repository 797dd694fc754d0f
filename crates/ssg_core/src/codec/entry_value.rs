//! Wire codec for single database values.
//!
//! # Responsibility
//! - Encode JSON-serializable values into tagged database bytes.
//! - Decode tagged database bytes into typed values in two explicit steps:
//!   text -> JSON document, JSON document -> schema type.
//!
//! # Invariants
//! - The format tag is exactly one byte. Its hex rendering is `"00"`.
//! - Writes always use `EntryFormat::Utf16Le`.
//! - Decode never returns partially parsed data.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

const MAX_FRAGMENT_CHARS: usize = 64;

/// Body encoding selected by the leading tag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryFormat {
    /// Tag `0x00`: UTF-16LE text.
    Utf16Le,
    /// Tag `0x01`: Latin-1 text, used by the host client for ASCII-only data.
    Latin1,
}

impl EntryFormat {
    pub fn tag(self) -> u8 {
        match self {
            Self::Utf16Le => 0x00,
            Self::Latin1 => 0x01,
        }
    }

    pub fn from_tag(tag: u8) -> Result<Self, DecodeError> {
        match tag {
            0x00 => Ok(Self::Utf16Le),
            0x01 => Ok(Self::Latin1),
            other => Err(DecodeError::UnsupportedFormat(other)),
        }
    }
}

/// Malformed wire value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    EmptyValue,
    UnsupportedFormat(u8),
    InvalidHex(String),
    OddUtf16Length(usize),
    InvalidUtf16,
    MalformedJson { fragment: String, message: String },
    Schema { fragment: String, message: String },
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyValue => write!(f, "database value is empty"),
            Self::UnsupportedFormat(tag) => {
                write!(f, "unsupported database value format tag 0x{tag:02x}")
            }
            Self::InvalidHex(message) => write!(f, "invalid hex database value: {message}"),
            Self::OddUtf16Length(len) => {
                write!(f, "UTF-16 database value has odd byte length {len}")
            }
            Self::InvalidUtf16 => write!(f, "database value is not valid UTF-16"),
            Self::MalformedJson { fragment, message } => {
                write!(f, "malformed JSON `{fragment}`: {message}")
            }
            Self::Schema { fragment, message } => {
                write!(f, "unexpected value shape `{fragment}`: {message}")
            }
        }
    }
}

impl Error for DecodeError {}

/// Value could not be serialized to JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeError(pub String);

impl Display for EncodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to encode database value: {}", self.0)
    }
}

impl Error for EncodeError {}

/// Encodes `value` as `[tag][UTF-16LE JSON]` bytes.
pub fn encode_entry_value<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, EncodeError> {
    let text = serde_json::to_string(value).map_err(|err| EncodeError(err.to_string()))?;
    let mut bytes = Vec::with_capacity(1 + text.len() * 2);
    bytes.push(EntryFormat::Utf16Le.tag());
    bytes.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
    Ok(bytes)
}

/// Encodes `value` as the ASCII hex form of `encode_entry_value`, e.g. `"005b005d00"`.
pub fn encode_entry_value_hex<T: Serialize + ?Sized>(value: &T) -> Result<String, EncodeError> {
    encode_entry_value(value).map(hex::encode)
}

/// Decodes tagged database bytes into `T`.
///
/// # Errors
/// - `EmptyValue` / `UnsupportedFormat` for a missing or unknown tag byte.
/// - `OddUtf16Length` / `InvalidUtf16` for a broken UTF-16 body.
/// - `MalformedJson` when the body is not JSON.
/// - `Schema` when the JSON does not have the shape of `T`.
pub fn decode_entry_value<T: DeserializeOwned>(raw: &[u8]) -> Result<T, DecodeError> {
    let text = decode_text(raw)?;
    let document: Value = serde_json::from_str(&text).map_err(|err| DecodeError::MalformedJson {
        fragment: fragment(&text),
        message: err.to_string(),
    })?;
    serde_json::from_value(document).map_err(|err| DecodeError::Schema {
        fragment: fragment(&text),
        message: err.to_string(),
    })
}

/// Decodes the ASCII hex form produced by `encode_entry_value_hex`.
pub fn decode_entry_value_hex<T: DeserializeOwned>(raw: &str) -> Result<T, DecodeError> {
    let bytes = hex::decode(raw.trim()).map_err(|err| DecodeError::InvalidHex(err.to_string()))?;
    decode_entry_value(&bytes)
}

fn decode_text(raw: &[u8]) -> Result<String, DecodeError> {
    let (&tag, body) = raw.split_first().ok_or(DecodeError::EmptyValue)?;
    match EntryFormat::from_tag(tag)? {
        EntryFormat::Utf16Le => {
            if body.len() % 2 != 0 {
                return Err(DecodeError::OddUtf16Length(body.len()));
            }
            let units: Vec<u16> = body
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16(&units).map_err(|_| DecodeError::InvalidUtf16)
        }
        EntryFormat::Latin1 => Ok(body.iter().map(|&byte| char::from(byte)).collect()),
    }
}

fn fragment(text: &str) -> String {
    let mut truncated = text.chars().take(MAX_FRAGMENT_CHARS).collect::<String>();
    if text.chars().count() > MAX_FRAGMENT_CHARS {
        truncated.push_str("...");
    }
    truncated
}
