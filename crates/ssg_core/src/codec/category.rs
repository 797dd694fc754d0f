//! Collection payload codec and collection key derivation.
//!
//! # Responsibility
//! - Decode/encode the JSON payload stored in collection entries.
//! - Derive collection ids and entry keys from display names.
//!
//! # Invariants
//! - Decoded payloads always carry a non-empty `id` and `name`.
//! - Ids are `ssg-` + name with every whitespace run replaced by `-`.
//! - Encode performs no validation.

use crate::codec::entry_value::EncodeError;
use crate::model::category::CategoryData;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Key prefix identifying collection entries among all database entries.
pub const STEAM_COLLECTION_PREFIX: &str = "user-collections.";

/// Prefix applied to ids of collections created by this crate.
pub const COLLECTION_ID_PREFIX: &str = "ssg-";

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Collection payload missing required data or not shaped like a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedCategoryError {
    InvalidJson(String),
    NotAnObject,
    MissingField(&'static str),
    Schema(String),
}

impl Display for MalformedCategoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidJson(message) => write!(f, "collection payload is not JSON: {message}"),
            Self::NotAnObject => write!(f, "collection payload is not a JSON object"),
            Self::MissingField(field) => {
                write!(f, "collection payload is missing `{field}`")
            }
            Self::Schema(message) => write!(f, "collection payload has unexpected shape: {message}"),
        }
    }
}

impl Error for MalformedCategoryError {}

/// Decodes collection JSON text.
///
/// # Errors
/// - `MissingField` when `id` or `name` is absent, null, empty or false.
/// - `InvalidJson` / `NotAnObject` / `Schema` for anything not shaped like a collection.
pub fn decode_category_data(text: &str) -> Result<CategoryData, MalformedCategoryError> {
    let document: Value = serde_json::from_str(text)
        .map_err(|err| MalformedCategoryError::InvalidJson(err.to_string()))?;
    decode_category_value(document)
}

/// Decodes a collection payload that is already a JSON document.
pub fn decode_category_value(document: Value) -> Result<CategoryData, MalformedCategoryError> {
    let object = document
        .as_object()
        .ok_or(MalformedCategoryError::NotAnObject)?;
    for field in ["id", "name"] {
        if !object.get(field).is_some_and(is_truthy) {
            return Err(MalformedCategoryError::MissingField(field));
        }
    }

    serde_json::from_value(document)
        .map_err(|err| MalformedCategoryError::Schema(err.to_string()))
}

/// Serializes collection data to JSON text.
pub fn encode_category_data(data: &CategoryData) -> Result<String, EncodeError> {
    serde_json::to_string(data).map_err(|err| EncodeError(err.to_string()))
}

/// Returns the collection id for a display name, e.g. `My Games` -> `ssg-My-Games`.
pub fn create_collection_id(name: &str) -> String {
    format!("{COLLECTION_ID_PREFIX}{}", WHITESPACE_RE.replace_all(name, "-"))
}

/// Returns the collection entry key for a display name.
pub fn create_collection_key(name: &str) -> String {
    format!("{STEAM_COLLECTION_PREFIX}{}", create_collection_id(name))
}

/// Truthiness as the client's scripts see it.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
