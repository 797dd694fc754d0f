//! Collection read/write use-cases.
//!
//! # Responsibility
//! - Project collection entries of every namespace into `Category` values.
//! - Write `Category` values back as merged entries.
//!
//! # Invariants
//! - Only entries whose key starts with `user-collections.` are collections.
//! - Categories without a namespace land in the most recent namespace; this
//!   layer never creates namespaces.
//! - Writes merge; entries not passed in are left untouched.
//! - Tombstoned collections are returned like any other.
//! - A falsy entry value (`null`, `false`, `0`, `""`) means the collection has no data.

use crate::codec::category::{
    decode_category_data, decode_category_value, encode_category_data, is_truthy,
    MalformedCategoryError, STEAM_COLLECTION_PREFIX,
};
use crate::codec::entry_value::EncodeError;
use crate::model::category::{Category, CategoryData};
use crate::model::entry::{create_timestamp, Entry};
use crate::repo::entry_repo::EntryRepository;
use crate::repo::RepoError;
use log::info;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Service error for collection use-cases.
#[derive(Debug)]
pub enum CategoryServiceError {
    Repo(RepoError),
    MalformedCategory {
        entry_key: String,
        source: MalformedCategoryError,
    },
    Encode(EncodeError),
}

impl Display for CategoryServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::MalformedCategory { entry_key, source } => {
                write!(f, "collection entry `{entry_key}` is malformed: {source}")
            }
            Self::Encode(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CategoryServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::MalformedCategory { source, .. } => Some(source),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<RepoError> for CategoryServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<EncodeError> for CategoryServiceError {
    fn from(value: EncodeError) -> Self {
        Self::Encode(value)
    }
}

pub type CategoryResult<T> = Result<T, CategoryServiceError>;

/// Collection service facade over entry repository implementations.
pub struct CategoryService<R: EntryRepository> {
    repo: R,
}

impl<R: EntryRepository> CategoryService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Returns every collection of every namespace, in namespace then entry order.
    ///
    /// # Errors
    /// - `MalformedCategory` when a collection value lacks `id` or `name`.
    /// - `Repo` for namespace, storage and wire decode failures.
    pub fn get_categories(&self) -> CategoryResult<Vec<Category>> {
        let started_at = Instant::now();
        let categories = self
            .repo
            .get_entries()?
            .into_iter()
            .filter(|entry| entry.key.starts_with(STEAM_COLLECTION_PREFIX))
            .map(entry_to_category)
            .collect::<CategoryResult<Vec<_>>>()?;

        info!(
            "event=categories_read module=service status=ok count={} duration_ms={}",
            categories.len(),
            started_at.elapsed().as_millis()
        );
        Ok(categories)
    }

    /// Writes the given collections, merging them into their namespaces.
    ///
    /// # Contract
    /// - `namespace_key` falls back to the most recent namespace.
    /// - `timestamp` falls back to now; `version` and `is_deleted` pass through.
    /// - A failure in one namespace does not undo writes to the others.
    pub fn set_categories(&self, categories: &[Category]) -> CategoryResult<()> {
        let started_at = Instant::now();
        let default_namespace = self.repo.get_last_namespace_key()?;

        let entries = categories
            .iter()
            .map(|category| category_to_entry(category, &default_namespace))
            .collect::<CategoryResult<Vec<_>>>()?;
        self.repo.update_entries(&entries)?;

        info!(
            "event=categories_write module=service status=ok count={} duration_ms={}",
            entries.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }
}

fn entry_to_category(entry: Entry) -> CategoryResult<Category> {
    let data = match entry.value {
        Some(value) if !is_truthy(&value) => None,
        None => None,
        Some(Value::String(text)) => Some(decode_category_data(&text)),
        Some(document) => Some(decode_category_value(document)),
    }
    .transpose()
    .map_err(|source| CategoryServiceError::MalformedCategory {
        entry_key: entry.key.clone(),
        source,
    })?;

    Ok(Category {
        namespace_key: Some(entry.namespace_key),
        entry_key: entry.key,
        is_deleted: entry.is_deleted,
        version: entry.version,
        timestamp: None,
        data,
    })
}

fn category_to_entry(category: &Category, default_namespace: &str) -> CategoryResult<Entry> {
    let value = category
        .data
        .as_ref()
        .map(encode_data)
        .transpose()?;

    Ok(Entry {
        namespace_key: category
            .namespace_key
            .clone()
            .unwrap_or_else(|| default_namespace.to_string()),
        key: category.entry_key.clone(),
        value,
        version: category.version.clone(),
        timestamp: category
            .timestamp
            .filter(|timestamp| *timestamp != 0)
            .unwrap_or_else(create_timestamp),
        is_deleted: category.is_deleted,
    })
}

fn encode_data(data: &CategoryData) -> CategoryResult<Value> {
    Ok(Value::String(encode_category_data(data)?))
}
