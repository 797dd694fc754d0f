//! Core use-case services.
//!
//! # Responsibility
//! - `category_service`: move collections between storage and domain values.
//! - `category_editor`: change collections in memory, storage-free.
//!
//! # Invariants
//! - Services never bypass repository read/merge contracts.

pub mod category_editor;
pub mod category_service;
