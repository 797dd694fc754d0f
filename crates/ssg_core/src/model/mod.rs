//! Domain model for database entries and the collections stored in them.
//!
//! # Responsibility
//! - Define entry, collection and shortcut shapes used by repos and services.
//!
//! # Invariants
//! - Deletion is represented by soft-delete tombstones, not hard delete.
//! - Tombstones remain visible to readers; consumers decide what to show.

pub mod category;
pub mod entry;
pub mod shortcut;
