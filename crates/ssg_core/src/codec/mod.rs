//! Wire and payload codecs.
//!
//! # Responsibility
//! - `entry_value`: tagged byte format of every database value.
//! - `category`: JSON payload carried by collection entries.

pub mod category;
pub mod entry_value;
