//! Shortcut identity as seen by collection membership.
//!
//! # Responsibility
//! - Define the `ShortcutTarget` seam: anything that resolves to an app id
//!   and names the collections it belongs to.
//! - Derive app ids for non-Steam shortcuts the way the client does.
//!
//! # Invariants
//! - App ids depend only on `exec_bin` followed by `name`.
//! - The high bit of the 32-bit app id is always set.

use crate::model::category::GameId;

const SHORTCUT_ID_FLAG: u32 = 0x8000_0000;
const LEGACY_ID_LOW_BITS: u64 = 0x0200_0000;

/// Something that can be placed into collections by app id.
pub trait ShortcutTarget {
    /// App id used in collection membership lists.
    fn app_id(&self) -> GameId;
    /// Display names of the collections this target belongs to.
    fn category_names(&self) -> &[String];
}

/// Validated non-Steam shortcut record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortcut {
    /// Label shown in the library.
    pub name: String,
    /// Executable launched for this shortcut.
    pub exec_bin: String,
    pub categories: Vec<String>,
}

impl Shortcut {
    pub fn new(name: impl Into<String>, exec_bin: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exec_bin: exec_bin.into(),
            categories: Vec::new(),
        }
    }

    pub fn with_categories(mut self, categories: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// 32-bit app id used by the desktop library and artwork file names.
    pub fn short_app_id(&self) -> u32 {
        let key = format!("{}{}", self.exec_bin, self.name);
        crc32fast::hash(key.as_bytes()) | SHORTCUT_ID_FLAG
    }

    /// 64-bit game id used by launch URLs and Big Picture artwork.
    pub fn legacy_app_id(&self) -> u64 {
        (u64::from(self.short_app_id()) << 32) | LEGACY_ID_LOW_BITS
    }

    pub fn launch_url(&self) -> String {
        format!("steam://rungameid/{}", self.legacy_app_id())
    }
}

impl ShortcutTarget for Shortcut {
    fn app_id(&self) -> GameId {
        GameId::from(self.short_app_id())
    }

    fn category_names(&self) -> &[String] {
        &self.categories
    }
}
