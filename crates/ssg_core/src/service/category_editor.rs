//! In-memory collection editing.
//!
//! # Responsibility
//! - Find, create and change membership of collections without storage access.
//!
//! # Invariants
//! - Names are unique among categories carrying data; creation never duplicates.
//! - Membership edits restore tombstoned categories.
//! - `added` never gains a duplicate id through `add_games_for_category`.

use crate::model::category::{Category, CategoryData, GameId};
use crate::model::shortcut::ShortcutTarget;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    DuplicateCategory(String),
}

impl Display for EditorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateCategory(name) => {
                write!(f, "a category named `{name}` already exists")
            }
        }
    }
}

impl Error for EditorError {}

/// Mutable working set of categories.
#[derive(Debug, Clone, Default)]
pub struct CategoryEditor {
    categories: Vec<Category>,
}

impl CategoryEditor {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    /// First category whose data carries `name`.
    pub fn find_category_by_name(&self, name: &str) -> Option<&Category> {
        self.position_by_name(name)
            .map(|index| &self.categories[index])
    }

    /// Creates and appends a fresh category.
    ///
    /// # Errors
    /// - `DuplicateCategory` when `name` is taken; the working set is unchanged.
    pub fn create_category(
        &mut self,
        name: &str,
        game_ids: &[GameId],
    ) -> Result<&Category, EditorError> {
        if self.position_by_name(name).is_some() {
            return Err(EditorError::DuplicateCategory(name.to_string()));
        }
        Ok(self.push_new(name, game_ids))
    }

    /// Adds games to a category, creating it when missing.
    pub fn add_games_for_category(&mut self, name: &str, game_ids: &[GameId]) -> &Category {
        let Some(index) = self.position_by_name(name) else {
            return self.push_new(name, game_ids);
        };

        let category = &mut self.categories[index];
        category.restore();
        if !game_ids.is_empty() {
            let added = category
                .data
                .get_or_insert_with(|| CategoryData::for_name(name))
                .added
                .get_or_insert_with(Vec::new);
            for game_id in game_ids {
                if !added.contains(game_id) {
                    added.push(*game_id);
                }
            }
        }
        category
    }

    /// Replaces the games of a category, creating it when missing.
    pub fn set_games_for_category(&mut self, name: &str, game_ids: &[GameId]) -> &Category {
        let Some(index) = self.position_by_name(name) else {
            return self.push_new(name, game_ids);
        };

        let category = &mut self.categories[index];
        category.restore();
        category
            .data
            .get_or_insert_with(|| CategoryData::for_name(name))
            .added = Some(game_ids.to_vec());
        category
    }

    /// Adds a shortcut's app id to every category it names.
    pub fn add_shortcut(&mut self, shortcut: &impl ShortcutTarget) {
        let app_id = shortcut.app_id();
        for name in shortcut.category_names() {
            self.add_games_for_category(name, &[app_id]);
        }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn into_categories(self) -> Vec<Category> {
        self.categories
    }

    fn position_by_name(&self, name: &str) -> Option<usize> {
        self.categories
            .iter()
            .position(|category| category.name() == Some(name))
    }

    fn push_new(&mut self, name: &str, game_ids: &[GameId]) -> &Category {
        let mut category = Category::new(name);
        if let Some(data) = category.data.as_mut() {
            data.added = (!game_ids.is_empty()).then(|| game_ids.to_vec());
        }
        self.categories.push(category);
        &self.categories[self.categories.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::{CategoryEditor, EditorError};
    use crate::model::category::Category;

    #[test]
    fn create_rejects_duplicate_without_partial_insert() {
        let mut editor = CategoryEditor::default();
        editor.create_category("X", &[]).unwrap();

        let err = editor.create_category("X", &[5]).unwrap_err();
        assert_eq!(err, EditorError::DuplicateCategory("X".to_string()));
        assert_eq!(editor.categories().len(), 1);
        assert!(editor.categories()[0].data.as_ref().unwrap().added.is_none());
    }

    #[test]
    fn find_skips_categories_without_data() {
        let mut bare = Category::new("Hidden");
        bare.data = None;
        let editor = CategoryEditor::new(vec![bare, Category::new("Hidden")]);
        let found = editor.find_category_by_name("Hidden").unwrap();
        assert!(found.data.is_some());
    }

    #[test]
    fn add_games_creates_named_category_when_only_dataless_match_exists() {
        let mut bare = Category::new("Racing");
        bare.data = None;
        let mut editor = CategoryEditor::new(vec![bare]);

        let category = editor.add_games_for_category("Racing", &[7]).clone();
        assert_eq!(category.added(), &[7]);
        assert_eq!(editor.categories().len(), 2);
        assert_eq!(category.data.unwrap().id, "ssg-Racing");
    }
}
