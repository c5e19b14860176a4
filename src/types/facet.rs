use serde::{Deserialize, Serialize};

use super::{Field, UNREGISTERED};

/// User-facing search filter backed by exactly one catalog [`Field`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchFacet {
    pub id: i64,
    pub field: Field,
    pub label: String,
    pub show_on_search: bool,
    /// Lower values are displayed first
    pub search_display_priority: i32,
    pub can_multiselect: bool,
}

impl SearchFacet {
    pub fn new(field: Field, label: &str) -> Self {
        Self {
            id: UNREGISTERED,
            field,
            label: label.to_owned(),
            show_on_search: false,
            search_display_priority: 1,
            can_multiselect: true,
        }
    }

    pub fn with_show_on_search(mut self, show_on_search: bool) -> Self {
        self.show_on_search = show_on_search;
        self
    }

    pub fn with_display_priority(mut self, priority: i32) -> Self {
        self.search_display_priority = priority;
        self
    }

    pub fn with_multiselect(mut self, can_multiselect: bool) -> Self {
        self.can_multiselect = can_multiselect;
        self
    }

    pub fn is_registered(&self) -> bool {
        self.id != UNREGISTERED
    }
}
