//! Multi-type selection held as tagged ids.
//!
//! The selection never owns or validates what it points at; lookups on a
//! deleted entity simply come back empty.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which store a selected id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectableKind {
    Node,
    Segment,
    Door,
    Window,
    Image,
    Text,
}

/// A reference to one selected entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectionItem {
    pub id: Uuid,
    pub kind: SelectableKind,
}

impl SelectionItem {
    pub fn new(id: Uuid, kind: SelectableKind) -> Self {
        Self { id, kind }
    }
}

/// Ordered set of selected items.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    items: Vec<SelectionItem>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection with a single item.
    pub fn select(&mut self, item: SelectionItem) {
        self.items.clear();
        self.items.push(item);
    }

    /// Append an item unless its id is already selected.
    pub fn add_to_selection(&mut self, item: SelectionItem) {
        if !self.is_selected(item.id) {
            self.items.push(item);
        }
    }

    /// Remove an item by id, if present.
    pub fn deselect(&mut self, id: Uuid) {
        self.items.retain(|item| item.id != id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Keep only the items matching `keep`, e.g. those that still exist.
    pub fn retain(&mut self, keep: impl FnMut(&SelectionItem) -> bool) {
        self.items.retain(keep);
    }

    pub fn is_selected(&self, id: Uuid) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    /// Ids of selected items of one kind, in selection order.
    pub fn selected_by_kind(&self, kind: SelectableKind) -> Vec<Uuid> {
        self.items
            .iter()
            .filter(|item| item.kind == kind)
            .map(|item| item.id)
            .collect()
    }

    pub fn items(&self) -> &[SelectionItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Take all items, leaving the selection empty.
    pub fn take(&mut self) -> Vec<SelectionItem> {
        std::mem::take(&mut self.items)
    }
}
