use std::collections::BTreeSet;

use uuid::Uuid;

/// Checked rows of a list view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<Uuid>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip one row. Returns whether it is now selected.
    pub fn toggle(&mut self, id: Uuid) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn select(&mut self, id: Uuid) {
        self.ids.insert(id);
    }

    pub fn deselect(&mut self, id: Uuid) {
        self.ids.remove(&id);
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> Vec<Uuid> {
        self.ids.iter().copied().collect()
    }

    /// Header checkbox fully checked.
    pub fn is_all_selected(&self, total: usize) -> bool {
        total > 0 && self.ids.len() == total
    }

    /// Header checkbox indeterminate.
    pub fn is_partial_selected(&self, total: usize) -> bool {
        !self.ids.is_empty() && self.ids.len() < total
    }

    /// Header checkbox over a filtered view: if every visible row is
    /// already selected, unselect them; otherwise select them all. Rows
    /// outside the view keep their state.
    pub fn toggle_all_filtered(&mut self, visible: &[Uuid]) {
        if !visible.is_empty() && visible.iter().all(|id| self.ids.contains(id)) {
            for id in visible {
                self.ids.remove(id);
            }
        } else {
            self.ids.extend(visible.iter().copied());
        }
    }
}

impl FromIterator<Uuid> for Selection {
    fn from_iter<I: IntoIterator<Item = Uuid>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}
