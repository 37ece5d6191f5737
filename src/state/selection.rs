use std::collections::BTreeSet;

use crate::data::dataset::Dataset;

/// The set of highlighted model ids.
///
/// This is the only place a highlight flag lives. Paths, grid rows and
/// symbols read it through [`Selection::contains`]; nothing else records
/// highlight state of its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: BTreeSet<String>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `model_id` if absent, remove it if present.
    pub fn toggle(&mut self, model_id: &str) {
        if !self.ids.remove(model_id) {
            self.ids.insert(model_id.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Replace the selection with exactly `all_ids`.
    pub fn select_all<'a>(&mut self, all_ids: impl IntoIterator<Item = &'a str>) {
        self.ids.clear();
        self.ids.extend(all_ids.into_iter().map(str::to_string));
    }

    pub fn contains(&self, model_id: &str) -> bool {
        self.ids.contains(model_id)
    }

    /// Drop ids that no longer exist in `dataset`. Returns how many were purged.
    pub fn retain_known(&mut self, dataset: &Dataset) -> usize {
        let before = self.ids.len();
        self.ids.retain(|id| dataset.contains(id));
        before - self.ids.len()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}
