//! Row selection.

use std::borrow::Borrow;

/// The highlighted row, by key. At most one row is selected: the one
/// being edited.
#[derive(Debug, Clone)]
pub struct Selection<K> {
    selected: Option<K>,
}

impl<K> Default for Selection<K> {
    fn default() -> Self {
        Self { selected: None }
    }
}

impl<K: Eq> Selection<K> {
    /// Selects `key`, replacing any previous selection.
    /// Returns true if the selection changed.
    pub fn select(&mut self, key: K) -> bool {
        if self.selected.as_ref() == Some(&key) {
            return false;
        }
        self.selected = Some(key);
        true
    }

    pub fn is_selected<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.selected.as_ref().is_some_and(|k| k.borrow() == key)
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    /// Drops the selection if its key is no longer kept.
    pub fn retain(&mut self, keep: impl FnOnce(&K) -> bool) {
        if self.selected.as_ref().is_some_and(|k| !keep(k)) {
            self.selected = None;
        }
    }

    pub fn get(&self) -> Option<&K> {
        self.selected.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_replaces() {
        let mut selection = Selection::default();
        assert!(selection.select("a".to_string()));
        assert!(selection.select("b".to_string()));
        assert!(!selection.is_selected("a"));
        assert_eq!(selection.get().map(String::as_str), Some("b"));
        assert!(!selection.select("b".to_string()));
    }

    #[test]
    fn test_retain_drops_missing_key() {
        let mut selection = Selection::default();
        selection.select(7);
        selection.retain(|k| *k != 7);
        assert!(selection.get().is_none());

        selection.select(8);
        selection.retain(|k| *k == 8);
        assert!(selection.is_selected(&8));
    }
}
