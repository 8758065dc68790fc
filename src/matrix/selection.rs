use std::collections::BTreeMap;

use serde::Serialize;

/// At most one selected row per column. Indices are 0-based.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Selection(BTreeMap<usize, usize>);

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deselects when `(col, row)` is the current pick for `col`; otherwise
    /// selects `row`, replacing any earlier pick in that column.
    pub fn toggle(&self, col: usize, row: usize) -> Selection {
        let mut next = self.0.clone();
        if next.get(&col) == Some(&row) {
            next.remove(&col);
        } else {
            next.insert(col, row);
        }
        Selection(next)
    }

    pub fn row_for(&self, col: usize) -> Option<usize> {
        self.0.get(&col).copied()
    }

    pub fn is_selected(&self, col: usize, row: usize) -> bool {
        self.row_for(col) == Some(row)
    }

    /// `(col, row)` pairs in ascending column order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0.iter().map(|(c, r)| (*c, *r))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(usize, usize)> for Selection {
    fn from_iter<T: IntoIterator<Item = (usize, usize)>>(iter: T) -> Self {
        Selection(iter.into_iter().collect())
    }
}

/// Free-function form of [`Selection::toggle`].
pub fn toggle_selection(selection: &Selection, col: usize, row: usize) -> Selection {
    selection.toggle(col, row)
}

#[cfg(test)]
mod tests {
    use super::Selection;

    #[test]
    fn toggle_is_its_own_inverse() {
        let start = Selection::new().toggle(0, 2).toggle(3, 1);
        for (col, row) in [(0, 2), (0, 1), (1, 0), (3, 1)] {
            assert_eq!(start.toggle(col, row).toggle(col, row), start);
        }
    }

    #[test]
    fn selecting_another_row_replaces_within_column_only() {
        let s = Selection::new().toggle(1, 0).toggle(2, 0).toggle(1, 3);
        assert_eq!(s.row_for(1), Some(3));
        assert_eq!(s.row_for(2), Some(0));
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn toggle_leaves_original_untouched() {
        let s = Selection::new();
        let next = s.toggle(0, 0);
        assert!(s.is_empty());
        assert!(next.is_selected(0, 0));
    }
}
