//! Application state container.
//!
//! [`MatrixState`] is a plain value advanced by [`MatrixState::reduce`]. A
//! fetch result replaces the snapshot wholesale; cell toggles only touch the
//! selection; a failed fetch leaves everything in place apart from the
//! recorded error.

use tracing::{debug, info, warn};

use crate::catalog;
use crate::cms::{CmsClient, MatrixRecord};
use crate::error::FetchFailed;
use crate::matrix::{BudgetIndicator, Grid, Selection, Variant};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SelectionPolicy {
    /// Ignore clicks in column 0, which some layouts use for row names.
    pub lock_first_column: bool,
}

impl SelectionPolicy {
    pub fn allows(&self, col: usize) -> bool {
        !(self.lock_first_column && col == 0)
    }
}

#[derive(Clone, Debug)]
pub enum Action {
    Loaded(Vec<MatrixRecord>),
    FetchFailed(FetchFailed),
    /// Switch to another matrix by title (`None` = first record).
    Navigate(Option<String>),
    ToggleCell { col: usize, row: usize },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub record: MatrixRecord,
    pub grid: Grid,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MatrixState {
    records: Vec<MatrixRecord>,
    active_title: Option<String>,
    snapshot: Option<Snapshot>,
    selection: Selection,
    policy: SelectionPolicy,
    variant: Option<Variant>,
    last_error: Option<FetchFailed>,
    needs_fetch: bool,
}

impl MatrixState {
    pub fn new(active_title: Option<String>, policy: SelectionPolicy, variant: Option<Variant>) -> Self {
        Self {
            records: Vec::new(),
            active_title,
            snapshot: None,
            selection: Selection::new(),
            policy,
            variant,
            last_error: None,
            needs_fetch: true,
        }
    }

    pub fn records(&self) -> &[MatrixRecord] {
        &self.records
    }

    pub fn active_title(&self) -> Option<&str> {
        self.active_title.as_deref()
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.snapshot.as_ref().map(|s| &s.grid)
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn last_error(&self) -> Option<&FetchFailed> {
        self.last_error.as_ref()
    }

    pub fn needs_fetch(&self) -> bool {
        self.needs_fetch
    }

    pub fn budget(&self) -> Option<BudgetIndicator> {
        self.grid().map(|g| g.budget(&self.selection))
    }

    pub fn reduce(self, action: Action) -> Self {
        match action {
            Action::Loaded(records) => self.loaded(records),
            Action::FetchFailed(err) => {
                warn!(error = %err, "keeping previous matrix snapshot");
                Self {
                    last_error: Some(err),
                    needs_fetch: false,
                    ..self
                }
            }
            Action::Navigate(title) => {
                if title == self.active_title {
                    return self;
                }
                debug!(from = ?self.active_title, to = ?title, "matrix identity changed");
                Self {
                    active_title: title,
                    needs_fetch: true,
                    ..self
                }
            }
            Action::ToggleCell { col, row } => self.toggle(col, row),
        }
    }

    fn loaded(self, records: Vec<MatrixRecord>) -> Self {
        let snapshot = match catalog::find_by_title(&records, self.active_title.as_deref()) {
            Ok(record) => Some(Snapshot {
                grid: Grid::from_attributes(&record.attributes, self.variant),
                record: record.clone(),
            }),
            Err(e) => {
                warn!(error = %e, "no matrix to display");
                None
            }
        };
        if let Some(s) = snapshot.as_ref() {
            info!(
                title = %s.grid.title,
                columns = s.grid.display_columns(),
                rows = s.grid.display_rows(),
                "matrix loaded"
            );
        }
        Self {
            records,
            snapshot,
            selection: Selection::new(),
            last_error: None,
            needs_fetch: false,
            ..self
        }
    }

    fn toggle(self, col: usize, row: usize) -> Self {
        let Some((columns, rows)) = self
            .grid()
            .map(|g| (g.display_columns(), g.display_rows()))
        else {
            debug!(col, row, "toggle ignored, no matrix loaded");
            return self;
        };
        if !self.policy.allows(col) {
            debug!(col, row, "toggle ignored, column is locked");
            return self;
        }
        if col >= columns || row >= rows {
            debug!(col, row, "toggle ignored, cell outside grid");
            return self;
        }
        let selection = self.selection.toggle(col, row);
        Self { selection, ..self }
    }

    /// Fetches when the active identity changed since the last load.
    pub async fn sync(self, client: &CmsClient) -> Self {
        if !self.needs_fetch {
            return self;
        }
        match client.fetch_matrices().await {
            Ok(records) => self.reduce(Action::Loaded(records)),
            Err(err) => self.reduce(Action::FetchFailed(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn records() -> Vec<MatrixRecord> {
        vec![
            MatrixRecord {
                id: 1,
                attributes: serde_json::from_value(json!({
                    "Title_Matrix": "First",
                    "Total_Price": 200,
                    "Text_1_1": "A", "Price_1_1": 100,
                    "Text_2_1": "B", "Price_2_1": 90,
                    "Text_2_2": "C", "Price_2_2": 30,
                }))
                .unwrap(),
            },
            MatrixRecord {
                id: 2,
                attributes: serde_json::from_value(json!({
                    "Title_Matrix": "Second",
                    "Total_Price": 10,
                    "Text_1_1": "Z", "Price_1_1": 1,
                }))
                .unwrap(),
            },
        ]
    }

    fn loaded(policy: SelectionPolicy) -> MatrixState {
        MatrixState::new(None, policy, None).reduce(Action::Loaded(records()))
    }

    #[test]
    fn load_picks_first_record_without_title() {
        let state = loaded(SelectionPolicy::default());
        assert_eq!(state.grid().unwrap().title, "First");
        assert!(!state.needs_fetch());
    }

    #[test]
    fn fetch_failure_keeps_snapshot_and_selection() {
        let state = loaded(SelectionPolicy::default()).reduce(Action::ToggleCell { col: 0, row: 0 });
        let before = state.clone();
        let err = FetchFailed {
            url: "http://localhost:1338/api/matrices".to_string(),
            reason: "connection refused".to_string(),
        };
        let after = state.reduce(Action::FetchFailed(err.clone()));
        assert_eq!(after.snapshot(), before.snapshot());
        assert_eq!(after.selection(), before.selection());
        assert_eq!(after.last_error(), Some(&err));
    }

    #[test]
    fn fetch_failure_on_empty_state_stays_empty() {
        let state = MatrixState::new(None, SelectionPolicy::default(), None).reduce(
            Action::FetchFailed(FetchFailed {
                url: "u".to_string(),
                reason: "r".to_string(),
            }),
        );
        assert!(state.snapshot().is_none());
        assert!(state.budget().is_none());
    }

    #[test]
    fn reload_resets_selection() {
        let state = loaded(SelectionPolicy::default())
            .reduce(Action::ToggleCell { col: 1, row: 1 })
            .reduce(Action::Loaded(records()));
        assert!(state.selection().is_empty());
    }

    #[test]
    fn locked_first_column_ignores_clicks() {
        let state = loaded(SelectionPolicy {
            lock_first_column: true,
        })
        .reduce(Action::ToggleCell { col: 0, row: 0 })
        .reduce(Action::ToggleCell { col: 1, row: 0 });
        assert_eq!(state.selection().row_for(0), None);
        assert_eq!(state.selection().row_for(1), Some(0));
    }

    #[test]
    fn out_of_grid_toggle_is_ignored() {
        let state = loaded(SelectionPolicy::default()).reduce(Action::ToggleCell { col: 5, row: 0 });
        assert!(state.selection().is_empty());
    }

    #[test]
    fn navigate_only_refetches_on_identity_change() {
        let state = loaded(SelectionPolicy::default()).reduce(Action::Navigate(None));
        assert!(!state.needs_fetch());
        let state = state.reduce(Action::Navigate(Some("Second".to_string())));
        assert!(state.needs_fetch());
        let state = state.reduce(Action::Loaded(records()));
        assert_eq!(state.grid().unwrap().title, "Second");
    }

    #[test]
    fn budget_tracks_selection() {
        let state = loaded(SelectionPolicy::default())
            .reduce(Action::ToggleCell { col: 0, row: 0 })
            .reduce(Action::ToggleCell { col: 1, row: 0 });
        match state.budget().unwrap() {
            BudgetIndicator::Point {
                selected_total,
                percent,
                color,
            } => {
                assert_eq!(selected_total, 190.0);
                assert_eq!(percent, Some(95.0));
                assert_eq!(color, Some(crate::matrix::BudgetColor::Yellow));
            }
            other => panic!("unexpected indicator {other:?}"),
        }
    }
}
