use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::trace;

use super::attributes::{number_value, photo_value, text_value, MatrixAttributes, Photo};
use super::budget::{
    budget_color, budget_utilization_percent, range_band_color, BudgetColor, Gradient, PriceRange,
};
use super::keys::{place, AttributeKey};
use super::selection::Selection;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    PointPrice,
    RangePrice,
}

impl Variant {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "point" | "point-price" | "point_price" => Some(Self::PointPrice),
            "range" | "range-price" | "range_price" => Some(Self::RangePrice),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Variant::PointPrice => "point",
            Variant::RangePrice => "range",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Cell {
    pub text: String,
    pub price: f64,
    pub range: PriceRange,
    pub photo: Option<Photo>,
}

/// Typed view of one matrix record, built from its attribute bag in one pass.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    pub title: String,
    pub total_price: f64,
    pub variant: Variant,
    pub created_at: Option<DateTime<Utc>>,
    pub row_names: Vec<Option<String>>,
    pub column_names: Vec<Option<String>>,
    text_columns: usize,
    text_rows: usize,
    // 0-based (col, row)
    cells: HashMap<(usize, usize), Cell>,
}

impl Grid {
    /// Builds the grid. The variant follows `variant` when given, otherwise it
    /// is `RangePrice` iff any `R1Price_*`/`R2Price_*` key is present.
    pub fn from_attributes(attrs: &MatrixAttributes, variant: Option<Variant>) -> Self {
        let mut row_names = Vec::new();
        let mut column_names = Vec::new();
        let mut text_columns = 0;
        let mut text_rows = 0;
        let mut saw_range = false;
        let mut cells: HashMap<(usize, usize), Cell> = HashMap::new();

        for (key, value) in attrs.entries() {
            match key {
                AttributeKey::RowName(i) => {
                    place(&mut row_names, i, text_value(value))
                }
                AttributeKey::ColumnName(j) => {
                    place(&mut column_names, j, text_value(value))
                }
                AttributeKey::Text { col, row } => {
                    text_columns = text_columns.max(col);
                    text_rows = text_rows.max(row);
                    cells.entry((col - 1, row - 1)).or_default().text =
                        text_value(value).unwrap_or_default();
                }
                AttributeKey::Price { col, row } => {
                    cells.entry((col - 1, row - 1)).or_default().price =
                        number_value(value).unwrap_or(0.0);
                }
                AttributeKey::RangeLow { col, row } => {
                    saw_range = true;
                    cells.entry((col - 1, row - 1)).or_default().range.low =
                        number_value(value).unwrap_or(0.0);
                }
                AttributeKey::RangeHigh { col, row } => {
                    saw_range = true;
                    cells.entry((col - 1, row - 1)).or_default().range.high =
                        number_value(value).unwrap_or(0.0);
                }
                AttributeKey::Photo { col, row } => {
                    cells.entry((col - 1, row - 1)).or_default().photo =
                        photo_value(value);
                }
                AttributeKey::Title | AttributeKey::TotalPrice | AttributeKey::CreatedAt => {}
            }
        }

        let variant = variant.unwrap_or(if saw_range {
            Variant::RangePrice
        } else {
            Variant::PointPrice
        });
        trace!(
            columns = text_columns,
            rows = text_rows,
            cells = cells.len(),
            variant = variant.label(),
            "built matrix grid"
        );

        Grid {
            title: attrs.title(),
            total_price: attrs.total_price(),
            variant,
            created_at: attrs.created_at(),
            row_names,
            column_names,
            text_columns,
            text_rows,
            cells,
        }
    }

    /// Highest column index carrying a `Text` key.
    pub fn number_of_columns(&self) -> usize {
        self.text_columns
    }

    /// Highest row index carrying a `Text` key.
    pub fn number_of_rows(&self) -> usize {
        self.text_rows
    }

    /// Columns to render: declared names and text-bearing columns alike.
    pub fn display_columns(&self) -> usize {
        self.column_names.len().max(self.text_columns)
    }

    pub fn display_rows(&self) -> usize {
        self.row_names.len().max(self.text_rows)
    }

    pub fn row_name(&self, row: usize) -> Option<&str> {
        self.row_names.get(row).and_then(|n| n.as_deref())
    }

    pub fn column_name(&self, col: usize) -> Option<&str> {
        self.column_names.get(col).and_then(|n| n.as_deref())
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<&Cell> {
        self.cells.get(&(col, row))
    }

    pub fn cell_text(&self, col: usize, row: usize) -> &str {
        self.cell(col, row).map(|c| c.text.as_str()).unwrap_or("")
    }

    pub fn cell_price(&self, col: usize, row: usize) -> f64 {
        self.cell(col, row).map(|c| c.price).unwrap_or(0.0)
    }

    pub fn cell_price_range(&self, col: usize, row: usize) -> PriceRange {
        self.cell(col, row).map(|c| c.range).unwrap_or_default()
    }

    pub fn photo_url(&self, col: usize, row: usize, upload_prefix: &str) -> Option<&str> {
        self.cell(col, row)
            .and_then(|c| c.photo.as_ref())
            .map(|p| p.url.as_str())
            .filter(|url| url.starts_with(upload_prefix))
    }

    pub fn selected_total(&self, selection: &Selection) -> f64 {
        selection
            .iter()
            .map(|(col, row)| self.cell_price(col, row))
            .sum()
    }

    pub fn selected_total_range(&self, selection: &Selection) -> PriceRange {
        selection
            .iter()
            .map(|(col, row)| self.cell_price_range(col, row))
            .fold(PriceRange::default(), |acc, r| PriceRange {
                low: acc.low + r.low,
                high: acc.high + r.high,
            })
    }

    pub fn budget(&self, selection: &Selection) -> BudgetIndicator {
        match self.variant {
            Variant::PointPrice => {
                let selected_total = self.selected_total(selection);
                let percent = budget_utilization_percent(selected_total, self.total_price);
                BudgetIndicator::Point {
                    selected_total,
                    percent,
                    color: percent.map(budget_color),
                }
            }
            Variant::RangePrice => {
                let selected = self.selected_total_range(selection);
                let low_percent = budget_utilization_percent(selected.low, self.total_price);
                let high_percent = budget_utilization_percent(selected.high, self.total_price);
                let gradient = match (low_percent, high_percent) {
                    (Some(low), Some(high)) => Some(range_band_color(low, high)),
                    _ => None,
                };
                BudgetIndicator::Range {
                    selected,
                    low_percent,
                    high_percent,
                    gradient,
                }
            }
        }
    }
}

/// Selection-driven budget figures. Percentages are absent when the matrix
/// has no total price.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum BudgetIndicator {
    Point {
        selected_total: f64,
        percent: Option<f64>,
        color: Option<BudgetColor>,
    },
    Range {
        selected: PriceRange,
        low_percent: Option<f64>,
        high_percent: Option<f64>,
        gradient: Option<Gradient>,
    },
}

/// Sum of point prices over the selection, read straight from the attributes.
pub fn selected_total(attrs: &MatrixAttributes, selection: &Selection) -> f64 {
    selection
        .iter()
        .map(|(col, row)| attrs.cell_price(col + 1, row + 1))
        .sum()
}

pub fn selected_total_range(attrs: &MatrixAttributes, selection: &Selection) -> PriceRange {
    let mut total = PriceRange::default();
    for (col, row) in selection.iter() {
        let (low, high) = attrs.cell_price_range(col + 1, row + 1);
        total.low += low;
        total.high += high;
    }
    total
}
