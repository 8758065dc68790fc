//! Matrix model: attribute-bag parsing, grid derivation, selection and budget.
//!
//! A matrix record carries a flat bag of keys such as `Text_<col>_<row>`,
//! `Price_<col>_<row>` or `Row_Name_<row>` (1-based). [`Grid`] turns one bag
//! into a typed 0-based grid; [`Selection`] tracks the single picked row per
//! column; the `budget` functions map a selected total onto the matrix's
//! `Total_Price`.

mod attributes;
mod budget;
mod grid;
mod keys;
mod selection;

pub use attributes::{MatrixAttributes, Photo, DEFAULT_UPLOAD_PREFIX};
pub use budget::{
    budget_color, budget_utilization_percent, format_amount, range_band_color, Band,
    BudgetColor, Gradient, PriceRange,
};
pub use grid::{selected_total, selected_total_range, BudgetIndicator, Cell, Grid, Variant};
pub use keys::AttributeKey;
pub use selection::{toggle_selection, Selection};
