use crate::matrix::Variant;

/// A cell reference as typed by the user: 1-based `COL:ROW`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellRef {
    pub col: usize,
    pub row: usize,
}

impl CellRef {
    /// 0-based `(col, row)` as used by the grid and selection.
    pub fn to_index(self) -> (usize, usize) {
        (self.col - 1, self.row - 1)
    }
}

pub fn parse_cell_ref(value: &str) -> Result<CellRef, String> {
    let trimmed = value.trim();
    let (col, row) = trimmed
        .split_once(':')
        .ok_or_else(|| format!("'{trimmed}': expected format COL:ROW"))?;
    let col: usize = col
        .trim()
        .parse()
        .map_err(|_| format!("'{trimmed}': invalid COL value"))?;
    let row: usize = row
        .trim()
        .parse()
        .map_err(|_| format!("'{trimmed}': invalid ROW value"))?;
    if col == 0 || row == 0 {
        return Err(format!("'{trimmed}': indices are 1-based"));
    }
    Ok(CellRef { col, row })
}

/// `auto` yields `None`: the variant is then detected from the record.
pub fn parse_variant(value: &str) -> Result<Option<Variant>, String> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("auto") || trimmed.is_empty() {
        return Ok(None);
    }
    Variant::parse(trimmed)
        .map(Some)
        .ok_or_else(|| "expected auto, point or range".to_string())
}
