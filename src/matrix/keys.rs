use std::sync::OnceLock;

use regex::Regex;

/// A recognized attribute key. Indices are kept 1-based, as they appear in the key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeKey {
    Title,
    TotalPrice,
    CreatedAt,
    RowName(usize),
    ColumnName(usize),
    Text { col: usize, row: usize },
    Price { col: usize, row: usize },
    RangeLow { col: usize, row: usize },
    RangeHigh { col: usize, row: usize },
    Photo { col: usize, row: usize },
}

pub const TITLE_KEY: &str = "Title_Matrix";
pub const TOTAL_PRICE_KEY: &str = "Total_Price";
pub const CREATED_AT_KEY: &str = "createdAt";

fn cell_key_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(Text|Price|R1Price|R2Price|Photo)_([0-9]+)_([0-9]+)$")
            .unwrap_or_else(|e| panic!("cell key pattern: {e}"))
    })
}

fn name_key_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(Row_Name|Column_Name)_([0-9]+)$")
            .unwrap_or_else(|e| panic!("name key pattern: {e}"))
    })
}

/// Largest row or column index accepted in a key. Keys beyond it are skipped.
pub const MAX_INDEX: usize = 1000;

// 0, overflowing and out-of-range suffixes are not valid 1-based indices.
fn parse_index(raw: &str) -> Option<usize> {
    match raw.parse::<usize>() {
        Ok(n) if (1..=MAX_INDEX).contains(&n) => Some(n),
        _ => None,
    }
}

/// Places `value` at the 1-based `index`, growing `out` with holes as needed.
/// `index` comes from [`AttributeKey::parse`], so it never exceeds [`MAX_INDEX`].
pub(super) fn place(out: &mut Vec<Option<String>>, index: usize, value: Option<String>) {
    if index == 0 || index > MAX_INDEX {
        return;
    }
    if out.len() < index {
        out.resize(index, None);
    }
    out[index - 1] = value;
}

impl AttributeKey {
    /// Classifies a raw attribute key. Unknown keys and keys with a malformed
    /// index suffix yield `None`.
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            TITLE_KEY => return Some(Self::Title),
            TOTAL_PRICE_KEY => return Some(Self::TotalPrice),
            CREATED_AT_KEY => return Some(Self::CreatedAt),
            _ => {}
        }

        if let Some(caps) = cell_key_re().captures(key) {
            let col = parse_index(&caps[2])?;
            let row = parse_index(&caps[3])?;
            return match &caps[1] {
                "Text" => Some(Self::Text { col, row }),
                "Price" => Some(Self::Price { col, row }),
                "R1Price" => Some(Self::RangeLow { col, row }),
                "R2Price" => Some(Self::RangeHigh { col, row }),
                "Photo" => Some(Self::Photo { col, row }),
                _ => None,
            };
        }

        if let Some(caps) = name_key_re().captures(key) {
            let index = parse_index(&caps[2])?;
            return match &caps[1] {
                "Row_Name" => Some(Self::RowName(index)),
                "Column_Name" => Some(Self::ColumnName(index)),
                _ => None,
            };
        }

        None
    }
}

pub fn text_key(col: usize, row: usize) -> String {
    format!("Text_{col}_{row}")
}

pub fn price_key(col: usize, row: usize) -> String {
    format!("Price_{col}_{row}")
}

pub fn range_low_key(col: usize, row: usize) -> String {
    format!("R1Price_{col}_{row}")
}

pub fn range_high_key(col: usize, row: usize) -> String {
    format!("R2Price_{col}_{row}")
}

pub fn photo_key(col: usize, row: usize) -> String {
    format!("Photo_{col}_{row}")
}

#[cfg(test)]
mod tests {
    use super::{place, AttributeKey, MAX_INDEX};

    #[test]
    fn index_cap_is_inclusive() {
        assert_eq!(
            AttributeKey::parse(&format!("Text_{MAX_INDEX}_1")),
            Some(AttributeKey::Text { col: MAX_INDEX, row: 1 })
        );
        assert_eq!(AttributeKey::parse(&format!("Text_1_{}", MAX_INDEX + 1)), None);
        assert_eq!(AttributeKey::parse(&format!("Column_Name_{}", MAX_INDEX + 1)), None);
    }

    #[test]
    fn place_ignores_out_of_range_indices() {
        let mut names = Vec::new();
        place(&mut names, 2, Some("b".to_string()));
        place(&mut names, 0, Some("zero".to_string()));
        place(&mut names, usize::MAX, Some("huge".to_string()));
        assert_eq!(names, vec![None, Some("b".to_string())]);
    }

    #[test]
    fn parses_cell_families() {
        assert_eq!(
            AttributeKey::parse("Text_3_2"),
            Some(AttributeKey::Text { col: 3, row: 2 })
        );
        assert_eq!(
            AttributeKey::parse("R2Price_1_10"),
            Some(AttributeKey::RangeHigh { col: 1, row: 10 })
        );
        assert_eq!(
            AttributeKey::parse("Photo_2_1"),
            Some(AttributeKey::Photo { col: 2, row: 1 })
        );
    }

    #[test]
    fn parses_name_families() {
        assert_eq!(
            AttributeKey::parse("Row_Name_4"),
            Some(AttributeKey::RowName(4))
        );
        assert_eq!(
            AttributeKey::parse("Column_Name_1"),
            Some(AttributeKey::ColumnName(1))
        );
    }

    #[test]
    fn malformed_suffixes_are_ignored() {
        assert_eq!(AttributeKey::parse("Text_a_1"), None);
        assert_eq!(AttributeKey::parse("Text_1"), None);
        assert_eq!(AttributeKey::parse("Text_0_1"), None);
        assert_eq!(AttributeKey::parse("Row_Name_"), None);
        assert_eq!(AttributeKey::parse("Row_Name_x"), None);
        assert_eq!(AttributeKey::parse("Textual_1_1"), None);
        assert_eq!(AttributeKey::parse("Text_99999999999999999999999_1"), None);
        assert_eq!(AttributeKey::parse("Row_Name_18446744073709551615"), None);
    }
}
