use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::keys::{self, AttributeKey};

pub const DEFAULT_UPLOAD_PREFIX: &str = "/uploads";

/// The flat attribute bag of one matrix record, as delivered by the CMS.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct MatrixAttributes(Map<String, Value>);

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Photo {
    pub url: String,
    pub name: Option<String>,
}

pub(super) fn number_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

pub(super) fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

// Accepts both `{url, name}` and the media envelope `{data: {attributes: {url, name}}}`.
pub(super) fn photo_value(value: &Value) -> Option<Photo> {
    let obj = value.as_object()?;
    let attrs = match obj.get("data") {
        Some(Value::Null) => return None,
        Some(data) => data.get("attributes")?.as_object()?,
        None => obj,
    };
    let url = attrs.get("url")?.as_str()?.to_string();
    let name = attrs.get("name").and_then(Value::as_str).map(str::to_string);
    Some(Photo { url, name })
}

impl MatrixAttributes {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Recognized keys paired with their values; everything else is skipped.
    pub fn entries(&self) -> impl Iterator<Item = (AttributeKey, &Value)> {
        self.0
            .iter()
            .filter_map(|(k, v)| AttributeKey::parse(k).map(|key| (key, v)))
    }

    pub fn title(&self) -> String {
        self.get(keys::TITLE_KEY)
            .and_then(text_value)
            .unwrap_or_default()
    }

    pub fn total_price(&self) -> f64 {
        self.get(keys::TOTAL_PRICE_KEY)
            .and_then(number_value)
            .unwrap_or(0.0)
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.get(keys::CREATED_AT_KEY)?.as_str()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn row_names(&self) -> Vec<Option<String>> {
        let mut out = Vec::new();
        for (key, value) in self.entries() {
            if let AttributeKey::RowName(i) = key {
                keys::place(&mut out, i, text_value(value));
            }
        }
        out
    }

    pub fn column_names(&self) -> Vec<Option<String>> {
        let mut out = Vec::new();
        for (key, value) in self.entries() {
            if let AttributeKey::ColumnName(j) = key {
                keys::place(&mut out, j, text_value(value));
            }
        }
        out
    }

    pub fn number_of_columns(&self) -> usize {
        self.entries()
            .filter_map(|(key, _)| match key {
                AttributeKey::Text { col, .. } => Some(col),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }

    pub fn number_of_rows(&self) -> usize {
        self.entries()
            .filter_map(|(key, _)| match key {
                AttributeKey::Text { row, .. } => Some(row),
                _ => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// True when any low/high range price key is present.
    pub fn has_range_prices(&self) -> bool {
        self.entries().any(|(key, _)| {
            matches!(
                key,
                AttributeKey::RangeLow { .. } | AttributeKey::RangeHigh { .. }
            )
        })
    }

    // Cell lookups take 1-based indices, matching the key naming.

    pub fn cell_text(&self, col: usize, row: usize) -> String {
        self.get(&keys::text_key(col, row))
            .and_then(text_value)
            .unwrap_or_default()
    }

    pub fn cell_price(&self, col: usize, row: usize) -> f64 {
        self.get(&keys::price_key(col, row))
            .and_then(number_value)
            .unwrap_or(0.0)
    }

    pub fn cell_price_range(&self, col: usize, row: usize) -> (f64, f64) {
        let low = self
            .get(&keys::range_low_key(col, row))
            .and_then(number_value)
            .unwrap_or(0.0);
        let high = self
            .get(&keys::range_high_key(col, row))
            .and_then(number_value)
            .unwrap_or(0.0);
        (low, high)
    }

    pub fn cell_photo(&self, col: usize, row: usize) -> Option<Photo> {
        self.get(&keys::photo_key(col, row)).and_then(photo_value)
    }

    /// The photo's relative path, only when it lives under `upload_prefix`.
    pub fn photo_url(&self, col: usize, row: usize, upload_prefix: &str) -> Option<String> {
        self.cell_photo(col, row)
            .filter(|p| p.url.starts_with(upload_prefix))
            .map(|p| p.url)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::MatrixAttributes;

    fn attrs(value: serde_json::Value) -> MatrixAttributes {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn names_leave_holes_for_missing_indices() {
        let a = attrs(json!({
            "Row_Name_3": "third",
            "Row_Name_1": "first",
        }));
        assert_eq!(
            a.row_names(),
            vec![Some("first".to_string()), None, Some("third".to_string())]
        );
        assert!(a.column_names().is_empty());
    }

    #[test]
    fn missing_cells_default() {
        let a = attrs(json!({ "Text_1_1": "A" }));
        assert_eq!(a.cell_text(2, 2), "");
        assert_eq!(a.cell_price(1, 1), 0.0);
        assert_eq!(a.cell_price_range(1, 1), (0.0, 0.0));
        assert_eq!(a.photo_url(1, 1, "/uploads"), None);
    }

    #[test]
    fn numeric_strings_are_accepted_as_prices() {
        let a = attrs(json!({ "Price_1_1": "12.5", "Price_1_2": "abc" }));
        assert_eq!(a.cell_price(1, 1), 12.5);
        assert_eq!(a.cell_price(1, 2), 0.0);
    }

    #[test]
    fn photo_requires_upload_prefix() {
        let a = attrs(json!({
            "Photo_1_1": { "data": { "attributes": { "url": "/uploads/a.png", "name": "a.png" } } },
            "Photo_2_1": { "url": "https://cdn.example.com/b.png", "name": "b.png" },
            "Photo_3_1": { "data": null },
            "Photo_4_1": { "url": "/uploads/d.png" },
        }));
        assert_eq!(a.photo_url(1, 1, "/uploads"), Some("/uploads/a.png".to_string()));
        assert_eq!(a.photo_url(2, 1, "/uploads"), None);
        assert_eq!(a.photo_url(3, 1, "/uploads"), None);
        assert_eq!(a.photo_url(4, 1, "/uploads"), Some("/uploads/d.png".to_string()));
        assert_eq!(a.cell_photo(1, 1).unwrap().name.as_deref(), Some("a.png"));
    }

    #[test]
    fn created_at_parses_rfc3339() {
        let a = attrs(json!({ "createdAt": "2023-07-14T09:30:00.000Z" }));
        assert_eq!(
            a.created_at().map(|d| d.date_naive().to_string()),
            Some("2023-07-14".to_string())
        );
        assert_eq!(attrs(json!({ "createdAt": "yesterday" })).created_at(), None);
    }
}
