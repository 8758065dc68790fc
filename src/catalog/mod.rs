//! Listing, searching and picking matrices out of a fetched collection.

use chrono::NaiveDate;
use serde::Serialize;

use crate::cms::MatrixRecord;
use crate::error::MatrixError;

#[derive(Clone, Debug, Default)]
pub struct CatalogFilter {
    pub query: Option<String>,
    pub date: Option<NaiveDate>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub id: u64,
    pub title: String,
    pub created_on: Option<NaiveDate>,
}

pub fn parse_date(value: &str) -> Result<NaiveDate, MatrixError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| MatrixError::InvalidDate {
        value: value.to_string(),
    })
}

/// Case-insensitive title substring match. An empty query matches everything.
pub fn search<'a>(records: &'a [MatrixRecord], query: &str) -> Vec<&'a MatrixRecord> {
    let needle = query.trim().to_lowercase();
    records
        .iter()
        .filter(|r| needle.is_empty() || r.title().to_lowercase().contains(&needle))
        .collect()
}

/// Keeps records created on `date` (UTC calendar day).
pub fn filter_by_date<'a>(records: &[&'a MatrixRecord], date: NaiveDate) -> Vec<&'a MatrixRecord> {
    records
        .iter()
        .copied()
        .filter(|r| r.attributes.created_at().map(|d| d.date_naive()) == Some(date))
        .collect()
}

pub fn apply_filter<'a>(records: &'a [MatrixRecord], filter: &CatalogFilter) -> Vec<&'a MatrixRecord> {
    let matched = search(records, filter.query.as_deref().unwrap_or(""));
    match filter.date {
        Some(date) => filter_by_date(&matched, date),
        None => matched,
    }
}

pub fn entries(records: &[&MatrixRecord]) -> Vec<CatalogEntry> {
    records
        .iter()
        .map(|r| CatalogEntry {
            id: r.id,
            title: r.title(),
            created_on: r.attributes.created_at().map(|d| d.date_naive()),
        })
        .collect()
}

/// Exact title match; with no title, the first record.
pub fn find_by_title<'a>(
    records: &'a [MatrixRecord],
    title: Option<&str>,
) -> Result<&'a MatrixRecord, MatrixError> {
    match title {
        Some(title) => records
            .iter()
            .find(|r| r.title() == title)
            .ok_or_else(|| MatrixError::MatrixNotFound {
                title: title.to_string(),
            }),
        None => records.first().ok_or(MatrixError::NoMatrices),
    }
}
