//! The enriched place row and its fixed column schema

use crate::crawler::{ContactInfo, SocialLinks, SocialPlatform};
use crate::places::DETAIL_FIELDS;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Columns appended after the provider detail fields, in order
pub const DERIVED_COLUMNS: &[&str] = &[
    "emails",
    "facebook",
    "twitter_x",
    "instagram",
    "linkedin",
    "h3_index",
    "search_lat",
    "search_lng",
    "city",
];

/// The full output header: detail fields then derived columns
pub fn columns() -> Vec<&'static str> {
    DETAIL_FIELDS
        .iter()
        .chain(DERIVED_COLUMNS.iter())
        .copied()
        .collect()
}

/// One fully enriched business, written exactly once
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceRecord {
    /// Provider detail record, keyed by detail field name
    pub details: Map<String, Value>,
    pub emails: BTreeSet<String>,
    pub social_links: SocialLinks,
    /// Id of the search cell that found the place
    pub h3_index: String,
    pub search_lat: f64,
    pub search_lng: f64,
    pub region_name: String,
}

impl PlaceRecord {
    pub fn new(
        details: Map<String, Value>,
        contacts: ContactInfo,
        h3_index: String,
        search_point: (f64, f64),
        region_name: String,
    ) -> Self {
        Self {
            details,
            emails: contacts.emails,
            social_links: contacts.social,
            h3_index,
            search_lat: search_point.0,
            search_lng: search_point.1,
            region_name,
        }
    }

    pub fn has_email(&self) -> bool {
        !self.emails.is_empty()
    }

    pub fn website(&self) -> Option<&str> {
        self.details
            .get("website")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// The row in [`columns`] order
    pub fn to_row(&self) -> Vec<String> {
        let mut row: Vec<String> = DETAIL_FIELDS
            .iter()
            .map(|field| self.details.get(*field).map(flatten_value).unwrap_or_default())
            .collect();

        row.push(list_cell(self.emails.iter()));
        for platform in SocialPlatform::all() {
            let links = self.social_links.get(&platform);
            row.push(list_cell(links.into_iter().flatten()));
        }
        row.push(self.h3_index.clone());
        row.push(self.search_lat.to_string());
        row.push(self.search_lng.to_string());
        row.push(self.region_name.clone());
        row
    }
}

/// Renders a value as a single text cell
///
/// Objects and arrays become compact JSON, null becomes an empty cell and
/// strings are written without quotes.
pub fn flatten_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn list_cell<'a>(items: impl Iterator<Item = &'a String>) -> String {
    Value::Array(items.cloned().map(Value::String).collect()).to_string()
}

/// Reads a list column (`emails` or a social column) back into its items
///
/// Blank cells decode to an empty list; anything that is not a JSON array of
/// strings is rejected.
pub fn decode_list_cell(cell: &str) -> Result<Vec<String>, serde_json::Error> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(cell)
}
