//! Column-oriented table handed over by acquisition adapters

use crate::error::{HistoryError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Time-indexed table of named decimal columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    index: Vec<DateTime<Utc>>,
    columns: BTreeMap<String, Vec<Decimal>>,
}

impl Frame {
    /// Create a frame with the given timestamp index and no columns
    pub fn new(index: Vec<DateTime<Utc>>) -> Self {
        Self {
            index,
            columns: BTreeMap::new(),
        }
    }

    /// Add or replace a column
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<Decimal>) -> Result<Self> {
        let name = name.into();
        if values.len() != self.index.len() {
            return Err(HistoryError::MalformedTable(format!(
                "column {} has {} rows, index has {}",
                name,
                values.len(),
                self.index.len()
            )));
        }
        self.columns.insert(name, values);
        Ok(self)
    }

    /// Timestamp index
    pub fn index(&self) -> &[DateTime<Utc>] {
        &self.index
    }

    /// Values of a column
    pub fn column(&self, name: &str) -> Option<&[Decimal]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Whether a column is present
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Column names in sorted order
    pub fn column_names(&self) -> Vec<String> {
        self.columns.keys().cloned().collect()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the frame has no rows
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Keep rows with `start <= ts < end`
    pub fn slice_time(self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        let lo = start.map_or(0, |s| self.index.partition_point(|ts| *ts < s));
        let hi = end.map_or(self.index.len(), |e| self.index.partition_point(|ts| *ts < e));
        let hi = hi.max(lo);

        Self {
            index: self.index[lo..hi].to_vec(),
            columns: self
                .columns
                .into_iter()
                .map(|(name, values)| (name, values[lo..hi].to_vec()))
                .collect(),
        }
    }
}
