//! In-memory table layouts and conversion between them

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// One record keyed by column name
pub type Row = Map<String, Value>;

/// Names of the supported in-memory layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InMemoryFormatName {
    /// One map per record
    Rows,
    /// One vector per column
    Columns,
}

impl fmt::Display for InMemoryFormatName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InMemoryFormatName::Rows => write!(f, "rows"),
            InMemoryFormatName::Columns => write!(f, "columns"),
        }
    }
}

/// Tabular data held in one of the supported layouts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InMemoryFormat {
    Rows(Vec<Row>),
    Columns(BTreeMap<String, Vec<Value>>),
}

impl InMemoryFormat {
    pub fn name(&self) -> InMemoryFormatName {
        match self {
            InMemoryFormat::Rows(_) => InMemoryFormatName::Rows,
            InMemoryFormat::Columns(_) => InMemoryFormatName::Columns,
        }
    }

    /// Number of records
    pub fn len(&self) -> usize {
        match self {
            InMemoryFormat::Rows(rows) => rows.len(),
            InMemoryFormat::Columns(columns) => columns.values().map(Vec::len).max().unwrap_or(0),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy the data into the requested layout
    ///
    /// Cells missing from a ragged input become `null`.
    pub fn convert(&self, target: InMemoryFormatName) -> InMemoryFormat {
        match (self, target) {
            (InMemoryFormat::Rows(_), InMemoryFormatName::Rows)
            | (InMemoryFormat::Columns(_), InMemoryFormatName::Columns) => self.clone(),
            (InMemoryFormat::Rows(rows), InMemoryFormatName::Columns) => {
                InMemoryFormat::Columns(rows_to_columns(rows))
            }
            (InMemoryFormat::Columns(columns), InMemoryFormatName::Rows) => {
                InMemoryFormat::Rows(columns_to_rows(columns, self.len()))
            }
        }
    }
}

fn rows_to_columns(rows: &[Row]) -> BTreeMap<String, Vec<Value>> {
    let mut columns: BTreeMap<String, Vec<Value>> = rows
        .iter()
        .flat_map(|row| row.keys().cloned())
        .map(|key| (key, Vec::with_capacity(rows.len())))
        .collect();

    for row in rows {
        for (key, column) in columns.iter_mut() {
            column.push(row.get(key).cloned().unwrap_or(Value::Null));
        }
    }
    columns
}

fn columns_to_rows(columns: &BTreeMap<String, Vec<Value>>, len: usize) -> Vec<Row> {
    (0..len)
        .map(|i| {
            columns
                .iter()
                .map(|(key, column)| (key.clone(), column.get(i).cloned().unwrap_or(Value::Null)))
                .collect()
        })
        .collect()
}
