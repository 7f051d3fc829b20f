//! User feature profile and the predictor's input-column schema.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

/// Profile column consulted by the eligibility filter.
pub const ANNUAL_INCOME: &str = "annual_inc";
/// Profile column consulted by the eligibility filter.
pub const FICO_HIGH: &str = "fico_high";

/// Ordered list of columns the eligibility model expects, loaded once
/// from the schema sidecar. An empty schema makes every ranking
/// request fail validation deterministically.
#[derive(Debug, Clone, Default)]
pub struct InputSchema {
    columns: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("failed to read input schema: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid input schema data: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct SchemaFile {
    input_cols: Vec<String>,
}

impl InputSchema {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Schema stand-in when the sidecar cannot be loaded.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SchemaError> {
        let parsed: SchemaFile = serde_json::from_reader(reader)?;
        Ok(Self {
            columns: parsed.input_cols,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// Flat mapping of feature name to numeric value, slot-filled and
/// type-checked by the caller before it reaches the ranking engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserProfile {
    values: BTreeMap<String, f64>,
}

impl UserProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: f64) {
        self.values.insert(column.into(), value);
    }

    pub fn with(mut self, column: impl Into<String>, value: f64) -> Self {
        self.insert(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.values.get(column).copied()
    }

    /// Schema columns absent from this profile, in schema order.
    pub fn missing_columns(&self, schema: &InputSchema) -> Vec<String> {
        schema
            .columns()
            .iter()
            .filter(|column| !self.values.contains_key(*column))
            .cloned()
            .collect()
    }

    /// Values arranged in the schema's declared column order. Callers
    /// must have checked `missing_columns` first; any gap is `None`.
    pub fn feature_vector(&self, schema: &InputSchema) -> Option<Vec<f64>> {
        schema
            .columns()
            .iter()
            .map(|column| self.get(column))
            .collect()
    }
}

impl FromIterator<(String, f64)> for UserProfile {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
