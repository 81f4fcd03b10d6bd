//! Feature alignment for term deposit model inference.
//!
//! The classifier was trained on a one-hot encoded table whose column list is
//! shipped alongside it. This module reproduces that encoding for a single
//! client and reindexes the result to the stored column list: columns the
//! record does not produce are filled with zero, columns the model does not
//! know are dropped.

use crate::error::SchemaError;
use crate::form::{FieldKind, CLIENT_FIELDS};
use crate::types::client::{AttributeValue, ClientRecord};
use crate::types::prediction::UnseenCategory;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::warn;

/// Ordered list of column names the classifier was trained on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    names: Vec<String>,
}

impl FeatureSchema {
    pub fn new(names: Vec<String>) -> Result<Self, SchemaError> {
        if names.is_empty() {
            return Err(SchemaError::Empty);
        }

        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(SchemaError::Duplicate(name.clone()));
            }
        }

        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Schema columns that no form attribute can ever produce.
    ///
    /// These are always zero in the encoded row.
    pub fn unreachable_columns(&self) -> Vec<&str> {
        let producible: HashSet<String> = all_column_names().into_iter().collect();
        self.names
            .iter()
            .filter(|n| !producible.contains(n.as_str()))
            .map(String::as_str)
            .collect()
    }
}

/// Indicator column name for a categorical value, as produced by one-hot encoding
pub fn indicator_column(attribute: &str, category: &str) -> String {
    format!("{attribute}_{category}")
}

/// Every column the encoder can produce: numeric attributes under their own
/// name, categorical attributes as one indicator per vocabulary entry.
pub fn all_column_names() -> Vec<String> {
    let mut names = Vec::new();
    for spec in &CLIENT_FIELDS {
        match spec.kind {
            FieldKind::Number { .. } => names.push(spec.name.to_string()),
            FieldKind::Choice { choices } => names.extend(
                choices
                    .iter()
                    .map(|category| indicator_column(spec.name, category)),
            ),
        }
    }
    names
}

/// One-hot encode a record over the full vocabulary.
///
/// Every indicator column of every categorical attribute is materialized;
/// exactly one per attribute is 1.
pub fn one_hot(record: &ClientRecord) -> Vec<(String, f64)> {
    let mut columns = Vec::new();
    for spec in &CLIENT_FIELDS {
        match (spec.kind, record.attribute(spec.name)) {
            (_, Some(AttributeValue::Number(value))) => {
                columns.push((spec.name.to_string(), value as f64));
            }
            (FieldKind::Choice { choices }, Some(AttributeValue::Category(selected))) => {
                for category in choices {
                    let hot = if *category == selected { 1.0 } else { 0.0 };
                    columns.push((indicator_column(spec.name, category), hot));
                }
            }
            _ => {}
        }
    }
    columns
}

/// A single row whose columns are exactly the schema's, in schema order
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedRecord {
    schema: Arc<FeatureSchema>,
    values: Vec<f64>,
}

impl EncodedRecord {
    pub fn columns(&self) -> &[String] {
        self.schema.names()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value of a named column, if the schema has it
    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns()
            .iter()
            .position(|c| c == column)
            .map(|i| self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.columns()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// Row as `f32`, the input type of exported tree and linear models
    pub fn to_f32(&self) -> Vec<f32> {
        self.values.iter().map(|&v| v as f32).collect()
    }
}

/// Side information from aligning one record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignmentReport {
    /// Selected categories with no indicator column in the schema
    pub unseen_categories: Vec<UnseenCategory>,
}

impl AlignmentReport {
    pub fn is_clean(&self) -> bool {
        self.unseen_categories.is_empty()
    }
}

/// Aligns client records to the stored feature schema
#[derive(Debug, Clone)]
pub struct FeatureAligner {
    schema: Arc<FeatureSchema>,
}

impl FeatureAligner {
    pub fn new(schema: Arc<FeatureSchema>) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn feature_count(&self) -> usize {
        self.schema.len()
    }

    /// Encode a record and reindex it to the schema
    pub fn align(&self, record: &ClientRecord) -> (EncodedRecord, AlignmentReport) {
        let encoded: HashMap<String, f64> = one_hot(record).into_iter().collect();

        let values = self
            .schema
            .names()
            .iter()
            .map(|name| encoded.get(name).copied().unwrap_or(0.0))
            .collect();

        let report = AlignmentReport {
            unseen_categories: self.unseen_categories(record),
        };

        for unseen in &report.unseen_categories {
            warn!(
                attribute = %unseen.attribute,
                value = %unseen.value,
                "Category has no column in the feature schema, encoded as all zeros"
            );
        }

        let row = EncodedRecord {
            schema: Arc::clone(&self.schema),
            values,
        };
        (row, report)
    }

    fn unseen_categories(&self, record: &ClientRecord) -> Vec<UnseenCategory> {
        CLIENT_FIELDS
            .iter()
            .filter_map(|spec| match record.attribute(spec.name) {
                Some(AttributeValue::Category(value))
                    if !self.schema.contains(&indicator_column(spec.name, value)) =>
                {
                    Some(UnseenCategory {
                        attribute: spec.name.to_string(),
                        value: value.to_string(),
                    })
                }
                _ => None,
            })
            .collect()
    }
}
