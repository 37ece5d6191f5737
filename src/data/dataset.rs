use std::collections::{HashMap, HashSet};

use crate::error::{ChartError, Result};

/// Column name that identifies a model when nothing else is configured.
pub const DEFAULT_IDENTIFIER: &str = "model_name";

/// One parsed record before validation: ordered `(column, cell)` pairs.
pub type RawRow = Vec<(String, String)>;

/// One climate model's values across every variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub model_id: String,
    values: HashMap<String, f64>,
}

impl Row {
    pub fn value(&self, variable: &str) -> Option<f64> {
        self.values.get(variable).copied()
    }
}

/// A validated, non-empty table of rows keyed by model id.
#[derive(Debug, Clone)]
pub struct Dataset {
    rows: Vec<Row>,
    variables: Vec<String>,
    identifier: String,
    index: HashMap<String, usize>,
}

impl Dataset {
    /// Validate raw rows into a dataset.
    ///
    /// The variable list is taken from the first row's column order minus
    /// `identifier`. Every other row must carry exactly the same columns and
    /// a unique identifier value.
    pub fn load(raw_rows: Vec<RawRow>, identifier: &str) -> Result<Self> {
        let first = raw_rows
            .first()
            .ok_or_else(|| ChartError::malformed("dataset has no rows"))?;

        let mut variables = Vec::with_capacity(first.len().saturating_sub(1));
        let mut has_identifier = false;
        for (column, _) in first {
            if column == identifier {
                has_identifier = true;
            } else if variables.contains(column) {
                return Err(ChartError::malformed(format!("duplicate column '{column}'")));
            } else {
                variables.push(column.clone());
            }
        }
        if !has_identifier {
            return Err(ChartError::malformed(format!(
                "missing identifier column '{identifier}'"
            )));
        }
        let expected: HashSet<&str> = variables.iter().map(String::as_str).collect();

        let mut rows = Vec::with_capacity(raw_rows.len());
        let mut index = HashMap::with_capacity(raw_rows.len());
        for (row_number, raw) in raw_rows.iter().enumerate() {
            let mut model_id = None;
            let mut values = HashMap::with_capacity(variables.len());
            for (column, cell) in raw {
                if column == identifier {
                    model_id = Some(cell.trim().to_string());
                } else if expected.contains(column.as_str()) {
                    values.insert(column.clone(), parse_value(cell));
                } else {
                    return Err(ChartError::malformed(format!(
                        "row {row_number} has unexpected column '{column}'"
                    )));
                }
            }

            if values.len() != variables.len() {
                return Err(ChartError::malformed(format!(
                    "row {row_number} has {} variables, expected {}",
                    values.len(),
                    variables.len()
                )));
            }
            let model_id = match model_id {
                Some(id) if !id.is_empty() => id,
                _ => {
                    return Err(ChartError::malformed(format!(
                        "row {row_number} has no '{identifier}' value"
                    )))
                }
            };
            if index.insert(model_id.clone(), rows.len()).is_some() {
                return Err(ChartError::malformed(format!("duplicate model '{model_id}'")));
            }
            rows.push(Row { model_id, values });
        }

        Ok(Self {
            rows,
            variables,
            identifier: identifier.to_string(),
            index,
        })
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Variable names in first-row column order, identifier excluded.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn row(&self, model_id: &str) -> Option<&Row> {
        self.index.get(model_id).map(|&i| &self.rows[i])
    }

    pub fn contains(&self, model_id: &str) -> bool {
        self.index.contains_key(model_id)
    }

    pub fn model_ids(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.model_id.as_str())
    }

    /// Model ids ordered case-insensitively, the order used by the grid and legend.
    pub fn sorted_model_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.model_ids().collect();
        ids.sort_by(|a, b| {
            a.to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b))
        });
        ids
    }

    /// Finite `(min, max)` of one variable, or `None` if it has no finite values.
    pub fn extent(&self, variable: &str) -> Option<(f64, f64)> {
        finite_extent(self.rows.iter().filter_map(|r| r.value(variable)))
    }

    /// Finite `(min, max)` across all variables.
    pub fn absolute_extent(&self) -> Option<(f64, f64)> {
        finite_extent(
            self.rows
                .iter()
                .flat_map(|r| self.variables.iter().filter_map(move |v| r.value(v))),
        )
    }
}

fn parse_value(cell: &str) -> f64 {
    cell.trim().parse::<f64>().unwrap_or(f64::NAN)
}

fn finite_extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values.filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_finite() && max.is_finite() {
        Some((min, max))
    } else {
        None
    }
}
