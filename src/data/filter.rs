use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::model::{CategoricalField, Dataset, Row};
use crate::error::InvalidSpecError;

// ---------------------------------------------------------------------------
// Filter specification
// ---------------------------------------------------------------------------

/// Inclusive age bounds, written `[min, max]` in a spec document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange(pub i64, pub i64);

impl AgeRange {
    pub fn min(self) -> i64 {
        self.0
    }

    pub fn max(self) -> i64 {
        self.1
    }

    pub fn contains(self, age: i64) -> bool {
        self.0 <= age && age <= self.1
    }
}

/// User-chosen inclusion constraints.
///
/// Every field in [`CategoricalField::FILTERABLE`] must have an entry in
/// `allowed`. An empty set is a valid selection that matches nothing; it is
/// never read as "no filter". Entries for other enum columns are honoured
/// as extra constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FilterSpec {
    pub age_range: AgeRange,
    pub allowed: BTreeMap<CategoricalField, BTreeSet<String>>,
}

impl FilterSpec {
    /// The "show everything" spec: every observed value of each filterable
    /// column and the observed age bounds.
    pub fn all_values(dataset: &Dataset) -> Self {
        let (min, max) = dataset.age_bounds.unwrap_or((0, 0));
        let allowed = CategoricalField::FILTERABLE
            .iter()
            .map(|field| {
                let values = dataset.unique_values.get(field).cloned().unwrap_or_default();
                (*field, values)
            })
            .collect();
        FilterSpec {
            age_range: AgeRange(min, max),
            allowed,
        }
    }

    /// Parse and validate a JSON spec document.
    pub fn from_json(text: &str) -> Result<Self, InvalidSpecError> {
        let spec: FilterSpec =
            serde_json::from_str(text).map_err(|e| InvalidSpecError::Malformed(e.to_string()))?;
        spec.validate()?;
        Ok(spec)
    }

    pub fn with_age_range(mut self, range: AgeRange) -> Self {
        self.age_range = range;
        self
    }

    pub fn validate(&self) -> Result<(), InvalidSpecError> {
        if self.age_range.min() > self.age_range.max() {
            return Err(InvalidSpecError::InvertedAgeRange {
                min: self.age_range.min(),
                max: self.age_range.max(),
            });
        }
        match CategoricalField::FILTERABLE
            .iter()
            .find(|f| !self.allowed.contains_key(*f))
        {
            Some(field) => Err(InvalidSpecError::MissingField(*field)),
            None => Ok(()),
        }
    }

    /// Whether a row passes every constraint (logical AND).
    pub fn matches(&self, row: &Row) -> bool {
        self.age_range.contains(row.age)
            && self
                .allowed
                .iter()
                .all(|(field, selected)| selected.contains(row.category(*field)))
    }

    /// Toggle a single value in a column's allowed-set.
    pub fn toggle(&mut self, field: CategoricalField, value: &str) {
        let selected = self.allowed.entry(field).or_default();
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
    }

    /// Select every observed value of a column.
    pub fn select_all(&mut self, field: CategoricalField, dataset: &Dataset) {
        let values = dataset.unique_values.get(&field).cloned().unwrap_or_default();
        self.allowed.insert(field, values);
    }

    /// Deselect everything in a column, which empties the view.
    pub fn select_none(&mut self, field: CategoricalField) {
        self.allowed.insert(field, BTreeSet::new());
    }
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// The rows of a dataset that pass a [`FilterSpec`], in source order.
///
/// Holds a shared handle to the dataset plus the indices of passing rows;
/// it is rebuilt wholesale for every new spec.
#[derive(Debug, Clone)]
pub struct FilteredView {
    dataset: Arc<Dataset>,
    indices: Vec<usize>,
}

impl FilteredView {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Positions of the passing rows within the dataset.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn rows(&self) -> impl Iterator<Item = &Row> + '_ {
        self.indices.iter().map(move |&i| &self.dataset.rows[i])
    }

    /// The first `n` passing rows, for display sampling.
    pub fn preview(&self, n: usize) -> Vec<&Row> {
        self.rows().take(n).collect()
    }
}

/// Evaluate `spec` against every row in a single pass.
///
/// The spec is validated first; on error nothing is computed.
pub fn apply_filter(
    dataset: &Arc<Dataset>,
    spec: &FilterSpec,
) -> Result<FilteredView, InvalidSpecError> {
    spec.validate()?;

    let indices = dataset
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| spec.matches(row))
        .map(|(i, _)| i)
        .collect();

    Ok(FilteredView {
        dataset: Arc::clone(dataset),
        indices,
    })
}
