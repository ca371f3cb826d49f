use std::sync::Arc;

use crate::data::catalog::{Catalog, CatalogOptions};
use crate::data::filter::{apply_filter, AgeRange, FilterSpec, FilteredView};
use crate::data::model::{CategoricalField, Dataset};
use crate::error::InvalidSpecError;

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// The engine state behind one dashboard, independent of rendering.
///
/// Holds the last valid spec together with the view and catalogue derived
/// from it. Every change recomputes both wholesale; a rejected spec leaves
/// all three untouched. Callers submitting changes from several places must
/// serialize them themselves.
#[derive(Debug, Clone)]
pub struct DashboardState {
    dataset: Arc<Dataset>,
    spec: FilterSpec,
    view: FilteredView,
    catalog: Catalog,
    options: CatalogOptions,
}

impl DashboardState {
    /// Ingest a loaded dataset with an initial spec.
    pub fn new(
        dataset: Arc<Dataset>,
        spec: FilterSpec,
        options: CatalogOptions,
    ) -> Result<Self, InvalidSpecError> {
        let view = apply_filter(&dataset, &spec)?;
        let catalog = Catalog::compute(&view, &options);
        Ok(Self {
            dataset,
            spec,
            view,
            catalog,
            options,
        })
    }

    /// Start from the "show everything" spec.
    pub fn with_all_values(
        dataset: Arc<Dataset>,
        options: CatalogOptions,
    ) -> Result<Self, InvalidSpecError> {
        let spec = FilterSpec::all_values(&dataset);
        Self::new(dataset, spec, options)
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn spec(&self) -> &FilterSpec {
        &self.spec
    }

    pub fn view(&self) -> &FilteredView {
        &self.view
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Replace the spec and recompute everything from it.
    pub fn apply(&mut self, spec: FilterSpec) -> Result<&Catalog, InvalidSpecError> {
        let view = apply_filter(&self.dataset, &spec).inspect_err(|e| {
            log::warn!("Rejected filter spec: {e}");
        })?;
        self.catalog = Catalog::compute(&view, &self.options);
        self.view = view;
        self.spec = spec;
        Ok(&self.catalog)
    }

    /// Toggle a single value in a column's allowed-set.
    pub fn toggle_filter_value(
        &mut self,
        field: CategoricalField,
        value: &str,
    ) -> Result<&Catalog, InvalidSpecError> {
        let mut spec = self.spec.clone();
        spec.toggle(field, value);
        self.apply(spec)
    }

    /// Select all values in a column.
    pub fn select_all(&mut self, field: CategoricalField) -> Result<&Catalog, InvalidSpecError> {
        let mut spec = self.spec.clone();
        spec.select_all(field, &self.dataset);
        self.apply(spec)
    }

    /// Deselect all values in a column.
    pub fn select_none(&mut self, field: CategoricalField) -> Result<&Catalog, InvalidSpecError> {
        let mut spec = self.spec.clone();
        spec.select_none(field);
        self.apply(spec)
    }

    pub fn set_age_range(&mut self, range: AgeRange) -> Result<&Catalog, InvalidSpecError> {
        let spec = self.spec.clone().with_age_range(range);
        self.apply(spec)
    }
}
