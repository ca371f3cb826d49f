//! Filter and aggregation engine behind a retail shopping-trends dashboard.
//!
//! A [`Dataset`](data::model::Dataset) is loaded once, a
//! [`FilterSpec`](data::filter::FilterSpec) selects a
//! [`FilteredView`](data::filter::FilteredView), and the
//! [`Catalog`](data::catalog::Catalog) of derived tables is rebuilt from that
//! view on every spec change. Rendering is left to whoever consumes the
//! tables.

pub mod config;
pub mod data;
pub mod error;
pub mod state;
