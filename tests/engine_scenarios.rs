use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use shopping_trends::data::aggregate::{
    compute_age_histogram, compute_frequency, compute_group_aggregate, compute_mean_by_bin, AgeBin,
    AggOp, DerivedTable,
};
use shopping_trends::data::catalog::{Catalog, CatalogOptions};
use shopping_trends::data::filter::{apply_filter, AgeRange, FilterSpec};
use shopping_trends::data::loader::load_file;
use shopping_trends::data::model::{CategoricalField, Dataset, NumericField};
use shopping_trends::error::{InvalidSpecError, LoadError};
use shopping_trends::state::DashboardState;

const HEADER: &str = "Customer ID,Age,Gender,Item Purchased,Category,Purchase Amount (USD),Location,Size,Color,Season,Review Rating,Subscription Status,Shipping Type,Discount Applied,Promo Code Used,Previous Purchases,Preferred Payment Method,Frequency of Purchases";

/// Per-process path so concurrent test runs do not share fixture files.
fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("{}_{name}", std::process::id()))
}

fn write_fixture(name: &str, lines: &[&str]) -> PathBuf {
    let path = temp_path(name);
    let mut text = String::from(HEADER);
    for line in lines {
        text.push('\n');
        text.push_str(line);
    }
    text.push('\n');
    fs::write(&path, text).unwrap();
    path
}

fn three_rows(name: &str) -> Arc<Dataset> {
    let path = write_fixture(
        name,
        &[
            "1,20,M,Blouse,Clothing,10,Maine,L,Gray,Winter,3.1,Yes,Express,Yes,Yes,14,Venmo,Weekly",
            "2,30,F,Sweater,Clothing,20,Maine,M,Gray,Winter,4.0,No,Standard,No,No,2,Cash,Weekly",
            "3,40,M,Jeans,Clothing,30,Ohio,S,Blue,Spring,5.0,No,Standard,No,No,23,Cash,Monthly",
        ],
    );
    let dataset = load_file(&path).expect("fixture loads");
    let _ = fs::remove_file(&path);
    Arc::new(dataset)
}

#[test]
fn test_scenario_sum_by_gender() {
    let dataset = three_rows("shopping_trends_scenario.csv");
    assert_eq!(dataset.len(), 3);

    let mut spec = FilterSpec::all_values(&dataset).with_age_range(AgeRange(18, 35));
    spec.allowed.insert(
        CategoricalField::Gender,
        ["M".to_string(), "F".to_string()].into(),
    );
    let view = apply_filter(&dataset, &spec).unwrap();
    let ages: Vec<i64> = view.rows().map(|r| r.age).collect();
    assert_eq!(ages, vec![20, 30]);

    let sums = compute_group_aggregate(
        &view,
        &[CategoricalField::Gender.into()],
        NumericField::PurchaseAmount,
        AggOp::Sum,
    );
    assert_eq!(sums.groups.len(), 2);
    assert_eq!(sums.get(&["M"]), Some(10.0));
    assert_eq!(sums.get(&["F"]), Some(20.0));
}

#[test]
fn test_empty_selection_empties_every_table() {
    let dataset = three_rows("shopping_trends_empty_selection.csv");
    let mut spec = FilterSpec::all_values(&dataset);
    spec.select_none(CategoricalField::Season);

    let view = apply_filter(&dataset, &spec).unwrap();
    assert_eq!(view.len(), 0);
    assert!(compute_frequency(&view, CategoricalField::Location).is_empty());
    assert!(compute_age_histogram(&view).counts.is_empty());
    assert!(compute_mean_by_bin(&view, NumericField::PurchaseAmount)
        .means
        .is_empty());

    let catalog = Catalog::compute(&view, &CatalogOptions::default());
    assert_eq!(catalog.row_count, 0);
    assert!(catalog.tables.iter().all(|t| t.table.is_empty()));
}

#[test]
fn test_age_histogram_edges() {
    let path = write_fixture(
        "shopping_trends_edges.csv",
        &[
            "1,18,M,Blouse,Clothing,10,Maine,L,Gray,Winter,3.1,Yes,Express,Yes,Yes,14,Venmo,Weekly",
            "2,19,F,Blouse,Clothing,20,Maine,L,Gray,Winter,3.1,Yes,Express,Yes,Yes,14,Venmo,Weekly",
            "3,100,M,Blouse,Clothing,30,Maine,L,Gray,Winter,3.1,Yes,Express,Yes,Yes,14,Venmo,Weekly",
            "4,150,F,Blouse,Clothing,40,Maine,L,Gray,Winter,3.1,Yes,Express,Yes,Yes,14,Venmo,Weekly",
        ],
    );
    let dataset = Arc::new(load_file(&path).unwrap());
    let _ = fs::remove_file(&path);

    let spec = FilterSpec::all_values(&dataset);
    let view = apply_filter(&dataset, &spec).unwrap();
    let hist = compute_age_histogram(&view);
    assert_eq!(hist.counts.get(&AgeBin::UpTo18), Some(&1));
    assert_eq!(hist.counts.get(&AgeBin::From18To25), Some(&1));
    assert_eq!(hist.counts.get(&AgeBin::From65To100), Some(&1));
    assert_eq!(hist.out_of_range, 1);

    let means = compute_mean_by_bin(&view, NumericField::PurchaseAmount);
    assert_eq!(means.means.get(&AgeBin::From65To100), Some(&30.0));
    assert_eq!(means.means.len(), 3);
}

#[test]
fn test_dashboard_rejects_bad_spec_and_keeps_view() {
    let dataset = three_rows("shopping_trends_dashboard.csv");
    let mut state = DashboardState::with_all_values(dataset, CatalogOptions::default()).unwrap();
    state
        .toggle_filter_value(CategoricalField::Season, "Spring")
        .unwrap();
    assert_eq!(state.view().len(), 2);

    let mut bad = state.spec().clone();
    bad.allowed.remove(&CategoricalField::PreferredPaymentMethod);
    let err = state.apply(bad).unwrap_err();
    assert_eq!(
        err,
        InvalidSpecError::MissingField(CategoricalField::PreferredPaymentMethod)
    );
    assert_eq!(state.view().len(), 2);

    match &state.catalog().get("gender_distribution").unwrap().table {
        DerivedTable::Frequency(t) => {
            assert_eq!(t.get("M"), Some(1));
            assert_eq!(t.get("F"), Some(1));
        }
        other => panic!("expected frequency table, got {other:?}"),
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let path = temp_path("shopping_trends_does_not_exist.csv");
    let err = load_file(&path).unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }), "{err}");
}

#[test]
fn test_missing_required_column() {
    let path = temp_path("shopping_trends_missing_column.csv");
    fs::write(&path, "Age,Gender,Category\n20,M,Clothing\n").unwrap();
    let err = load_file(&path).unwrap_err();
    let _ = fs::remove_file(&path);
    assert!(matches!(err, LoadError::MissingColumn(_)), "{err}");
}
