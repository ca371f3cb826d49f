//! Derived tables computed from a [`FilteredView`].
//!
//! Every function here is a pure pass over the view. Groups, bins and keys
//! that receive no rows are left out of the output, so an empty view always
//! produces empty tables and no table ever carries the mean of an empty set.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use super::filter::FilteredView;
use super::model::{Field, NumericField};

// ---------------------------------------------------------------------------
// Table types
// ---------------------------------------------------------------------------

/// Group key: one value per grouping column, rendered as text.
pub type GroupKey = Vec<String>;

/// Summary computed per group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggOp {
    Sum,
    Mean,
    Count,
}

/// Occurrences of each distinct value of one column. Key order carries no
/// meaning for consumers.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FrequencyTable {
    pub field: String,
    pub counts: BTreeMap<String, u64>,
}

impl FrequencyTable {
    pub fn get(&self, value: &str) -> Option<u64> {
        self.counts.get(value).copied()
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedTable {
    pub group_fields: Vec<String>,
    pub value_field: String,
    pub op: AggOp,
    #[serde(serialize_with = "serialize_groups")]
    pub groups: BTreeMap<GroupKey, f64>,
}

impl GroupedTable {
    pub fn get(&self, key: &[&str]) -> Option<f64> {
        let key: GroupKey = key.iter().map(|k| k.to_string()).collect();
        self.groups.get(&key).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// JSON objects cannot use arrays as keys, so groups go out as a list.
fn serialize_groups<S>(groups: &BTreeMap<GroupKey, f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    #[derive(Serialize)]
    struct Entry<'a> {
        key: &'a [String],
        value: f64,
    }
    serializer.collect_seq(groups.iter().map(|(key, &value)| Entry { key, value }))
}

/// Fixed age bands. `0-18` is closed on both ends; every later band is
/// left-exclusive, right-inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AgeBin {
    #[serde(rename = "0-18")]
    UpTo18,
    #[serde(rename = "18-25")]
    From18To25,
    #[serde(rename = "25-35")]
    From25To35,
    #[serde(rename = "35-45")]
    From35To45,
    #[serde(rename = "45-55")]
    From45To55,
    #[serde(rename = "55-65")]
    From55To65,
    #[serde(rename = "65-100")]
    From65To100,
}

impl AgeBin {
    pub const ALL: [AgeBin; 7] = [
        AgeBin::UpTo18,
        AgeBin::From18To25,
        AgeBin::From25To35,
        AgeBin::From35To45,
        AgeBin::From45To55,
        AgeBin::From55To65,
        AgeBin::From65To100,
    ];

    /// `(lower, upper)` edges of the band.
    pub fn edges(self) -> (i64, i64) {
        match self {
            AgeBin::UpTo18 => (0, 18),
            AgeBin::From18To25 => (18, 25),
            AgeBin::From25To35 => (25, 35),
            AgeBin::From35To45 => (35, 45),
            AgeBin::From45To55 => (45, 55),
            AgeBin::From55To65 => (55, 65),
            AgeBin::From65To100 => (65, 100),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeBin::UpTo18 => "0-18",
            AgeBin::From18To25 => "18-25",
            AgeBin::From25To35 => "25-35",
            AgeBin::From35To45 => "35-45",
            AgeBin::From45To55 => "45-55",
            AgeBin::From55To65 => "55-65",
            AgeBin::From65To100 => "65-100",
        }
    }

    /// The band holding `age`, or `None` outside `[0, 100]`.
    pub fn for_age(age: i64) -> Option<AgeBin> {
        AgeBin::ALL.into_iter().find(|bin| {
            let (lower, upper) = bin.edges();
            let above_lower = match bin {
                AgeBin::UpTo18 => age >= lower,
                _ => age > lower,
            };
            above_lower && age <= upper
        })
    }
}

impl fmt::Display for AgeBin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeHistogram {
    pub counts: BTreeMap<AgeBin, u64>,
    /// Rows whose age falls outside every band.
    pub out_of_range: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BinnedMean {
    pub value_field: String,
    pub means: BTreeMap<AgeBin, f64>,
    pub out_of_range: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericBin {
    pub lower: f64,
    pub upper: f64,
    pub count: u64,
}

/// Equal-width histogram over the observed range of a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericHistogram {
    pub field: String,
    pub bins: Vec<NumericBin>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointSeries {
    pub x_field: String,
    pub y_field: String,
    pub points: Vec<[f64; 2]>,
}

/// Any mapping-shaped output handed to the rendering side.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DerivedTable {
    Frequency(FrequencyTable),
    Grouped(GroupedTable),
    AgeHistogram(AgeHistogram),
    BinnedMean(BinnedMean),
    Histogram(NumericHistogram),
    Points(PointSeries),
}

impl DerivedTable {
    /// Whether the table holds no entries at all.
    pub fn is_empty(&self) -> bool {
        match self {
            DerivedTable::Frequency(t) => t.counts.is_empty(),
            DerivedTable::Grouped(t) => t.groups.is_empty(),
            DerivedTable::AgeHistogram(t) => t.counts.is_empty() && t.out_of_range == 0,
            DerivedTable::BinnedMean(t) => t.means.is_empty() && t.out_of_range == 0,
            DerivedTable::Histogram(t) => t.bins.is_empty(),
            DerivedTable::Points(t) => t.points.is_empty(),
        }
    }
}

// ---------------------------------------------------------------------------
// Accumulation
// ---------------------------------------------------------------------------

/// Running sum and count for one group.
#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    sum: f64,
    count: u64,
}

impl Accumulator {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    /// `None` for a group that never received a row.
    fn finish(self, op: AggOp) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        Some(match op {
            AggOp::Sum => self.sum,
            AggOp::Mean => self.sum / self.count as f64,
            AggOp::Count => self.count as f64,
        })
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Count occurrences of each distinct value of `field`.
pub fn compute_frequency(view: &FilteredView, field: impl Into<Field>) -> FrequencyTable {
    let field = field.into();
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for row in view.rows() {
        *counts.entry(row.key(field)).or_default() += 1;
    }
    FrequencyTable {
        field: field.header().to_string(),
        counts,
    }
}

/// Group rows by the tuple of `group_fields` and summarise `value_field`
/// per group. With no group fields the whole view forms one group keyed by
/// the empty tuple.
pub fn compute_group_aggregate(
    view: &FilteredView,
    group_fields: &[Field],
    value_field: NumericField,
    op: AggOp,
) -> GroupedTable {
    let mut accumulators: BTreeMap<GroupKey, Accumulator> = BTreeMap::new();
    for row in view.rows() {
        let key: GroupKey = group_fields.iter().map(|f| row.key(*f)).collect();
        accumulators
            .entry(key)
            .or_default()
            .add(row.numeric(value_field));
    }

    let groups = accumulators
        .into_iter()
        .filter_map(|(key, acc)| acc.finish(op).map(|v| (key, v)))
        .collect();

    GroupedTable {
        group_fields: group_fields.iter().map(|f| f.header().to_string()).collect(),
        value_field: value_field.header().to_string(),
        op,
        groups,
    }
}

/// Count rows per age band. Rows outside `[0, 100]` are tallied in
/// `out_of_range`, never dropped silently.
pub fn compute_age_histogram(view: &FilteredView) -> AgeHistogram {
    let mut histogram = AgeHistogram::default();
    for row in view.rows() {
        match AgeBin::for_age(row.age) {
            Some(bin) => *histogram.counts.entry(bin).or_default() += 1,
            None => histogram.out_of_range += 1,
        }
    }
    histogram
}

/// Mean of `value_field` per age band. Bands without rows are omitted.
pub fn compute_mean_by_bin(view: &FilteredView, value_field: NumericField) -> BinnedMean {
    let mut accumulators: BTreeMap<AgeBin, Accumulator> = BTreeMap::new();
    let mut out_of_range = 0;
    for row in view.rows() {
        match AgeBin::for_age(row.age) {
            Some(bin) => accumulators
                .entry(bin)
                .or_default()
                .add(row.numeric(value_field)),
            None => out_of_range += 1,
        }
    }

    let means = accumulators
        .into_iter()
        .filter_map(|(bin, acc)| acc.finish(AggOp::Mean).map(|m| (bin, m)))
        .collect();

    BinnedMean {
        value_field: value_field.header().to_string(),
        means,
        out_of_range,
    }
}

/// Upper bound on the bin count of a numeric histogram.
pub const MAX_HISTOGRAM_BINS: usize = 1_000;

/// Split the observed range of `field` into `bins` equal-width bins; the last
/// bin is closed. A constant column collapses to a single bin. `bins` is
/// clamped to `1..=MAX_HISTOGRAM_BINS`.
pub fn compute_numeric_histogram(
    view: &FilteredView,
    field: NumericField,
    bins: usize,
) -> NumericHistogram {
    let values: Vec<f64> = view.rows().map(|r| r.numeric(field)).collect();
    let name = field.header().to_string();

    let Some((min, max)) = values.iter().fold(None, |acc: Option<(f64, f64)>, &v| {
        Some(match acc {
            Some((lo, hi)) => (lo.min(v), hi.max(v)),
            None => (v, v),
        })
    }) else {
        return NumericHistogram {
            field: name,
            bins: Vec::new(),
        };
    };

    if max == min {
        return NumericHistogram {
            field: name,
            bins: vec![NumericBin {
                lower: min,
                upper: max,
                count: values.len() as u64,
            }],
        };
    }

    let n = bins.clamp(1, MAX_HISTOGRAM_BINS);
    let width = (max - min) / n as f64;
    let mut counts = vec![0u64; n];
    for v in &values {
        let idx = (((v - min) / width).floor() as usize).min(n - 1);
        counts[idx] += 1;
    }

    let bins = counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| NumericBin {
            lower: min + width * i as f64,
            upper: if i + 1 == n { max } else { min + width * (i + 1) as f64 },
            count,
        })
        .collect();

    NumericHistogram { field: name, bins }
}

/// The `(x, y)` pairs of two numeric columns, in view order.
pub fn compute_pairs(view: &FilteredView, x: NumericField, y: NumericField) -> PointSeries {
    PointSeries {
        x_field: x.header().to_string(),
        y_field: y.header().to_string(),
        points: view.rows().map(|r| [r.numeric(x), r.numeric(y)]).collect(),
    }
}
