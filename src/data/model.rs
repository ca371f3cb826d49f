use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Field catalogue – the fixed columns of a transaction record
// ---------------------------------------------------------------------------

/// Semantic type a column is parsed as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Decimal,
    /// Free-text value matched by exact, case-sensitive equality.
    Enum,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Integer => f.pad("int"),
            FieldKind::Decimal => f.pad("decimal"),
            FieldKind::Enum => f.pad("enum"),
        }
    }
}

/// Enum-typed columns. Serialized with their camelCase names, which is how a
/// filter specification refers to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CategoricalField {
    Gender,
    Location,
    Category,
    SubscriptionStatus,
    Season,
    PreferredPaymentMethod,
    Size,
    Color,
    ItemPurchased,
    FrequencyOfPurchases,
    DiscountApplied,
    PromoCodeUsed,
    ShippingType,
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 13] = [
        CategoricalField::Gender,
        CategoricalField::Location,
        CategoricalField::Category,
        CategoricalField::SubscriptionStatus,
        CategoricalField::Season,
        CategoricalField::PreferredPaymentMethod,
        CategoricalField::Size,
        CategoricalField::Color,
        CategoricalField::ItemPurchased,
        CategoricalField::FrequencyOfPurchases,
        CategoricalField::DiscountApplied,
        CategoricalField::PromoCodeUsed,
        CategoricalField::ShippingType,
    ];

    /// Fields every filter specification must carry an allowed-set for.
    pub const FILTERABLE: [CategoricalField; 7] = [
        CategoricalField::Gender,
        CategoricalField::Location,
        CategoricalField::Category,
        CategoricalField::SubscriptionStatus,
        CategoricalField::Season,
        CategoricalField::PreferredPaymentMethod,
        CategoricalField::Size,
    ];

    /// Column name in the source header row.
    pub fn header(self) -> &'static str {
        match self {
            CategoricalField::Gender => "Gender",
            CategoricalField::Location => "Location",
            CategoricalField::Category => "Category",
            CategoricalField::SubscriptionStatus => "Subscription Status",
            CategoricalField::Season => "Season",
            CategoricalField::PreferredPaymentMethod => "Preferred Payment Method",
            CategoricalField::Size => "Size",
            CategoricalField::Color => "Color",
            CategoricalField::ItemPurchased => "Item Purchased",
            CategoricalField::FrequencyOfPurchases => "Frequency of Purchases",
            CategoricalField::DiscountApplied => "Discount Applied",
            CategoricalField::PromoCodeUsed => "Promo Code Used",
            CategoricalField::ShippingType => "Shipping Type",
        }
    }
}

impl fmt::Display for CategoricalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// Integer and decimal columns that can feed a numeric aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NumericField {
    Age,
    PurchaseAmount,
    ReviewRating,
    PreviousPurchases,
}

impl NumericField {
    pub const ALL: [NumericField; 4] = [
        NumericField::Age,
        NumericField::PurchaseAmount,
        NumericField::ReviewRating,
        NumericField::PreviousPurchases,
    ];

    pub fn header(self) -> &'static str {
        match self {
            NumericField::Age => "Age",
            NumericField::PurchaseAmount => "Purchase Amount (USD)",
            NumericField::ReviewRating => "Review Rating",
            NumericField::PreviousPurchases => "Previous Purchases",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            NumericField::Age | NumericField::PreviousPurchases => FieldKind::Integer,
            NumericField::PurchaseAmount | NumericField::ReviewRating => FieldKind::Decimal,
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// Any column of a [`Row`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Categorical(CategoricalField),
    Numeric(NumericField),
}

impl Field {
    /// Every required column, in the order of the source header.
    pub const ALL: [Field; 17] = [
        Field::Numeric(NumericField::Age),
        Field::Categorical(CategoricalField::Gender),
        Field::Categorical(CategoricalField::ItemPurchased),
        Field::Categorical(CategoricalField::Category),
        Field::Numeric(NumericField::PurchaseAmount),
        Field::Categorical(CategoricalField::Location),
        Field::Categorical(CategoricalField::Size),
        Field::Categorical(CategoricalField::Color),
        Field::Categorical(CategoricalField::Season),
        Field::Numeric(NumericField::ReviewRating),
        Field::Categorical(CategoricalField::SubscriptionStatus),
        Field::Categorical(CategoricalField::ShippingType),
        Field::Categorical(CategoricalField::DiscountApplied),
        Field::Categorical(CategoricalField::PromoCodeUsed),
        Field::Numeric(NumericField::PreviousPurchases),
        Field::Categorical(CategoricalField::PreferredPaymentMethod),
        Field::Categorical(CategoricalField::FrequencyOfPurchases),
    ];

    pub fn header(self) -> &'static str {
        match self {
            Field::Categorical(c) => c.header(),
            Field::Numeric(n) => n.header(),
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::Categorical(_) => FieldKind::Enum,
            Field::Numeric(n) => n.kind(),
        }
    }
}

impl From<CategoricalField> for Field {
    fn from(field: CategoricalField) -> Self {
        Field::Categorical(field)
    }
}

impl From<NumericField> for Field {
    fn from(field: NumericField) -> Self {
        Field::Numeric(field)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

// ---------------------------------------------------------------------------
// Cell – a single untyped value handed over by a columnar reader
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Integer(i64),
    Decimal(f64),
    Text(String),
}

impl Cell {
    fn into_integer(self, field: Field) -> Result<i64, String> {
        match self {
            Cell::Integer(i) => Ok(i),
            other => Err(format!("column '{field}': expected int, got {other:?}")),
        }
    }

    fn into_decimal(self, field: Field) -> Result<f64, String> {
        match self {
            Cell::Decimal(v) => Ok(v),
            Cell::Integer(i) => Ok(i as f64),
            other => Err(format!("column '{field}': expected decimal, got {other:?}")),
        }
    }

    fn into_text(self, field: Field) -> Result<String, String> {
        match self {
            Cell::Text(s) => Ok(s),
            other => Err(format!("column '{field}': expected text, got {other:?}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Row – one transaction record
// ---------------------------------------------------------------------------

/// A single transaction. Serde names match the source header row, so the
/// same struct reads CSV records and JSON objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    #[serde(rename = "Age")]
    pub age: i64,
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Item Purchased")]
    pub item_purchased: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Purchase Amount (USD)")]
    pub purchase_amount: f64,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Size")]
    pub size: String,
    #[serde(rename = "Color")]
    pub color: String,
    #[serde(rename = "Season")]
    pub season: String,
    #[serde(rename = "Review Rating")]
    pub review_rating: f64,
    #[serde(rename = "Subscription Status")]
    pub subscription_status: String,
    #[serde(rename = "Shipping Type")]
    pub shipping_type: String,
    #[serde(rename = "Discount Applied")]
    pub discount_applied: String,
    #[serde(rename = "Promo Code Used")]
    pub promo_code_used: String,
    #[serde(rename = "Previous Purchases")]
    pub previous_purchases: i64,
    #[serde(rename = "Preferred Payment Method")]
    pub preferred_payment_method: String,
    #[serde(rename = "Frequency of Purchases")]
    pub frequency_of_purchases: String,
}

impl Row {
    /// Value of an enum column.
    pub fn category(&self, field: CategoricalField) -> &str {
        match field {
            CategoricalField::Gender => &self.gender,
            CategoricalField::Location => &self.location,
            CategoricalField::Category => &self.category,
            CategoricalField::SubscriptionStatus => &self.subscription_status,
            CategoricalField::Season => &self.season,
            CategoricalField::PreferredPaymentMethod => &self.preferred_payment_method,
            CategoricalField::Size => &self.size,
            CategoricalField::Color => &self.color,
            CategoricalField::ItemPurchased => &self.item_purchased,
            CategoricalField::FrequencyOfPurchases => &self.frequency_of_purchases,
            CategoricalField::DiscountApplied => &self.discount_applied,
            CategoricalField::PromoCodeUsed => &self.promo_code_used,
            CategoricalField::ShippingType => &self.shipping_type,
        }
    }

    /// Value of a numeric column, widened to `f64`.
    pub fn numeric(&self, field: NumericField) -> f64 {
        match field {
            NumericField::Age => self.age as f64,
            NumericField::PurchaseAmount => self.purchase_amount,
            NumericField::ReviewRating => self.review_rating,
            NumericField::PreviousPurchases => self.previous_purchases as f64,
        }
    }

    /// Grouping key text for any column. Integers print without a fraction,
    /// decimals use the shortest round-trip form (`3.1`, `10`).
    pub fn key(&self, field: Field) -> String {
        match field {
            Field::Categorical(c) => self.category(c).to_string(),
            Field::Numeric(NumericField::Age) => self.age.to_string(),
            Field::Numeric(NumericField::PreviousPurchases) => self.previous_purchases.to_string(),
            Field::Numeric(n) => format!("{}", self.numeric(n)),
        }
    }

    /// Assemble a row from per-column cells, failing on the first cell whose
    /// type does not fit its column.
    pub fn from_cells<F>(mut cell: F) -> Result<Self, String>
    where
        F: FnMut(Field) -> Result<Cell, String>,
    {
        let mut int = |n: NumericField| cell(n.into()).and_then(|c| c.into_integer(n.into()));
        let age = int(NumericField::Age)?;
        let previous_purchases = int(NumericField::PreviousPurchases)?;

        let mut dec = |n: NumericField| cell(n.into()).and_then(|c| c.into_decimal(n.into()));
        let purchase_amount = dec(NumericField::PurchaseAmount)?;
        let review_rating = dec(NumericField::ReviewRating)?;

        let mut text = |c: CategoricalField| cell(c.into()).and_then(|v| v.into_text(c.into()));
        Ok(Row {
            age,
            gender: text(CategoricalField::Gender)?,
            item_purchased: text(CategoricalField::ItemPurchased)?,
            category: text(CategoricalField::Category)?,
            purchase_amount,
            location: text(CategoricalField::Location)?,
            size: text(CategoricalField::Size)?,
            color: text(CategoricalField::Color)?,
            season: text(CategoricalField::Season)?,
            review_rating,
            subscription_status: text(CategoricalField::SubscriptionStatus)?,
            shipping_type: text(CategoricalField::ShippingType)?,
            discount_applied: text(CategoricalField::DiscountApplied)?,
            promo_code_used: text(CategoricalField::PromoCodeUsed)?,
            previous_purchases,
            preferred_payment_method: text(CategoricalField::PreferredPaymentMethod)?,
            frequency_of_purchases: text(CategoricalField::FrequencyOfPurchases)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed column indices. Built once and
/// shared read-only for the rest of the run.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// All transactions, in source order.
    pub rows: Vec<Row>,
    /// For each enum column the sorted set of observed values.
    pub unique_values: BTreeMap<CategoricalField, BTreeSet<String>>,
    /// Smallest and largest observed age, `None` when empty.
    pub age_bounds: Option<(i64, i64)>,
}

impl Dataset {
    /// Build column indices from the loaded rows.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut unique_values: BTreeMap<CategoricalField, BTreeSet<String>> = BTreeMap::new();
        let mut age_bounds: Option<(i64, i64)> = None;

        for row in &rows {
            for field in CategoricalField::ALL {
                unique_values
                    .entry(field)
                    .or_default()
                    .insert(row.category(field).to_string());
            }
            age_bounds = Some(match age_bounds {
                Some((lo, hi)) => (lo.min(row.age), hi.max(row.age)),
                None => (row.age, row.age),
            });
        }

        Dataset {
            rows,
            unique_values,
            age_bounds,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::row;

    #[test]
    fn from_rows_collects_unique_values_and_age_bounds() {
        let ds = Dataset::from_rows(vec![row(40, "M", 10.0), row(20, "F", 20.0), row(30, "M", 5.0)]);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.age_bounds, Some((20, 40)));
        let genders: Vec<&str> = ds.unique_values[&CategoricalField::Gender]
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(genders, vec!["F", "M"]);
        assert_eq!(ds.unique_values.len(), CategoricalField::ALL.len());
    }

    #[test]
    fn empty_dataset_has_no_bounds() {
        let ds = Dataset::from_rows(Vec::new());
        assert!(ds.is_empty());
        assert_eq!(ds.age_bounds, None);
        assert!(ds.unique_values.is_empty());
    }

    #[test]
    fn keys_render_numbers_as_text() {
        let r = row(20, "M", 10.0);
        assert_eq!(r.key(NumericField::Age.into()), "20");
        assert_eq!(r.key(NumericField::ReviewRating.into()), "3.1");
        assert_eq!(r.key(NumericField::PurchaseAmount.into()), "10");
        assert_eq!(r.key(CategoricalField::Gender.into()), "M");
    }

    #[test]
    fn from_cells_rejects_mismatched_types() {
        let err = Row::from_cells(|field| match field.kind() {
            FieldKind::Integer => Ok(Cell::Text("x".into())),
            FieldKind::Decimal => Ok(Cell::Decimal(1.0)),
            FieldKind::Enum => Ok(Cell::Text("v".into())),
        })
        .unwrap_err();
        assert!(err.contains("Age"), "{err}");
    }

    #[test]
    fn from_cells_widens_integers_to_decimals() {
        let r = Row::from_cells(|field| match field.kind() {
            FieldKind::Integer | FieldKind::Decimal => Ok(Cell::Integer(7)),
            FieldKind::Enum => Ok(Cell::Text(field.header().to_string())),
        })
        .unwrap();
        assert_eq!(r.purchase_amount, 7.0);
        assert_eq!(r.gender, "Gender");
        assert_eq!(r.frequency_of_purchases, "Frequency of Purchases");
    }
}
