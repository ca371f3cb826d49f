//! The fixed set of tables the dashboard renders, rebuilt from scratch for
//! every filtered view.

use serde::Serialize;

use super::aggregate::{
    compute_age_histogram, compute_frequency, compute_group_aggregate, compute_mean_by_bin,
    compute_numeric_histogram, compute_pairs, AggOp, DerivedTable,
};
use super::filter::FilteredView;
use super::model::Field::{self, Categorical, Numeric};
use super::model::{CategoricalField as C, NumericField as N};

/// How a catalogue entry is derived from the view.
#[derive(Debug, Clone, Copy)]
enum Recipe {
    Frequency(Field),
    Grouped(&'static [Field], N, AggOp),
    AgeHistogram,
    MeanByAge(N),
    Histogram(N),
    Points(N, N),
}

struct TableDef {
    name: &'static str,
    title: &'static str,
    recipe: Recipe,
}

const CATALOG: &[TableDef] = &[
    TableDef {
        name: "gender_distribution",
        title: "Gender Distribution",
        recipe: Recipe::Frequency(Categorical(C::Gender)),
    },
    TableDef {
        name: "purchase_by_age_gender",
        title: "Purchase Amount (USD) by Age and Gender",
        recipe: Recipe::Grouped(&[Numeric(N::Age), Categorical(C::Gender)], N::PurchaseAmount, AggOp::Sum),
    },
    TableDef {
        name: "purchase_by_category",
        title: "Purchase Amount (USD) by Category",
        recipe: Recipe::Grouped(&[Categorical(C::Category)], N::PurchaseAmount, AggOp::Sum),
    },
    TableDef {
        name: "purchase_over_age",
        title: "Purchase Amount (USD) over Age",
        recipe: Recipe::Grouped(&[Numeric(N::Age)], N::PurchaseAmount, AggOp::Sum),
    },
    TableDef {
        name: "purchase_by_category_gender",
        title: "Purchase Amount by Gender and Category",
        recipe: Recipe::Grouped(
            &[Categorical(C::Category), Categorical(C::Gender)],
            N::PurchaseAmount,
            AggOp::Sum,
        ),
    },
    TableDef {
        name: "purchase_frequency",
        title: "Frequency of Purchases",
        recipe: Recipe::Frequency(Categorical(C::FrequencyOfPurchases)),
    },
    TableDef {
        name: "payment_method_distribution",
        title: "Preferred Payment Method Distribution",
        recipe: Recipe::Frequency(Categorical(C::PreferredPaymentMethod)),
    },
    TableDef {
        name: "payment_method_by_frequency",
        title: "Preferred Payment Method by Purchase Frequency",
        recipe: Recipe::Grouped(
            &[Categorical(C::PreferredPaymentMethod), Categorical(C::FrequencyOfPurchases)],
            N::PurchaseAmount,
            AggOp::Count,
        ),
    },
    TableDef {
        name: "item_distribution",
        title: "Item Purchased Distribution",
        recipe: Recipe::Frequency(Categorical(C::ItemPurchased)),
    },
    TableDef {
        name: "discount_distribution",
        title: "Discount Applied Distribution",
        recipe: Recipe::Frequency(Categorical(C::DiscountApplied)),
    },
    TableDef {
        name: "promo_code_distribution",
        title: "Promo Code Used Distribution",
        recipe: Recipe::Frequency(Categorical(C::PromoCodeUsed)),
    },
    TableDef {
        name: "location_distribution",
        title: "Location Distribution",
        recipe: Recipe::Frequency(Categorical(C::Location)),
    },
    TableDef {
        name: "purchase_by_location",
        title: "Total Purchase Amount by Location",
        recipe: Recipe::Grouped(&[Categorical(C::Location)], N::PurchaseAmount, AggOp::Sum),
    },
    TableDef {
        name: "color_distribution",
        title: "Color Distribution",
        recipe: Recipe::Grouped(
            &[Categorical(C::Category), Categorical(C::Color)],
            N::PurchaseAmount,
            AggOp::Count,
        ),
    },
    TableDef {
        name: "size_distribution",
        title: "Size Distribution",
        recipe: Recipe::Frequency(Categorical(C::Size)),
    },
    TableDef {
        name: "shipping_type_distribution",
        title: "Shipping Type Distribution",
        recipe: Recipe::Frequency(Categorical(C::ShippingType)),
    },
    TableDef {
        name: "purchase_by_season",
        title: "Purchase Amount by Season",
        recipe: Recipe::Grouped(&[Categorical(C::Season)], N::PurchaseAmount, AggOp::Sum),
    },
    TableDef {
        name: "review_rating_counts",
        title: "Top Counts of Review Rating",
        recipe: Recipe::Frequency(Numeric(N::ReviewRating)),
    },
    TableDef {
        name: "review_rating_vs_purchase",
        title: "Review Rating vs Purchase Amount",
        recipe: Recipe::Points(N::ReviewRating, N::PurchaseAmount),
    },
    TableDef {
        name: "previous_purchases_distribution",
        title: "Previous Purchases Distribution",
        recipe: Recipe::Histogram(N::PreviousPurchases),
    },
    TableDef {
        name: "subscription_vs_discount",
        title: "Subscription Status vs Discount Applied",
        recipe: Recipe::Grouped(
            &[Categorical(C::SubscriptionStatus), Categorical(C::DiscountApplied)],
            N::PurchaseAmount,
            AggOp::Count,
        ),
    },
    TableDef {
        name: "category_vs_subscription",
        title: "Category vs Subscription Status",
        recipe: Recipe::Grouped(
            &[Categorical(C::Category), Categorical(C::SubscriptionStatus)],
            N::PurchaseAmount,
            AggOp::Count,
        ),
    },
    TableDef {
        name: "age_group_distribution",
        title: "Age Group Distribution",
        recipe: Recipe::AgeHistogram,
    },
    TableDef {
        name: "avg_purchase_by_age_group",
        title: "Average Purchase Amount by Age Group",
        recipe: Recipe::MeanByAge(N::PurchaseAmount),
    },
];

/// Knobs for the catalogue that are not fixed by the dashboard layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogOptions {
    /// Bin count for equal-width numeric histograms.
    pub histogram_bins: usize,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self { histogram_bins: 20 }
    }
}

impl Recipe {
    fn compute(self, view: &FilteredView, options: &CatalogOptions) -> DerivedTable {
        match self {
            Recipe::Frequency(field) => DerivedTable::Frequency(compute_frequency(view, field)),
            Recipe::Grouped(fields, value, op) => {
                DerivedTable::Grouped(compute_group_aggregate(view, fields, value, op))
            }
            Recipe::AgeHistogram => DerivedTable::AgeHistogram(compute_age_histogram(view)),
            Recipe::MeanByAge(value) => DerivedTable::BinnedMean(compute_mean_by_bin(view, value)),
            Recipe::Histogram(field) => DerivedTable::Histogram(compute_numeric_histogram(
                view,
                field,
                options.histogram_bins,
            )),
            Recipe::Points(x, y) => DerivedTable::Points(compute_pairs(view, x, y)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedTable {
    pub name: &'static str,
    pub title: &'static str,
    pub table: DerivedTable,
}

/// Every derived table for one view, plus the view's row count.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub row_count: usize,
    pub tables: Vec<NamedTable>,
}

impl Catalog {
    pub fn compute(view: &FilteredView, options: &CatalogOptions) -> Self {
        let tables: Vec<NamedTable> = CATALOG
            .iter()
            .map(|def| NamedTable {
                name: def.name,
                title: def.title,
                table: def.recipe.compute(view, options),
            })
            .collect();
        log::debug!(
            "Recomputed {} tables over {} of {} rows",
            tables.len(),
            view.len(),
            view.dataset().len()
        );
        Catalog {
            row_count: view.len(),
            tables,
        }
    }

    /// Names of every catalogue entry, in display order.
    pub fn names() -> impl Iterator<Item = &'static str> {
        CATALOG.iter().map(|def| def.name)
    }

    pub fn get(&self, name: &str) -> Option<&NamedTable> {
        self.tables.iter().find(|t| t.name == name)
    }
}
