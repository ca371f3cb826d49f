use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use shopping_trends::data::catalog::{Catalog, CatalogOptions};
use shopping_trends::data::filter::{apply_filter, AgeRange, FilterSpec};
use shopping_trends::data::model::{CategoricalField, Dataset, Row};

const GENDERS: [&str; 2] = ["Male", "Female"];
const SEASONS: [&str; 4] = ["Winter", "Spring", "Summer", "Fall"];
const CATEGORIES: [&str; 4] = ["Clothing", "Footwear", "Accessories", "Outerwear"];
const SIZES: [&str; 4] = ["S", "M", "L", "XL"];

fn synthetic(n: usize) -> Dataset {
    let rows = (0..n)
        .map(|i| Row {
            age: 18 + (i % 53) as i64,
            gender: GENDERS[i % 2].to_string(),
            item_purchased: format!("Item {}", i % 25),
            category: CATEGORIES[i % 4].to_string(),
            purchase_amount: 20.0 + (i % 81) as f64,
            location: format!("State {}", i % 50),
            size: SIZES[(i / 3) % 4].to_string(),
            color: format!("Color {}", i % 25),
            season: SEASONS[(i / 7) % 4].to_string(),
            review_rating: 2.5 + (i % 26) as f64 / 10.0,
            subscription_status: if i % 4 == 0 { "Yes" } else { "No" }.to_string(),
            shipping_type: format!("Shipping {}", i % 6),
            discount_applied: if i % 3 == 0 { "Yes" } else { "No" }.to_string(),
            promo_code_used: if i % 3 == 0 { "Yes" } else { "No" }.to_string(),
            previous_purchases: 1 + (i % 50) as i64,
            preferred_payment_method: format!("Method {}", i % 6),
            frequency_of_purchases: format!("Frequency {}", i % 7),
        })
        .collect();
    Dataset::from_rows(rows)
}

fn bench_engine(c: &mut Criterion) {
    let dataset = Arc::new(synthetic(50_000));
    let mut spec = FilterSpec::all_values(&dataset).with_age_range(AgeRange(18, 60));
    spec.toggle(CategoricalField::Season, "Summer");
    let options = CatalogOptions::default();

    c.bench_function("apply_filter_50k", |b| {
        b.iter(|| apply_filter(black_box(&dataset), black_box(&spec)))
    });

    let view = apply_filter(&dataset, &spec).expect("valid spec");
    c.bench_function("catalog_50k", |b| {
        b.iter(|| Catalog::compute(black_box(&view), &options))
    });
}

criterion_group!(benches, bench_engine);
criterion_main!(benches);
