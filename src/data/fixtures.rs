//! Hand-built rows shared by the unit tests.

use super::model::Row;

pub(crate) fn row(age: i64, gender: &str, amount: f64) -> Row {
    Row {
        age,
        gender: gender.to_string(),
        item_purchased: "Blouse".to_string(),
        category: "Clothing".to_string(),
        purchase_amount: amount,
        location: "Kentucky".to_string(),
        size: "L".to_string(),
        color: "Gray".to_string(),
        season: "Winter".to_string(),
        review_rating: 3.1,
        subscription_status: "Yes".to_string(),
        shipping_type: "Express".to_string(),
        discount_applied: "Yes".to_string(),
        promo_code_used: "Yes".to_string(),
        previous_purchases: 14,
        preferred_payment_method: "Venmo".to_string(),
        frequency_of_purchases: "Fortnightly".to_string(),
    }
}

/// A small mixed fixture: every filterable column takes at least two values,
/// and one age falls outside the age bands.
pub(crate) fn mixed_rows() -> Vec<Row> {
    type Line<'a> = (i64, &'a str, f64, &'a str, &'a str, &'a str, &'a str, &'a str, &'a str);
    let table: [Line; 8] = [
        (18, "Male", 53.0, "Clothing", "Winter", "L", "Kentucky", "Yes", "Venmo"),
        (19, "Female", 64.0, "Footwear", "Winter", "M", "Maine", "No", "Cash"),
        (25, "Male", 73.0, "Clothing", "Spring", "S", "Ohio", "Yes", "PayPal"),
        (45, "Female", 90.0, "Clothing", "Spring", "M", "Kentucky", "No", "Venmo"),
        (46, "Male", 49.0, "Footwear", "Winter", "L", "Maine", "Yes", "Cash"),
        (65, "Female", 20.0, "Footwear", "Spring", "L", "Ohio", "No", "PayPal"),
        (100, "Male", 85.0, "Clothing", "Winter", "M", "Kentucky", "Yes", "Cash"),
        (150, "Female", 34.0, "Clothing", "Spring", "S", "Maine", "No", "Venmo"),
    ];
    table
        .iter()
        .map(
            |&(age, gender, amount, category, season, size, location, subscription, payment)| {
                let mut r = row(age, gender, amount);
                r.category = category.to_string();
                r.season = season.to_string();
                r.size = size.to_string();
                r.location = location.to_string();
                r.subscription_status = subscription.to_string();
                r.preferred_payment_method = payment.to_string();
                r
            },
        )
        .collect()
}
