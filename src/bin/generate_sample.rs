use std::fs::File;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use parquet::arrow::ArrowWriter;

use shopping_trends::data::loader::rows_to_batch;
use shopping_trends::data::model::Row;

const GENDERS: [&str; 2] = ["Male", "Female"];
const LOCATIONS: [&str; 8] = [
    "Kentucky", "Maine", "Massachusetts", "Rhode Island", "Oregon", "Wyoming", "Montana",
    "Louisiana",
];
const SEASONS: [&str; 4] = ["Winter", "Spring", "Summer", "Fall"];
const SIZES: [&str; 4] = ["S", "M", "L", "XL"];
const COLORS: [&str; 6] = ["Gray", "Maroon", "Turquoise", "White", "Charcoal", "Silver"];
const PAYMENT_METHODS: [&str; 6] = [
    "Venmo", "Cash", "Credit Card", "PayPal", "Bank Transfer", "Debit Card",
];
const FREQUENCIES: [&str; 7] = [
    "Fortnightly", "Weekly", "Annually", "Quarterly", "Bi-Weekly", "Monthly",
    "Every 3 Months",
];
const SHIPPING_TYPES: [&str; 6] = [
    "Express", "Free Shipping", "Next Day Air", "Standard", "2-Day Shipping", "Store Pickup",
];
const ITEMS: [(&str, &str); 8] = [
    ("Blouse", "Clothing"),
    ("Sweater", "Clothing"),
    ("Jeans", "Clothing"),
    ("Sandals", "Footwear"),
    ("Sneakers", "Footwear"),
    ("Handbag", "Accessories"),
    ("Jewelry", "Accessories"),
    ("Coat", "Outerwear"),
];

#[derive(Parser)]
#[command(about = "Write a deterministic synthetic shopping-trends dataset")]
struct Args {
    /// Output file, .csv or .parquet
    #[arg(default_value = "shopping_trends_sample.csv")]
    output: PathBuf,

    #[arg(long, default_value_t = 500)]
    rows: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform integer in `[lo, hi]`.
    fn range(&mut self, lo: i64, hi: i64) -> i64 {
        lo + (self.next_f64() * (hi - lo + 1) as f64) as i64
    }

    fn pick<'a>(&mut self, options: &[&'a str]) -> &'a str {
        options[(self.next_f64() * options.len() as f64) as usize]
    }
}

fn generate_row(rng: &mut SimpleRng) -> Row {
    let (item, category) = ITEMS[(rng.next_f64() * ITEMS.len() as f64) as usize];
    let discounted = rng.next_f64() < 0.43;
    let yes_no = |flag: bool| (if flag { "Yes" } else { "No" }).to_string();

    Row {
        age: rng.range(18, 70),
        gender: rng.pick(&GENDERS).to_string(),
        item_purchased: item.to_string(),
        category: category.to_string(),
        purchase_amount: rng.range(20, 100) as f64,
        location: rng.pick(&LOCATIONS).to_string(),
        size: rng.pick(&SIZES).to_string(),
        color: rng.pick(&COLORS).to_string(),
        season: rng.pick(&SEASONS).to_string(),
        // One decimal place, 2.5 to 5.0 like the published ratings.
        review_rating: rng.range(25, 50) as f64 / 10.0,
        subscription_status: yes_no(rng.next_f64() < 0.27),
        shipping_type: rng.pick(&SHIPPING_TYPES).to_string(),
        discount_applied: yes_no(discounted),
        promo_code_used: yes_no(discounted),
        previous_purchases: rng.range(1, 50),
        preferred_payment_method: rng.pick(&PAYMENT_METHODS).to_string(),
        frequency_of_purchases: rng.pick(&FREQUENCIES).to_string(),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut rng = SimpleRng::new(args.seed);
    let rows: Vec<Row> = (0..args.rows).map(|_| generate_row(&mut rng)).collect();

    let ext = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => {
            let mut writer = csv::Writer::from_path(&args.output)
                .with_context(|| format!("creating {}", args.output.display()))?;
            for row in &rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
        "parquet" | "pq" => {
            let refs: Vec<&Row> = rows.iter().collect();
            let batch = rows_to_batch(&refs)?;
            let file = File::create(&args.output)
                .with_context(|| format!("creating {}", args.output.display()))?;
            let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
            writer.write(&batch)?;
            writer.close()?;
        }
        other => bail!("Unsupported output extension: .{other}"),
    }

    log::info!("Wrote {} rows to {}", rows.len(), args.output.display());
    println!("Wrote {} transactions to {}", rows.len(), args.output.display());
    Ok(())
}
