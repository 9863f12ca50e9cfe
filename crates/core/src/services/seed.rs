//! Fake catalog data for empty stores.
//!
//! This is the only write path in the service. Every batch written here is
//! followed by a page-count invalidation.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use crate::error::CatalogResult;
use crate::models::NewProduct;
use crate::ports::ProductRepository;

use super::total_pages::TotalPageCounter;

const ADJECTIVES: &[&str] = &[
    "Small", "Ergonomic", "Rustic", "Intelligent", "Gorgeous", "Incredible", "Fantastic",
    "Practical", "Sleek", "Awesome", "Generic", "Handcrafted", "Handmade", "Licensed",
    "Refined", "Unbranded", "Tasty",
];

const MATERIALS: &[&str] = &[
    "Steel", "Wooden", "Concrete", "Plastic", "Cotton", "Granite", "Rubber", "Metal", "Soft",
    "Fresh", "Frozen",
];

const PRODUCTS: &[&str] = &[
    "Chair", "Car", "Computer", "Keyboard", "Mouse", "Bike", "Ball", "Gloves", "Pants", "Shirt",
    "Table", "Shoes", "Hat", "Towels", "Soap", "Tuna", "Chicken", "Fish", "Cheese", "Bacon",
    "Pizza", "Salad", "Sausages", "Chips",
];

/// Lowest generated price, in cents.
const MIN_PRICE_CENTS: i64 = 5_000;
/// Highest generated price, in cents.
const MAX_PRICE_CENTS: i64 = 200_000;
/// Number of categories products are spread across.
const CATEGORY_COUNT: i32 = 5;

/// Configuration for the seeder.
#[derive(Debug, Clone)]
pub struct SeedConfig {
    /// Products to generate when the store is empty.
    pub count: u64,
    /// Products per insert.
    pub batch_size: usize,
    /// Fixed RNG seed; random when unset.
    pub rng_seed: Option<u64>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            count: 10_000,
            batch_size: 1_000,
            rng_seed: None,
        }
    }
}

/// Outcome of a seeding run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The store already held products; nothing was written.
    Skipped { existing: i64 },
    /// `inserted` products were written.
    Seeded { inserted: u64 },
}

/// Populates an empty store with generated products.
pub struct SeedService {
    config: SeedConfig,
    repository: Arc<dyn ProductRepository>,
    total_pages: Arc<TotalPageCounter>,
}

impl SeedService {
    pub fn new(
        config: SeedConfig,
        repository: Arc<dyn ProductRepository>,
        total_pages: Arc<TotalPageCounter>,
    ) -> Self {
        Self {
            config,
            repository,
            total_pages,
        }
    }

    /// Seed the store unless it already holds products.
    #[instrument(skip(self), fields(count = self.config.count))]
    pub async fn seed_if_empty(&self) -> CatalogResult<SeedOutcome> {
        let existing = self.repository.count_products().await?;
        if existing > 0 {
            debug!(existing, "Store not empty, skipping seed");
            return Ok(SeedOutcome::Skipped { existing });
        }

        let mut rng = match self.config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let batch_size = self.config.batch_size.max(1) as u64;
        let mut inserted = 0;
        while inserted < self.config.count {
            let size = batch_size.min(self.config.count - inserted) as usize;
            let batch = generate_products(size, &mut rng);
            let written = self.repository.insert_products(&batch).await;
            // Any partial write still changes the count.
            self.total_pages.invalidate();
            inserted += written?;
            debug!(inserted, "Seed batch written");
        }

        info!(inserted, "🌱 Catalog seeded");
        Ok(SeedOutcome::Seeded { inserted })
    }
}

/// Generate `count` products with commerce-style names.
pub fn generate_products<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<NewProduct> {
    (0..count)
        .map(|_| NewProduct {
            category_id: rng.random_range(1..=CATEGORY_COUNT),
            name: product_name(rng),
            price: Decimal::new(rng.random_range(MIN_PRICE_CENTS..=MAX_PRICE_CENTS), 2),
        })
        .collect()
}

fn pick<R: Rng + ?Sized>(words: &[&'static str], rng: &mut R) -> &'static str {
    words.choose(rng).copied().unwrap_or_default()
}

fn product_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let adjective = pick(ADJECTIVES, rng);
    let material = pick(MATERIALS, rng);
    let product = pick(PRODUCTS, rng);
    format!("{adjective} {material} {product}")
}
