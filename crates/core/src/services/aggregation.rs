//! Per-category price averages over a page of products.

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::Product;

/// Decimal places kept in averaged prices.
pub const AVERAGE_PRICE_SCALE: u32 = 2;

/// Average price per category over `products`.
///
/// Each average is `sum / count` for the category, rounded to two decimal
/// places with midpoints rounded away from zero. An empty slice yields an
/// empty map.
pub fn average_price_by_category(products: &[Product]) -> BTreeMap<i32, Decimal> {
    let mut totals: BTreeMap<i32, (Decimal, u64)> = BTreeMap::new();
    for product in products {
        let (sum, count) = totals.entry(product.category_id).or_default();
        *sum += product.price;
        *count += 1;
    }

    totals
        .into_iter()
        .map(|(category_id, (sum, count))| {
            let average = (sum / Decimal::from(count))
                .round_dp_with_strategy(AVERAGE_PRICE_SCALE, RoundingStrategy::MidpointAwayFromZero);
            (category_id, average)
        })
        .collect()
}
