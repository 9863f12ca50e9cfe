mod aggregation;
mod pagination;
mod seed;
mod total_pages;

#[cfg(test)]
mod testing;

pub use aggregation::*;
pub use pagination::*;
pub use seed::*;
pub use total_pages::*;
