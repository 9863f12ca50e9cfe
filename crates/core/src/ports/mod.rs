mod cache;
mod repository;

pub use cache::*;
pub use repository::*;
