/// Core types shared across all Brownaming modules
pub mod taxonomy;

pub use taxonomy::{TaxonId, CELLULAR_ORGANISMS};
