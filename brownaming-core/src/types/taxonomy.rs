/// Taxonomy-related types used throughout Brownaming
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Taxonomy ID type - newtype pattern for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxonId(pub u32);

/// "cellular organisms": the ancestor walk never climbs above it
pub const CELLULAR_ORGANISMS: TaxonId = TaxonId(131567);

impl TaxonId {
    pub const ROOT: Self = Self(1);

    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == 1
    }
}

impl fmt::Display for TaxonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TaxonId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<TaxonId> for u32 {
    fn from(taxon: TaxonId) -> Self {
        taxon.0
    }
}

impl FromStr for TaxonId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u32>().map(TaxonId)
    }
}
