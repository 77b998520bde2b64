//! Biological data handling for Brownaming: query FASTA files and the taxonomy tree

pub mod formats;
pub mod sequence;
pub mod taxonomy;

pub use formats::fasta::{parse_fasta, write_fasta, write_pending_fasta};
pub use sequence::Sequence;
pub use taxonomy::TaxonomyIndex;
