pub mod fasta;

pub use fasta::{parse_fasta, parse_fasta_from_bytes, write_fasta, write_pending_fasta};
