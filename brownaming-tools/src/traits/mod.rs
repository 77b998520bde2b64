pub mod aligner;

pub use aligner::{Aligner, AlignmentRow, SearchOptions, SearchRequest};
