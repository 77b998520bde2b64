//! External homology-search tools
//!
//! The search loop only talks to the [`Aligner`] trait. [`DiamondAligner`] runs
//! the DIAMOND binary as a subprocess; [`ScriptedAligner`] replays canned rows in tests.

pub mod aligners;
pub mod testing;
pub mod traits;
pub mod types;

pub use aligners::DiamondAligner;
pub use testing::ScriptedAligner;
pub use traits::{Aligner, AlignmentRow, SearchOptions, SearchRequest};
pub use types::Tool;
