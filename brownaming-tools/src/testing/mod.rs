pub mod mock;

pub use mock::{RecordedCall, ScriptedAligner};
