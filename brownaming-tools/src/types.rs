//! Common types for external tools

use serde::{Deserialize, Serialize};

/// External tools driven by Brownaming
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tool {
    Diamond,
}

impl Tool {
    pub fn display_name(&self) -> &'static str {
        match self {
            Tool::Diamond => "DIAMOND",
        }
    }

    /// Executable looked up on `PATH`
    pub fn binary_name(&self) -> &'static str {
        match self {
            Tool::Diamond => "diamond",
        }
    }

    /// Hint printed when the binary cannot be found
    pub fn install_hint(&self) -> &'static str {
        match self {
            Tool::Diamond => "install it from https://github.com/bbuchfink/diamond or via `conda install -c bioconda diamond`",
        }
    }
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
