use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Semantic category of a file handed to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Rom,
    Save,
    Autosave,
    Cheat,
    Patch,
    Screenshot,
}

impl FileCategory {
    /// Classification precedence.
    ///
    /// Autosave names also look like save-state names, so autosave must be
    /// tested before save.
    pub const PRECEDENCE: [FileCategory; 6] = [
        Self::Rom,
        Self::Autosave,
        Self::Save,
        Self::Cheat,
        Self::Patch,
        Self::Screenshot,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rom => "rom",
            Self::Save => "save",
            Self::Autosave => "autosave",
            Self::Cheat => "cheat",
            Self::Patch => "patch",
            Self::Screenshot => "screenshot",
        }
    }
}

impl fmt::Display for FileCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown category name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown file category: {}", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for FileCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::PRECEDENCE
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
