use serde::{Deserialize, Serialize};

/// One cheat entry of a cheat list.
///
/// Position in the surrounding list determines the serialized index.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCheat {
    pub desc: String,
    pub code: String,
    pub enable: bool,
}

impl ParsedCheat {
    pub fn new(desc: impl Into<String>, code: impl Into<String>, enable: bool) -> Self {
        Self {
            desc: desc.into(),
            code: code.into(),
            enable,
        }
    }
}

/// A serialized cheat list, ready to be uploaded to the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CheatsFile {
    pub name: String,
    pub content: String,
}
