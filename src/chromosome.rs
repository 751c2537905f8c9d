use std::fmt;

use serde::{Deserialize, Serialize};

/// A chromosome name that compares equal regardless of a leading `chr`
///
/// `chr7`, `Chr7` and `7` all refer to the same chromosome. The label keeps the spelling it
/// was created with for display purposes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ChromosomeLabel {
    name: String,
}

impl ChromosomeLabel {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// The part of the name that is used for comparisons
    pub fn key(&self) -> &str {
        let name = self.name.as_str();
        match name.get(..3) {
            Some(prefix) if prefix.eq_ignore_ascii_case("chr") && name.len() > 3 => &name[3..],
            _ => name,
        }
    }
}

impl PartialEq for ChromosomeLabel {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ChromosomeLabel {}

impl std::hash::Hash for ChromosomeLabel {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key().hash(state)
    }
}

impl From<&str> for ChromosomeLabel {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ChromosomeLabel {
    fn from(name: String) -> Self {
        Self::new(&name)
    }
}

impl From<ChromosomeLabel> for String {
    fn from(label: ChromosomeLabel) -> Self {
        label.name
    }
}

impl fmt::Display for ChromosomeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
