//! Provenance header written ahead of every saved entry.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::Metadata;
use crate::error::StatesResult;

pub const GENERATOR: &str = "tf-states SolutionArray";

/// Keys written by [`Header`], in output order.
pub const HEADER_KEYS: [&str; 5] = ["description", "generator", "version", "git-commit", "date"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Header {
    pub description: String,
    pub generator: String,
    pub version: String,
    pub git_commit: String,
    pub date: String,
}

impl Header {
    /// Header for a save happening now.
    pub fn new(description: &str) -> Self {
        Self {
            description: description.to_string(),
            generator: GENERATOR.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            git_commit: option_env!("TF_GIT_COMMIT").unwrap_or("unknown").to_string(),
            date: timestamp(),
        }
    }

    fn values(&self) -> [&str; 5] {
        [
            &self.description,
            &self.generator,
            &self.version,
            &self.git_commit,
            &self.date,
        ]
    }

    pub fn to_mapping(&self) -> Mapping {
        let mut mapping = Mapping::new();
        for (key, value) in HEADER_KEYS.iter().zip(self.values()) {
            mapping.insert(Value::from(*key), Value::from(value));
        }
        mapping
    }

    pub fn to_metadata(&self) -> Metadata {
        HEADER_KEYS
            .iter()
            .zip(self.values())
            .map(|(key, value)| (key.to_string(), Value::from(value)))
            .collect()
    }

    /// Pick the header fields out of an entry's metadata.
    pub fn from_metadata(meta: &Metadata) -> StatesResult<Self> {
        let mut mapping = Mapping::new();
        for key in HEADER_KEYS {
            if let Some(value) = meta.get(key) {
                mapping.insert(Value::from(key), value.clone());
            }
        }
        Ok(serde_yaml::from_value(Value::Mapping(mapping))?)
    }
}

/// Local time like `Mon Oct 16 09:30:00 2026`, printable ASCII only.
fn timestamp() -> String {
    chrono::Local::now()
        .format("%a %b %e %H:%M:%S %Y")
        .to_string()
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .collect()
}
