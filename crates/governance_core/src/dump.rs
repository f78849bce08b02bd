use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::schema::{Proposal, Vote};

/// A snapshot exported from the proposal, vote and name sources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceDump {
    pub proposals: Vec<Proposal>,
    #[serde(default)]
    pub votes: BTreeMap<String, Vec<Vote>>,
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
}

impl SourceDump {
    /// Reads a `.json`, `.yaml` or `.yml` dump.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(serde_json::from_str(&raw)?),
            Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&raw)?),
            other => Err(Error::DumpFormat(other.unwrap_or("<none>").to_string())),
        }
    }
}
