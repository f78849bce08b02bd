use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use time::UtcOffset;
use tracing::{debug, warn};

use crate::eligibility::DEFAULT_MINIMUM_BALANCE;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DisplayConfig {
    pub time: TimeConfig,
    pub description: DescriptionConfig,
    pub address: AddressConfig,
    pub eligibility: EligibilityConfig,
}

/// The fixed offset applies when `use_system_offset` is off or the host
/// offset cannot be determined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TimeConfig {
    pub utc_offset_hours: i8,
    pub utc_offset_minutes: i8,
    pub use_system_offset: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DescriptionConfig {
    pub default_title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AddressConfig {
    pub prefix_len: usize,
    pub suffix_len: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct EligibilityConfig {
    pub minimum_balance: f64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: 0,
            utc_offset_minutes: 0,
            use_system_offset: true,
        }
    }
}

impl Default for DescriptionConfig {
    fn default() -> Self {
        Self {
            default_title: "Untitled proposal".to_string(),
        }
    }
}

impl Default for AddressConfig {
    fn default() -> Self {
        Self {
            prefix_len: 6,
            suffix_len: 4,
        }
    }
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            minimum_balance: DEFAULT_MINIMUM_BALANCE,
        }
    }
}

impl DisplayConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&raw)?;
        debug!(path = %path.display(), "loaded display config");
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: DisplayConfig = toml::from_str(raw)?;
        config.time.fixed_offset()?;
        Ok(config)
    }

    /// Defaults when no path is given.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

impl TimeConfig {
    /// Always renders at the given offset, ignoring the host.
    pub fn fixed(utc_offset_hours: i8, utc_offset_minutes: i8) -> Self {
        Self {
            utc_offset_hours,
            utc_offset_minutes,
            use_system_offset: false,
        }
    }

    pub fn fixed_offset(&self) -> Result<UtcOffset> {
        UtcOffset::from_hms(self.utc_offset_hours, self.utc_offset_minutes, 0).map_err(|_| {
            Error::Offset {
                hours: self.utc_offset_hours,
                minutes: self.utc_offset_minutes,
            }
        })
    }

    /// The viewer's offset. Falls back to UTC if the configured offset is
    /// invalid, and to the fixed offset if the host offset is unavailable.
    pub fn offset(&self) -> UtcOffset {
        let fixed = self.fixed_offset().unwrap_or_else(|err| {
            warn!(%err, "using UTC");
            UtcOffset::UTC
        });
        if !self.use_system_offset {
            return fixed;
        }
        let system = UtcOffset::current_local_offset()
            .map_err(|err| debug!(%err, "system offset unavailable, using configured offset"))
            .ok();
        system_or_fixed(system, fixed)
    }
}

fn system_or_fixed(system: Option<UtcOffset>, fixed: UtcOffset) -> UtcOffset {
    system.unwrap_or(fixed)
}
