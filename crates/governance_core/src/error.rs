use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid display config: {0}")]
    Config(#[from] toml::de::Error),
    #[error("invalid utc offset {hours:+}:{minutes:02}")]
    Offset { hours: i8, minutes: i8 },
    #[error("unsupported dump format: {0}")]
    DumpFormat(String),
    #[error("invalid json dump: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid yaml dump: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
    #[error("{field} value {value} does not fit in a sqlite integer")]
    Overflow { field: &'static str, value: u64 },
    #[error("stored {field} is negative: {value}")]
    Negative { field: &'static str, value: i64 },
}

pub type Result<T> = std::result::Result<T, Error>;
