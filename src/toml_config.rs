//! TOML-backed configuration store.

use fragstream_core::ConfigStore;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use toml::{Table, Value};

/// Errors loading a TOML configuration document.
#[derive(Debug, Error)]
pub enum TomlConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// [`ConfigStore`] over a parsed TOML document. Sections are top-level tables, keys are their
/// scalar entries:
///
/// ```toml
/// [sound]
/// alsa_device = "hw:0,0"
/// alsa_numfrags = 8
/// ```
#[derive(Debug, Clone, Default)]
pub struct TomlConfig {
    table: Table,
}

impl TomlConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TomlConfigError> {
        let path = path.as_ref();
        log::debug!("Loading configuration from {}", path.display());
        std::fs::read_to_string(path)?.parse()
    }

    fn value(&self, section: &str, key: &str) -> Option<&Value> {
        self.table.get(section)?.as_table()?.get(key)
    }
}

impl FromStr for TomlConfig {
    type Err = TomlConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self { table: s.parse()? })
    }
}

impl ConfigStore for TomlConfig {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        match self.value(section, key)? {
            Value::String(s) => Some(s.clone()),
            Value::Integer(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Boolean(b) => Some(b.to_string()),
            _ => None,
        }
    }

    fn get_int(&self, section: &str, key: &str) -> Option<i64> {
        match self.value(section, key)? {
            Value::Integer(i) => Some(*i),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}
