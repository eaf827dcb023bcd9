//! INI file configuration adapter.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use log::warn;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        or_default(self.config.getint(section, key), section, key, default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        or_default(self.config.getfloat(section, key), section, key, default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        match self.config.get(section, key) {
            Some(raw) => Self::parse_bool(&raw).unwrap_or_else(|| {
                warn!("[{}] {} = {:?} is not a boolean, using {}", section, key, raw, default);
                default
            }),
            None => default,
        }
    }
}

/// Absent keys take `default` quietly; unreadable ones take it with a warning.
fn or_default<T: std::fmt::Display>(
    lookup: Result<Option<T>, String>,
    section: &str,
    key: &str,
    default: T,
) -> T {
    match lookup {
        Ok(Some(value)) => value,
        Ok(None) => default,
        Err(e) => {
            warn!("[{}] {}: {}, using {}", section, key, e, default);
            default
        }
    }
}
