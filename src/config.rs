//! Runtime configuration from the environment (and `.env`, if present).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

pub const DEFAULT_DB_PATH: &str = "lumina_db";
pub const DEFAULT_TICK_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub tick: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            tick: Duration::from_secs(DEFAULT_TICK_SECS),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(path) = lookup("LUMINA_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }

        if let Some(raw) = lookup("LUMINA_TICK_SECS") {
            let secs: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("LUMINA_TICK_SECS is not a number: {}", raw))?;
            if secs == 0 {
                bail!("LUMINA_TICK_SECS must be greater than zero");
            }
            config.tick = Duration::from_secs(secs);
        }

        Ok(config)
    }
}
