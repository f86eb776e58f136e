use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::Level;
use wagerhall_types::arcade::ArcadeConfig;

/// Host settings plus the game tables, loaded from one YAML file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    /// Period of the progression tick. Game servers run at 64Hz.
    pub tick_ms: u64,
    pub log_level: String,
    /// Credits given to a player the first time the in-memory ledger sees them.
    pub starting_balance: u64,
    /// Fixed RNG seed for reproducible sessions. Entropy is used when unset.
    pub seed: Option<u64>,
    pub event_buffer: usize,
    pub games: ArcadeConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9124,
            tick_ms: 16,
            log_level: "info".to_string(),
            starting_balance: 10_000,
            seed: None,
            event_buffer: 1024,
            games: ArcadeConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Read the config file at `path`, or use defaults when no path is given.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path)
                    .with_context(|| format!("Could not read config file {path}"))?;
                Self::parse(&contents)?
            }
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        serde_yaml::from_str(contents).context("Could not parse config file")
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.tick_ms > 0, "tick_ms must be positive");
        anyhow::ensure!(self.event_buffer > 0, "event_buffer must be positive");
        self.level()?;
        self.listen_addr()?;
        Ok(())
    }

    pub fn level(&self) -> Result<Level> {
        Level::from_str(&self.log_level).context("Invalid log level")
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .context("invalid listen addr")
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}
