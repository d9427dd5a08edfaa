use serde::Deserialize;
use std::env;

use crewpass_core::engine::AssignmentRules;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub assignment: AssignmentConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct AssignmentConfig {
    #[serde(default = "default_exclude_held_seats")]
    pub exclude_held_seats: bool,
}

fn default_exclude_held_seats() -> bool {
    true
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            exclude_held_seats: default_exclude_held_seats(),
        }
    }
}

impl AssignmentConfig {
    pub fn rules(&self) -> AssignmentRules {
        AssignmentRules {
            exclude_held_seats: self.exclude_held_seats,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file
            // Default to 'development' env
            // Note that this file is _optional_
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of CREWPASS)
            // Eg.. `CREWPASS_SERVER__PORT=9090` would set `server.port`
            .add_source(config::Environment::with_prefix("CREWPASS").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
