//! concord-core: shared configuration for the Concord bot.

pub mod config;

pub use config::{Config, ConfigError};
