//! Error types for building and configuring a simulation.
//!
//! A running simulation never fails: rejected requests, declined scale-ups and
//! the like are policy outcomes that show up in counters. The only errors are
//! the ones raised before the first cycle, while a configuration is loaded and
//! validated.

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("initial server count must be at least 1")]
    NoServers,

    #[error("max servers ({max}) must be >= initial servers ({initial})")]
    MaxBelowInitial { initial: usize, max: usize },

    #[error("arrival probability must be within [0, 1], got {0}")]
    ArrivalProbability(f64),

    #[error("service time bounds must satisfy 1 <= min <= max, got [{min}, {max}]")]
    ServiceTimeBounds { min: u32, max: u32 },

    #[error("rate limit threshold must be at least 1")]
    ZeroRateLimit,

    #[error("blocked range at index {0} is empty")]
    EmptyBlockedRange(usize),
}
