use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::network::DEFAULT_BLOCKED_RANGES;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    pub initial_servers: usize,
    pub max_servers: usize,
    /// Accepted requests per source address before it is blocked for good.
    pub rate_limit: u32,
    /// Chance that a cycle produces a new candidate request.
    pub arrival_probability: f64,
    pub min_service_time: u32,
    pub max_service_time: u32,
    /// Pre-filled queue depth is `initial_servers * backlog_multiplier`.
    pub backlog_multiplier: usize,
    pub blocked_ranges: Vec<String>,
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            initial_servers: 10,
            max_servers: 20,
            rate_limit: 50,
            arrival_probability: 0.1,
            min_service_time: 1,
            max_service_time: 10,
            backlog_multiplier: 100,
            blocked_ranges: DEFAULT_BLOCKED_RANGES.iter().map(|s| s.to_string()).collect(),
            seed: None,
        }
    }
}

impl SimConfig {
    pub fn new(initial_servers: usize, max_servers: usize) -> Self {
        Self {
            initial_servers,
            max_servers,
            ..Default::default()
        }
    }

    pub fn with_arrival_probability(mut self, p: f64) -> Self {
        self.arrival_probability = p;
        self
    }

    pub fn with_rate_limit(mut self, limit: u32) -> Self {
        self.rate_limit = limit;
        self
    }

    pub fn with_backlog_multiplier(mut self, multiplier: usize) -> Self {
        self.backlog_multiplier = multiplier;
        self
    }

    pub fn with_service_time(mut self, min: u32, max: u32) -> Self {
        self.min_service_time = min;
        self.max_service_time = max;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn min_servers(&self) -> usize {
        self.initial_servers
    }

    pub fn starting_queue_size(&self) -> usize {
        self.initial_servers * self.backlog_multiplier
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_servers == 0 {
            return Err(ConfigError::NoServers);
        }
        if self.max_servers < self.initial_servers {
            return Err(ConfigError::MaxBelowInitial {
                initial: self.initial_servers,
                max: self.max_servers,
            });
        }
        if !(0.0..=1.0).contains(&self.arrival_probability) {
            // NaN fails the range check too.
            return Err(ConfigError::ArrivalProbability(self.arrival_probability));
        }
        if self.min_service_time == 0 || self.min_service_time > self.max_service_time {
            return Err(ConfigError::ServiceTimeBounds {
                min: self.min_service_time,
                max: self.max_service_time,
            });
        }
        if self.rate_limit == 0 {
            return Err(ConfigError::ZeroRateLimit);
        }
        if let Some(idx) = self.blocked_ranges.iter().position(|r| r.is_empty()) {
            return Err(ConfigError::EmptyBlockedRange(idx));
        }
        Ok(())
    }

    /// Fields missing from `json` keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn encode(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
