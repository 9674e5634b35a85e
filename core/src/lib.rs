pub mod analytics;
pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod network;
pub mod traits;

pub use analytics::{MetricsCollector, Summary, WaitRecorder, WaitStats};
pub use components::admission::{Admission, AdmissionControl, RejectReason};
pub use components::request::Request;
pub use components::server::Server;
pub use config::SimConfig;
pub use engine::{BlockedCounters, ScaleAction, ScalingPolicy, Scheduler, Snapshot, Teardown};
pub use error::{ConfigError, Error, Result};
pub use network::{random_address, Address, DEFAULT_BLOCKED_RANGES};
pub use traits::Observer;

/// Scale up once the queue holds more than this many requests per server.
pub const SCALE_UP_QUEUE_FACTOR: usize = 2;
/// Scale down only when the queue is at or below this depth.
pub const SCALE_DOWN_QUEUE_THRESHOLD: usize = 5;
