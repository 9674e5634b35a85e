use serde::{Deserialize, Serialize};

use crate::network::Address;

/// One unit of work flowing queue -> server -> back to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub source: Address,
    pub destination: Address,
    /// Cycles of server time required.
    pub service_time: u32,
    pub arrival_tick: u64,
    /// `None` until dispatched.
    pub assigned_tick: Option<u64>,
    pub completed: bool,
}

impl Request {
    pub fn new(source: Address, destination: Address, service_time: u32, arrival_tick: u64) -> Self {
        Self {
            source,
            destination,
            service_time,
            arrival_tick,
            assigned_tick: None,
            completed: false,
        }
    }

    /// Cycles spent queued, once assigned.
    pub fn wait_time(&self) -> Option<u64> {
        self.assigned_tick
            .map(|t| t.saturating_sub(self.arrival_tick))
    }
}
