//! Firewall in front of the queue: static range rules plus a per-address
//! request budget.
//!
//! Two kinds of rejection are kept apart on purpose. Addresses in a static
//! range are turned away every time but never enter the blocked set, and they
//! do not consume budget. Addresses that run out of budget are added to the
//! blocked set and stay there for the rest of the run.

use std::collections::{HashMap, HashSet};

use log::info;
use serde::{Deserialize, Serialize};

use crate::network::{self, Address};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectReason {
    /// Address was blocked earlier for exceeding its budget.
    Blocklisted,
    /// Address falls in a static private/loopback range.
    BlockedRange,
    /// This request pushed the address over its budget.
    RateLimited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accepted,
    Rejected(RejectReason),
}

impl Admission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Admission::Accepted)
    }
}

#[derive(Debug, Clone)]
pub struct AdmissionControl {
    rate_limit: u32,
    blocked_ranges: Vec<String>,
    request_counts: HashMap<Address, u32>,
    blocked: HashSet<Address>,
}

impl AdmissionControl {
    pub fn new(rate_limit: u32, blocked_ranges: Vec<String>) -> Self {
        Self {
            rate_limit,
            blocked_ranges,
            request_counts: HashMap::new(),
            blocked: HashSet::new(),
        }
    }

    pub fn check(&mut self, source: &str) -> Admission {
        if self.blocked.contains(source) {
            return Admission::Rejected(RejectReason::Blocklisted);
        }
        if self.in_blocked_range(source) {
            return Admission::Rejected(RejectReason::BlockedRange);
        }

        let count = self.request_counts.entry(source.to_string()).or_insert(0);
        *count += 1;
        if *count > self.rate_limit {
            self.blocked.insert(source.to_string());
            info!("[FIREWALL] Blocked IP: {} (too many requests)", source);
            return Admission::Rejected(RejectReason::RateLimited);
        }
        Admission::Accepted
    }

    pub fn in_blocked_range(&self, source: &str) -> bool {
        self.blocked_ranges
            .iter()
            .any(|prefix| network::in_range(source, prefix))
    }

    pub fn is_blocked(&self, source: &str) -> bool {
        self.blocked.contains(source)
    }

    /// Number of budget-consuming checks seen for `source`.
    pub fn request_count(&self, source: &str) -> u32 {
        self.request_counts.get(source).copied().unwrap_or(0)
    }

    pub fn tracked_addresses(&self) -> usize {
        self.request_counts.len()
    }

    pub fn blocked_count(&self) -> usize {
        self.blocked.len()
    }
}

impl Default for AdmissionControl {
    fn default() -> Self {
        Self::new(
            50,
            network::DEFAULT_BLOCKED_RANGES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }
}
