#![allow(dead_code)]

use lbsim_core::*;

pub const SEED: u64 = 42;

pub struct TestHarness {
    pub sched: Scheduler,
    pub snapshots: Vec<Snapshot>,
}

impl TestHarness {
    pub fn new(config: SimConfig) -> Self {
        Self::new_with_seed(config, SEED)
    }

    pub fn new_with_seed(config: SimConfig, seed: u64) -> Self {
        Self {
            sched: Scheduler::from_seed(config, seed).expect("valid config"),
            snapshots: Vec::new(),
        }
    }

    /// Ticks one cycle at a time, checking the pool after every cycle.
    pub fn run_for(&mut self, cycles: u64) {
        for _ in 0..cycles {
            let snapshot = self.sched.tick();
            self.snapshots.push(snapshot);
            self.assert_invariants();
        }
    }

    pub fn assert_invariants(&self) {
        let policy = self.sched.policy();
        let total = self.sched.total_servers();
        assert!(
            (policy.min_servers..=policy.max_servers).contains(&total),
            "pool size {} outside [{}, {}] at tick {}",
            total,
            policy.min_servers,
            policy.max_servers,
            self.sched.time()
        );
        for (i, server) in self.sched.servers().iter().enumerate() {
            if !server.is_busy() {
                assert_eq!(server.remaining(), 0, "idle server {} has time left", i);
            }
        }
    }

    pub fn in_flight(&self) -> usize {
        self.sched
            .servers()
            .iter()
            .filter(|s| s.current().is_some())
            .count()
    }

    pub fn last(&self) -> Snapshot {
        *self.snapshots.last().expect("at least one cycle")
    }
}

pub fn request(service_time: u32) -> Request {
    Request::new("8.8.8.8".into(), "93.184.216.34".into(), service_time, 0)
}

/// Prefixes covering every first octet, so every address is rejected by range.
pub fn every_range() -> Vec<String> {
    (0..=255).map(|o| format!("{o}.")).collect()
}
