use std::collections::VecDeque;

use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::analytics::{WaitRecorder, WaitStats};
use crate::components::admission::{Admission, AdmissionControl, RejectReason};
use crate::components::request::Request;
use crate::components::server::Server;
use crate::config::SimConfig;
use crate::error::ConfigError;
use crate::network;
use crate::traits::Observer;
use crate::{SCALE_DOWN_QUEUE_THRESHOLD, SCALE_UP_QUEUE_FACTOR};

/// What an observer gets to see after each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub queue_depth: usize,
    pub busy_servers: usize,
    pub total_servers: usize,
    pub blocked_requests: u64,
    pub blocked_ips: usize,
}

impl Snapshot {
    pub const CSV_HEADER: &'static str =
        "Cycle,QueueSize,BusyServers,TotalServers,BlockedRequests,BlockedIPs";

    pub fn csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{}",
            self.tick,
            self.queue_depth,
            self.busy_servers,
            self.total_servers,
            self.blocked_requests,
            self.blocked_ips
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScaleAction {
    Up,
    Down,
    Hold,
}

/// Reactive autoscaling rule. At most one action per cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalingPolicy {
    pub min_servers: usize,
    pub max_servers: usize,
}

impl ScalingPolicy {
    pub fn new(min_servers: usize, max_servers: usize) -> Self {
        Self {
            min_servers,
            max_servers,
        }
    }

    pub fn decide(&self, queue_depth: usize, total_servers: usize, busy_servers: usize) -> ScaleAction {
        if queue_depth > SCALE_UP_QUEUE_FACTOR * total_servers && total_servers < self.max_servers {
            ScaleAction::Up
        } else if queue_depth <= SCALE_DOWN_QUEUE_THRESHOLD
            && total_servers > self.min_servers
            && busy_servers == 0
        {
            // Never shrink under load, so no in-flight request can be dropped.
            ScaleAction::Down
        } else {
            ScaleAction::Hold
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedCounters {
    pub blocklist: u64,
    pub range: u64,
    pub rate_limit: u64,
}

impl BlockedCounters {
    fn record(&mut self, reason: RejectReason) {
        match reason {
            RejectReason::Blocklisted => self.blocklist += 1,
            RejectReason::BlockedRange => self.range += 1,
            RejectReason::RateLimited => self.rate_limit += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.blocklist + self.range + self.rate_limit
    }
}

/// Requests still held when the simulation was torn down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Teardown {
    pub queued: usize,
    pub in_flight: usize,
}

/// The load balancer: owns the queue, the server pool and the firewall, and
/// advances all of them one cycle per [`Scheduler::tick`].
pub struct Scheduler<R = StdRng> {
    config: SimConfig,
    policy: ScalingPolicy,
    rng: R,
    admission: AdmissionControl,
    queue: VecDeque<Request>,
    servers: Vec<Server>,
    time: u64,
    blocked: BlockedCounters,
    generated_requests: u64,
    dispatched_requests: u64,
    completed_requests: u64,
    scale_ups: u64,
    scale_downs: u64,
    peak_servers: usize,
    waits: WaitRecorder,
}

impl Scheduler<StdRng> {
    pub fn from_seed(config: SimConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::new(config, StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy(config: SimConfig) -> Result<Self, ConfigError> {
        Self::new(config, StdRng::from_entropy())
    }

    /// Seeds from `config.seed` when set, otherwise from OS entropy.
    pub fn from_config(config: SimConfig) -> Result<Self, ConfigError> {
        match config.seed {
            Some(seed) => Self::from_seed(config, seed),
            None => Self::from_entropy(config),
        }
    }
}

impl<R: Rng> Scheduler<R> {
    pub fn new(config: SimConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;

        let min_servers = config.min_servers();
        let admission = AdmissionControl::new(config.rate_limit, config.blocked_ranges.clone());
        let mut scheduler = Self {
            policy: ScalingPolicy::new(min_servers, config.max_servers),
            rng,
            admission,
            queue: VecDeque::new(),
            servers: (0..min_servers).map(|_| Server::new()).collect(),
            time: 0,
            blocked: BlockedCounters::default(),
            generated_requests: 0,
            dispatched_requests: 0,
            completed_requests: 0,
            scale_ups: 0,
            scale_downs: 0,
            peak_servers: min_servers,
            waits: WaitRecorder::new(),
            config,
        };
        info!("Initializing {} servers...", min_servers);

        let backlog = scheduler.config.starting_queue_size();
        info!("Pre-filling queue with {} requests...", backlog);
        for _ in 0..backlog {
            if let Some(req) = scheduler.admit_candidate() {
                scheduler.queue.push_back(req);
            }
        }
        info!(
            "Load balancer initialization complete: {} queued, {} blocked",
            scheduler.queue.len(),
            scheduler.blocked.total()
        );
        Ok(scheduler)
    }

    /// Runs one full cycle: generate, dispatch, advance, scale.
    pub fn tick(&mut self) -> Snapshot {
        self.time += 1;
        self.generate();
        self.dispatch();
        self.advance();
        self.scale();

        let snapshot = self.snapshot();
        trace!("{:?}", snapshot);
        snapshot
    }

    pub fn run<O: Observer + ?Sized>(&mut self, cycles: u64, observer: &mut O) {
        for _ in 0..cycles {
            let snapshot = self.tick();
            observer.on_cycle(&snapshot);
        }
    }

    fn generate(&mut self) {
        if !self.rng.gen_bool(self.config.arrival_probability) {
            return;
        }
        if let Some(req) = self.admit_candidate() {
            self.queue.push_back(req);
        }
    }

    /// Draws a candidate and runs it past the firewall. Rejections are counted
    /// here; the caller only sees accepted requests.
    fn admit_candidate(&mut self) -> Option<Request> {
        let source = network::random_address(&mut self.rng);
        let destination = network::random_address(&mut self.rng);
        if !network::is_well_formed(&source) || !network::is_well_formed(&destination) {
            debug!("discarding candidate with malformed address");
            return None;
        }

        if let Admission::Rejected(reason) = self.admission.check(&source) {
            self.blocked.record(reason);
            trace!("rejected {} ({:?})", source, reason);
            return None;
        }

        let service_time = self
            .rng
            .gen_range(self.config.min_service_time..=self.config.max_service_time);
        self.generated_requests += 1;
        Some(Request::new(source, destination, service_time, self.time))
    }

    fn dispatch(&mut self) {
        for server in self.servers.iter_mut() {
            if server.is_busy() || server.current().is_some() {
                continue;
            }
            let Some(req) = self.queue.pop_front() else {
                break;
            };
            match server.assign(req, self.time) {
                Ok(()) => {
                    self.dispatched_requests += 1;
                    if let Some(wait) = server.current().and_then(Request::wait_time) {
                        self.waits.record(wait);
                    }
                }
                Err(req) => self.queue.push_front(req),
            }
        }
    }

    fn advance(&mut self) {
        for server in self.servers.iter_mut() {
            server.tick();
            if server.is_done() {
                if let Some(req) = server.retrieve() {
                    self.completed_requests += 1;
                    debug!(
                        "completed {} -> {} at tick {}",
                        req.source, req.destination, self.time
                    );
                }
            }
        }
    }

    fn scale(&mut self) -> ScaleAction {
        let action = self
            .policy
            .decide(self.queue.len(), self.servers.len(), self.busy_servers());
        match action {
            ScaleAction::Up => {
                self.servers.push(Server::new());
                self.scale_ups += 1;
                self.peak_servers = self.peak_servers.max(self.servers.len());
                info!("[SCALE UP] Added server. Total: {}", self.servers.len());
            }
            ScaleAction::Down => {
                if let Some(server) = self.servers.pop() {
                    debug_assert!(server.current().is_none());
                    self.scale_downs += 1;
                    info!("[SCALE DOWN] Removed server. Total: {}", self.servers.len());
                }
            }
            ScaleAction::Hold => {}
        }
        action
    }

    /// Consumes the scheduler, reporting the requests that never finished.
    pub fn shutdown(mut self) -> Teardown {
        let in_flight = self
            .servers
            .iter_mut()
            .filter_map(Server::evict)
            .count();
        let report = Teardown {
            queued: self.queue.len(),
            in_flight,
        };
        info!(
            "Shutting down: discarded {} queued and {} in-flight requests",
            report.queued, report.in_flight
        );
        report
    }
}

impl<R> Scheduler<R> {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.time,
            queue_depth: self.queue.len(),
            busy_servers: self.busy_servers(),
            total_servers: self.servers.len(),
            blocked_requests: self.blocked.total(),
            blocked_ips: self.admission.blocked_count(),
        }
    }

    pub fn time(&self) -> u64 {
        self.time
    }

    pub fn queue_depth(&self) -> usize {
        self.queue.len()
    }

    pub fn busy_servers(&self) -> usize {
        self.servers.iter().filter(|s| s.is_busy()).count()
    }

    pub fn total_servers(&self) -> usize {
        self.servers.len()
    }

    pub fn blocked_requests(&self) -> u64 {
        self.blocked.total()
    }

    pub fn blocked_breakdown(&self) -> BlockedCounters {
        self.blocked
    }

    pub fn blocked_ip_count(&self) -> usize {
        self.admission.blocked_count()
    }

    /// Configured backlog, `initial_servers * backlog_multiplier`, whether or
    /// not every pre-fill candidate got past the firewall.
    pub fn starting_queue_size(&self) -> usize {
        self.config.starting_queue_size()
    }

    pub fn ending_queue_size(&self) -> usize {
        self.queue.len()
    }

    pub fn generated_requests(&self) -> u64 {
        self.generated_requests
    }

    pub fn dispatched_requests(&self) -> u64 {
        self.dispatched_requests
    }

    pub fn completed_requests(&self) -> u64 {
        self.completed_requests
    }

    pub fn scale_ups(&self) -> u64 {
        self.scale_ups
    }

    pub fn scale_downs(&self) -> u64 {
        self.scale_downs
    }

    pub fn peak_servers(&self) -> usize {
        self.peak_servers
    }

    pub fn wait_stats(&self) -> WaitStats {
        self.waits.stats()
    }

    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    pub fn queued(&self) -> impl Iterator<Item = &Request> {
        self.queue.iter()
    }

    pub fn admission(&self) -> &AdmissionControl {
        &self.admission
    }

    pub fn policy(&self) -> ScalingPolicy {
        self.policy
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }
}
