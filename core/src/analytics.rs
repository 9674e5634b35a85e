use std::collections::VecDeque;
use std::fmt;

use hdrhistogram::Histogram;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::engine::{Scheduler, Snapshot};
use crate::traits::Observer;

/// Queueing delay (dispatch tick minus arrival tick) of every dispatched request.
pub struct WaitRecorder {
    histogram: Histogram<u64>,
}

impl WaitRecorder {
    pub fn new() -> Self {
        Self {
            // Auto-resizing; 3 significant figures is always a valid precision.
            histogram: Histogram::new(3).expect("valid histogram precision"),
        }
    }

    pub fn record(&mut self, wait: u64) {
        if let Err(e) = self.histogram.record(wait) {
            warn!("dropping wait sample {}: {}", wait, e);
        }
    }

    pub fn stats(&self) -> WaitStats {
        let h = &self.histogram;
        if h.is_empty() {
            return WaitStats::default();
        }
        WaitStats {
            count: h.len(),
            mean: h.mean(),
            p50: h.value_at_quantile(0.50),
            p99: h.value_at_quantile(0.99),
            max: h.max(),
        }
    }
}

impl Default for WaitRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WaitStats {
    pub count: u64,
    pub mean: f64,
    pub p50: u64,
    pub p99: u64,
    pub max: u64,
}

/// Keeps every `sample_every`-th snapshot, bounded to `max_points`.
pub struct MetricsCollector {
    pub history: VecDeque<Snapshot>,
    pub max_points: usize,
    pub sample_every: u64,
    last: Option<Snapshot>,
}

impl MetricsCollector {
    pub fn new(max_points: usize, sample_every: u64) -> Self {
        Self {
            history: VecDeque::with_capacity(max_points.min(1024)),
            max_points,
            sample_every: sample_every.max(1),
            last: None,
        }
    }

    pub fn update(&mut self, snapshot: &Snapshot) {
        self.last = Some(*snapshot);
        if snapshot.tick % self.sample_every != 0 {
            return;
        }
        self.push(*snapshot);
    }

    /// Sampled history plus the most recent snapshot if it fell between samples.
    pub fn finish(&mut self) -> &VecDeque<Snapshot> {
        if let Some(last) = self.last {
            if self.history.back().map(|s| s.tick) != Some(last.tick) {
                self.push(last);
            }
        }
        &self.history
    }

    pub fn latest(&self) -> Option<Snapshot> {
        self.last
    }

    pub fn peak_queue_depth(&self) -> usize {
        self.history.iter().map(|s| s.queue_depth).max().unwrap_or(0)
    }

    fn push(&mut self, snapshot: Snapshot) {
        self.history.push_back(snapshot);
        if self.history.len() > self.max_points {
            self.history.pop_front();
        }
    }
}

impl Observer for MetricsCollector {
    fn on_cycle(&mut self, snapshot: &Snapshot) {
        self.update(snapshot);
    }
}

/// End-of-run figures, rendered in the layout of the summary log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub initial_servers: usize,
    pub max_servers: usize,
    pub cycles: u64,
    pub min_service_time: u32,
    pub max_service_time: u32,
    pub starting_queue_size: usize,
    pub ending_queue_size: usize,
    pub total_servers: usize,
    pub busy_servers: usize,
    pub blocked_requests: u64,
    pub blocked_ips: usize,
    pub completed_requests: u64,
    pub scale_ups: u64,
    pub scale_downs: u64,
    pub wait: WaitStats,
}

impl Summary {
    pub fn from_scheduler<R>(scheduler: &Scheduler<R>) -> Self {
        let config = scheduler.config();
        Self {
            initial_servers: config.initial_servers,
            max_servers: config.max_servers,
            cycles: scheduler.time(),
            min_service_time: config.min_service_time,
            max_service_time: config.max_service_time,
            starting_queue_size: scheduler.starting_queue_size(),
            ending_queue_size: scheduler.ending_queue_size(),
            total_servers: scheduler.total_servers(),
            busy_servers: scheduler.busy_servers(),
            blocked_requests: scheduler.blocked_requests(),
            blocked_ips: scheduler.blocked_ip_count(),
            completed_requests: scheduler.completed_requests(),
            scale_ups: scheduler.scale_ups(),
            scale_downs: scheduler.scale_downs(),
            wait: scheduler.wait_stats(),
        }
    }

    /// Positive when the backlog shrank.
    pub fn queue_change(&self) -> i64 {
        self.starting_queue_size as i64 - self.ending_queue_size as i64
    }

    pub fn average_queue_size(&self) -> usize {
        (self.starting_queue_size + self.ending_queue_size) / 2
    }

    pub fn utilization_pct(&self) -> f64 {
        if self.total_servers == 0 {
            return 0.0;
        }
        self.busy_servers as f64 / self.total_servers as f64 * 100.0
    }

    pub fn firewall_pct(&self) -> f64 {
        let seen =
            self.blocked_requests + self.ending_queue_size as u64 + self.starting_queue_size as u64;
        if seen == 0 {
            return 0.0;
        }
        self.blocked_requests as f64 / seen as f64 * 100.0
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "===== Load Balancer Simulation Summary =====")?;
        writeln!(f, "Simulation Parameters:")?;
        writeln!(f, "- Number of servers: {}", self.initial_servers)?;
        writeln!(f, "- Maximum servers allowed: {}", self.max_servers)?;
        writeln!(f, "- Total cycles: {}", self.cycles)?;
        writeln!(
            f,
            "- Request processing time range: {}-{} clock cycles\n",
            self.min_service_time, self.max_service_time
        )?;

        writeln!(f, "Simulation Results:")?;
        writeln!(f, "- Starting queue size: {}", self.starting_queue_size)?;
        writeln!(f, "- Ending queue size: {}", self.ending_queue_size)?;
        writeln!(f, "- Final total servers: {}", self.total_servers)?;
        writeln!(f, "- Final busy servers: {}", self.busy_servers)?;
        writeln!(f, "- Queue change: {} requests", self.queue_change())?;
        writeln!(f, "- Blocked requests: {}", self.blocked_requests)?;
        writeln!(f, "- Blocked IP addresses: {}", self.blocked_ips)?;
        writeln!(f, "- Completed requests: {}", self.completed_requests)?;
        writeln!(f, "- Scale ups / downs: {} / {}", self.scale_ups, self.scale_downs)?;

        writeln!(f, "\nPerformance Metrics:")?;
        writeln!(f, "- Average queue size: {}", self.average_queue_size())?;
        writeln!(f, "- Server utilization: {:.2}%", self.utilization_pct())?;
        writeln!(
            f,
            "- Firewall effectiveness: {:.2}% requests blocked",
            self.firewall_pct()
        )?;
        writeln!(
            f,
            "- Queue wait (cycles): mean {:.2}, p50 {}, p99 {}, max {}",
            self.wait.mean, self.wait.p50, self.wait.p99, self.wait.max
        )?;

        write!(f, "\nSimulation completed successfully!")
    }
}
