use crate::common::TestHarness;
use lbsim_core::{MetricsCollector, SimConfig, Summary, WaitRecorder};

#[test]
fn test_wait_stats_cover_every_dispatch() {
    let mut h = TestHarness::new(SimConfig::new(2, 4));
    h.run_for(500);
    let stats = h.sched.wait_stats();
    assert_eq!(stats.count, h.sched.dispatched_requests());
    assert!(stats.p50 <= stats.p99);
    assert!(stats.p99 <= stats.max);
    // Backlog requests arrive at tick 0 and wait at least one cycle.
    assert!(stats.max >= 1);
}

#[test]
fn test_wait_recorder_empty_and_filled() {
    let mut w = WaitRecorder::new();
    assert_eq!(w.stats().count, 0);
    for v in [0, 2, 4, 6, 8] {
        w.record(v);
    }
    let s = w.stats();
    assert_eq!(s.count, 5);
    assert_eq!(s.max, 8);
    assert!((s.mean - 4.0).abs() < 0.01);
}

#[test]
fn test_collector_samples_and_keeps_last() {
    let mut h = TestHarness::new(SimConfig::new(1, 2));
    let mut m = MetricsCollector::new(100, 100);
    for _ in 0..250 {
        let s = h.sched.tick();
        m.update(&s);
    }
    let ticks: Vec<u64> = m.finish().iter().map(|s| s.tick).collect();
    assert_eq!(ticks, vec![100, 200, 250]);
    assert_eq!(m.latest().map(|s| s.tick), Some(250));
}

#[test]
fn test_collector_is_bounded() {
    let mut h = TestHarness::new(SimConfig::new(1, 2));
    let mut m = MetricsCollector::new(3, 1);
    h.sched.run(10, &mut m);
    assert_eq!(m.history.len(), 3);
    assert_eq!(m.history.front().map(|s| s.tick), Some(8));
}

#[test]
fn test_summary_figures() {
    let mut h = TestHarness::new(SimConfig::new(2, 4));
    h.run_for(300);
    let summary = Summary::from_scheduler(&h.sched);

    assert_eq!(summary.cycles, 300);
    assert_eq!(summary.starting_queue_size, 200);
    assert_eq!(summary.ending_queue_size, h.sched.queue_depth());
    assert_eq!(
        summary.queue_change(),
        200 - h.sched.queue_depth() as i64
    );
    assert_eq!(
        summary.average_queue_size(),
        (200 + h.sched.queue_depth()) / 2
    );
    assert!((0.0..=100.0).contains(&summary.utilization_pct()));
    assert!((0.0..100.0).contains(&summary.firewall_pct()));

    let text = summary.to_string();
    assert!(text.starts_with("===== Load Balancer Simulation Summary ====="));
    assert!(text.contains("- Starting queue size: 200"));
    assert!(text.contains("- Request processing time range: 1-10 clock cycles"));
    assert!(text.ends_with("Simulation completed successfully!"));
}
