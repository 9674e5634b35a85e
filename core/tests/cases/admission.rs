use lbsim_core::{Admission, AdmissionControl, RejectReason};

#[test]
fn test_private_range_always_rejected_without_counting() {
    let mut ac = AdmissionControl::default();
    for _ in 0..200 {
        assert_eq!(
            ac.check("192.168.1.5"),
            Admission::Rejected(RejectReason::BlockedRange)
        );
    }
    assert_eq!(ac.request_count("192.168.1.5"), 0);
    assert_eq!(ac.tracked_addresses(), 0);
    assert!(!ac.is_blocked("192.168.1.5"));
    assert_eq!(ac.blocked_count(), 0);
}

#[test]
fn test_loopback_and_ten_net_rejected() {
    let mut ac = AdmissionControl::default();
    assert!(!ac.check("127.0.0.1").is_accepted());
    assert!(!ac.check("10.20.30.40").is_accepted());
    // Prefixes are textual: 100.x is public.
    assert!(ac.check("100.20.30.40").is_accepted());
    assert!(ac.check("192.169.0.1").is_accepted());
}

#[test]
fn test_rate_limit_blocks_on_threshold_plus_one() {
    let mut ac = AdmissionControl::new(50, vec!["10.".into(), "127.".into(), "192.168.".into()]);
    for i in 1..=50 {
        assert_eq!(ac.check("8.8.8.8"), Admission::Accepted, "check {} rejected", i);
    }
    assert!(!ac.is_blocked("8.8.8.8"));

    assert_eq!(
        ac.check("8.8.8.8"),
        Admission::Rejected(RejectReason::RateLimited)
    );
    assert!(ac.is_blocked("8.8.8.8"));
    assert_eq!(ac.request_count("8.8.8.8"), 51);

    assert_eq!(
        ac.check("8.8.8.8"),
        Admission::Rejected(RejectReason::Blocklisted)
    );
    // Blocked-set rejections do not consume budget.
    assert_eq!(ac.request_count("8.8.8.8"), 51);
    assert_eq!(ac.blocked_count(), 1);
}

#[test]
fn test_blocking_is_permanent() {
    let mut ac = AdmissionControl::new(1, Vec::new());
    assert!(ac.check("1.2.3.4").is_accepted());
    assert!(!ac.check("1.2.3.4").is_accepted());
    for _ in 0..100 {
        assert_eq!(
            ac.check("1.2.3.4"),
            Admission::Rejected(RejectReason::Blocklisted)
        );
    }
    assert_eq!(ac.blocked_count(), 1);
}

#[test]
fn test_addresses_have_independent_budgets() {
    let mut ac = AdmissionControl::new(2, Vec::new());
    assert!(ac.check("1.1.1.1").is_accepted());
    assert!(ac.check("1.1.1.1").is_accepted());
    assert!(!ac.check("1.1.1.1").is_accepted());
    assert!(ac.check("2.2.2.2").is_accepted());
    assert_eq!(ac.request_count("2.2.2.2"), 1);
    assert_eq!(ac.tracked_addresses(), 2);
}

#[test]
fn test_custom_ranges() {
    let mut ac = AdmissionControl::new(50, vec!["203.0.113.".into()]);
    assert_eq!(
        ac.check("203.0.113.9"),
        Admission::Rejected(RejectReason::BlockedRange)
    );
    // Defaults are replaced, not extended.
    assert!(ac.check("10.0.0.1").is_accepted());
}
