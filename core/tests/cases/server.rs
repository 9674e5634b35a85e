use crate::common::request;
use lbsim_core::Server;

#[test]
fn test_three_cycle_request_lifecycle() {
    let mut s = Server::new();
    let t = 17;
    s.assign(request(3), t).unwrap();

    // T
    assert!(s.is_busy());
    assert_eq!(s.remaining(), 3);
    s.tick();
    // T+1
    assert!(s.is_busy());
    assert!(!s.is_done());
    s.tick();
    // T+2
    assert!(s.is_busy());
    s.tick();
    // T+3
    assert!(!s.is_busy());
    assert!(s.is_done());
    assert_eq!(s.remaining(), 0);

    let done = s.retrieve().expect("finished request");
    assert_eq!(done.service_time, 3);
    assert_eq!(done.assigned_tick, Some(t));
    assert!(done.completed);

    assert!(!s.is_busy());
    assert!(!s.is_done());
    assert!(s.current().is_none());
    assert!(s.retrieve().is_none(), "request must not be retrieved twice");
}

#[test]
fn test_idle_implies_zero_remaining_throughout() {
    let mut s = Server::new();
    for duration in [1, 4, 10] {
        s.assign(request(duration), 0).unwrap();
        for _ in 0..duration + 2 {
            if !s.is_busy() {
                assert_eq!(s.remaining(), 0);
            }
            s.tick();
        }
        assert!(s.retrieve().is_some());
    }
}

#[test]
fn test_unretrieved_request_blocks_new_assignment() {
    let mut s = Server::new();
    s.assign(request(1), 0).unwrap();
    s.tick();
    assert!(s.is_done());
    let bounced = s.assign(request(2), 1).unwrap_err();
    assert_eq!(bounced.service_time, 2);
    assert_eq!(bounced.assigned_tick, None);
    assert!(s.retrieve().is_some());
    assert!(s.assign(bounced, 1).is_ok());
}
