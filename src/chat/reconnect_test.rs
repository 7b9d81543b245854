use super::*;

fn policy(max_attempts: u32, jitter: bool) -> ReconnectPolicy {
    ReconnectPolicy {
        max_attempts,
        base_delay: Duration::from_millis(100),
        max_delay: Duration::from_millis(1000),
        jitter,
    }
}

#[test]
fn default_is_disabled() {
    let p = ReconnectPolicy::default();
    assert!(!p.is_enabled());
    assert!(!p.allows(0));
}

#[test]
fn allows_counts_attempts() {
    let p = policy(3, false);
    assert!(p.allows(0));
    assert!(p.allows(2));
    assert!(!p.allows(3));
}

#[test]
fn backoff_doubles_then_caps() {
    let p = policy(10, false);
    assert_eq!(p.backoff(0), Duration::from_millis(100));
    assert_eq!(p.backoff(1), Duration::from_millis(200));
    assert_eq!(p.backoff(3), Duration::from_millis(800));
    assert_eq!(p.backoff(4), Duration::from_millis(1000));
    assert_eq!(p.backoff(40), Duration::from_millis(1000));
}

#[test]
fn delay_without_jitter_equals_backoff() {
    let p = policy(5, false);
    assert_eq!(p.delay(2), p.backoff(2));
}

#[test]
fn jittered_delay_stays_in_upper_half() {
    let p = policy(5, true);
    for attempt in 0..6 {
        let ceiling = p.backoff(attempt);
        for _ in 0..50 {
            let d = p.delay(attempt);
            assert!(d <= ceiling, "{d:?} > {ceiling:?}");
            assert!(d >= ceiling / 2, "{d:?} < half of {ceiling:?}");
        }
    }
}
