//! Tests for per-account admission control.

use qrgate_core::AccountId;
use qrgate_rate_limit::{Admission, AdmissionRegistry, RatePolicy};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

fn registry(capacity: u32, refill: Duration) -> AdmissionRegistry {
    AdmissionRegistry::new(RatePolicy::new(capacity, refill).unwrap()).unwrap()
}

#[test]
fn test_capacity_bounds_burst() {
    let registry = registry(10, Duration::from_secs(60));
    let account = AccountId::new(1);

    let admitted = (0..25).filter(|_| registry.admit(account)).count();
    assert_eq!(admitted, 10);

    match registry.check(account) {
        Admission::Rejected { retry_after } => {
            assert!(retry_after > Duration::ZERO);
            assert!(retry_after <= Duration::from_secs(60));
        }
        Admission::Admitted => panic!("bucket should be empty"),
    }
}

#[test]
fn test_accounts_are_independent() {
    let registry = registry(2, Duration::from_secs(60));
    let first = AccountId::new(1);
    let second = AccountId::new(2);

    assert!(registry.admit(first));
    assert!(registry.admit(first));
    assert!(!registry.admit(first));

    assert!(registry.admit(second));
    assert!(registry.admit(second));
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_concurrent_admission_shares_one_bucket() {
    let registry = Arc::new(registry(10, Duration::from_secs(60)));
    let account = AccountId::new(42);
    let admitted = Arc::new(AtomicUsize::new(0));

    std::thread::scope(|scope| {
        for _ in 0..16 {
            let registry = Arc::clone(&registry);
            let admitted = Arc::clone(&admitted);
            scope.spawn(move || {
                for _ in 0..8 {
                    if registry.admit(account) {
                        admitted.fetch_add(1, Ordering::SeqCst);
                    }
                }
            });
        }
    });

    assert_eq!(admitted.load(Ordering::SeqCst), 10);
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_tokens_refill_over_time() {
    let registry = registry(1, Duration::from_millis(50));
    let account = AccountId::new(3);

    assert!(registry.admit(account));
    assert!(!registry.admit(account));
    std::thread::sleep(Duration::from_millis(80));
    assert!(registry.admit(account));
}

#[test]
fn test_prune_drops_refilled_buckets() {
    let registry = registry(1, Duration::from_millis(10));
    for id in 0..50 {
        registry.admit(AccountId::new(id));
    }
    assert_eq!(registry.len(), 50);

    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(registry.prune(), 0);
    assert!(registry.is_empty());
}

#[test]
fn test_prune_keeps_active_buckets() {
    let registry = registry(5, Duration::from_secs(60));
    let account = AccountId::new(9);
    for _ in 0..5 {
        assert!(registry.admit(account));
    }
    registry.prune();
    assert!(!registry.admit(account));
}
