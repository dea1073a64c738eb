use proptest::prelude::*;
use rateio_application::{BalanceCache, CacheKey, CachedValue, MemoizedEngine};
use rateio_domain::{MemberId, MemberTotals, Money};
use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

#[derive(Default)]
struct RecordingCache {
    entries: Mutex<HashMap<CacheKey, CachedValue>>,
    hits: AtomicUsize,
}

impl RecordingCache {
    fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }
}

impl BalanceCache for RecordingCache {
    fn get(&self, key: &CacheKey) -> Option<CachedValue> {
        let value = self.entries.lock().ok()?.get(key).cloned();
        if value.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        value
    }

    fn set(&self, key: CacheKey, value: CachedValue) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key, value);
        }
    }

    fn sweep(&self) -> usize {
        0
    }

    fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }
}

fn totals(values: &[(i64, i64, i64, i64)]) -> Vec<MemberTotals> {
    values
        .iter()
        .enumerate()
        .map(|(idx, (paid, owed, settlor, settlee))| MemberTotals {
            member_id: MemberId::from(format!("m{idx}")),
            total_paid: Money::from_cents(*paid),
            total_owed: Money::from_cents(*owed),
            paid_as_settlor: Money::from_cents(*settlor),
            received_as_settlee: Money::from_cents(*settlee),
        })
        .collect()
}

#[test]
fn second_call_is_served_from_cache() {
    let cache = RecordingCache::default();
    let engine = MemoizedEngine::new(Some(&cache));
    let members = totals(&[(3000, 1000, 0, 0), (0, 1000, 0, 0), (0, 1000, 0, 0)]);

    let first = engine.compute_balances(&members);
    let second = engine.compute_balances(&members);
    let payments = engine.simplify(&first);
    let payments_again = engine.simplify(&second);

    assert_eq!(first, second);
    assert_eq!(payments, payments_again);
    assert_eq!(cache.hits(), 2);
    assert_eq!(cache.len(), 2);
}

#[test]
fn settlement_change_is_not_served_stale() {
    let cache = RecordingCache::default();
    let engine = MemoizedEngine::new(Some(&cache));

    let before = engine.compute_balances(&totals(&[(2000, 1000, 0, 0), (0, 1000, 0, 0)]));
    let after = engine.compute_balances(&totals(&[(2000, 1000, 0, 1000), (0, 1000, 1000, 0)]));

    assert_eq!(cache.hits(), 0);
    assert_ne!(before, after);
    assert!(after.iter().all(|balance| balance.balance.is_zero()));
}

#[test]
fn clear_empties_cache() {
    let cache = RecordingCache::default();
    let engine = MemoizedEngine::new(Some(&cache));
    engine.compute_balances(&totals(&[(100, 100, 0, 0)]));

    engine.clear();

    assert!(cache.is_empty());
}

proptest! {
    #[test]
    fn cached_and_uncached_results_match(
        values in prop::collection::vec(
            (0i64..=100_000, 0i64..=100_000, 0i64..=10_000, 0i64..=10_000),
            0..=6,
        ),
    ) {
        let members = totals(&values);
        let cache = RecordingCache::default();
        let cached = MemoizedEngine::new(Some(&cache));
        let uncached = MemoizedEngine::uncached();

        let balances = uncached.compute_balances(&members);
        prop_assert_eq!(cached.compute_balances(&members), balances.clone());
        prop_assert_eq!(cached.compute_balances(&members), balances.clone());
        prop_assert_eq!(cached.simplify(&balances), uncached.simplify(&balances));
        prop_assert_eq!(cached.simplify(&balances), uncached.simplify(&balances));
    }
}
