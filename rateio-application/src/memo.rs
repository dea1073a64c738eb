use crate::ports::BalanceCache;
use rateio_domain::{
    BalanceCalculator, DebtSimplifier, MemberBalance, MemberId, MemberTotals, Money,
    SuggestedPayment,
};
use std::{fmt::Write as _, sync::Arc};

/// Content-derived key for a memoized computation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key over every input field of a balance computation.
    pub fn balances(members: &[MemberTotals]) -> Self {
        let mut key = String::from("balances");
        for member in members {
            push_member(&mut key, &member.member_id);
            for amount in [
                member.total_paid,
                member.total_owed,
                member.paid_as_settlor,
                member.received_as_settlee,
            ] {
                push_amount(&mut key, amount);
            }
        }
        Self(key)
    }

    pub fn transactions(balances: &[MemberBalance]) -> Self {
        let mut key = String::from("transactions");
        for balance in balances {
            push_member(&mut key, &balance.member_id);
            push_amount(&mut key, balance.balance);
        }
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Ids are length-prefixed so an id containing the separator cannot forge another key.
fn push_member(key: &mut String, member_id: &MemberId) {
    let id = member_id.as_str();
    let _ = write!(key, "_{}:{id}", id.len());
}

fn push_amount(key: &mut String, amount: Money) {
    let _ = write!(key, "_{}", amount.as_decimal().normalize());
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedValue {
    Balances(Arc<Vec<MemberBalance>>),
    Payments(Arc<Vec<SuggestedPayment>>),
}

/// Balance and payment computation with an optional cache in front.
#[derive(Clone, Copy)]
pub struct MemoizedEngine<'a> {
    cache: Option<&'a dyn BalanceCache>,
}

impl<'a> MemoizedEngine<'a> {
    pub fn new(cache: Option<&'a dyn BalanceCache>) -> Self {
        Self { cache }
    }

    pub fn uncached() -> Self {
        Self { cache: None }
    }

    pub fn compute_balances(&self, members: &[MemberTotals]) -> Arc<Vec<MemberBalance>> {
        let Some(cache) = self.cache else {
            return Arc::new(BalanceCalculator.compute_balances(members));
        };

        let key = CacheKey::balances(members);
        if let Some(CachedValue::Balances(balances)) = cache.get(&key) {
            tracing::trace!(member_count = members.len(), "Balance cache hit");
            return balances;
        }

        let balances = Arc::new(BalanceCalculator.compute_balances(members));
        cache.set(key, CachedValue::Balances(Arc::clone(&balances)));
        balances
    }

    pub fn simplify(&self, balances: &[MemberBalance]) -> Arc<Vec<SuggestedPayment>> {
        let Some(cache) = self.cache else {
            return Arc::new(DebtSimplifier.simplify(balances));
        };

        let key = CacheKey::transactions(balances);
        if let Some(CachedValue::Payments(payments)) = cache.get(&key) {
            tracing::trace!(member_count = balances.len(), "Payment cache hit");
            return payments;
        }

        let payments = Arc::new(DebtSimplifier.simplify(balances));
        cache.set(key, CachedValue::Payments(Arc::clone(&payments)));
        payments
    }

    /// Drops every memoized result. A no-op without a cache.
    pub fn clear(&self) {
        if let Some(cache) = self.cache {
            cache.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn totals(id: &str, paid: i64, owed: i64, settlor: i64, settlee: i64) -> MemberTotals {
        MemberTotals {
            member_id: MemberId::from(id),
            total_paid: Money::from_cents(paid),
            total_owed: Money::from_cents(owed),
            paid_as_settlor: Money::from_cents(settlor),
            received_as_settlee: Money::from_cents(settlee),
        }
    }

    #[test]
    fn balances_key_covers_every_field() {
        let key = CacheKey::balances(&[totals("ana", 1000, 250, 0, 125)]);

        assert_eq!(key.as_str(), "balances_3:ana_10_2.5_0_1.25");
    }

    #[rstest]
    #[case::settlor_differs(totals("a", 100, 50, 10, 0), totals("a", 100, 50, 0, 0))]
    #[case::settlee_differs(totals("a", 100, 50, 0, 10), totals("a", 100, 50, 0, 0))]
    #[case::member_differs(totals("a", 100, 50, 0, 0), totals("b", 100, 50, 0, 0))]
    fn keys_differ_when_inputs_differ(#[case] left: MemberTotals, #[case] right: MemberTotals) {
        assert_ne!(CacheKey::balances(&[left]), CacheKey::balances(&[right]));
    }

    #[test]
    fn separator_inside_id_does_not_collide() {
        let joined = CacheKey::transactions(&[MemberBalance {
            member_id: MemberId::from("a_1"),
            total_paid: Money::ZERO,
            total_owed: Money::ZERO,
            settlement_adjustment: Money::ZERO,
            balance: Money::from_cents(200),
        }]);
        let split = CacheKey::transactions(&[MemberBalance {
            member_id: MemberId::from("a"),
            total_paid: Money::ZERO,
            total_owed: Money::ZERO,
            settlement_adjustment: Money::ZERO,
            balance: Money::from_cents(100),
        }]);

        assert_ne!(joined, split);
    }

    #[test]
    fn trailing_zeros_share_a_key() {
        let scaled = MemberTotals {
            total_paid: Money::new(10_000, 3),
            ..totals("a", 0, 0, 0, 0)
        };

        assert_eq!(
            CacheKey::balances(&[scaled]),
            CacheKey::balances(&[totals("a", 1000, 0, 0, 0)])
        );
    }
}
