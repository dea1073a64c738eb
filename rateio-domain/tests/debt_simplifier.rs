use proptest::prelude::*;
use rateio_domain::{DebtSimplifier, MemberId, Money, SuggestedPayment};
use rust_decimal::Decimal;
use std::collections::HashMap;

const NAMES: [&str; 8] = ["a", "b", "c", "d", "e", "f", "g", "h"];

/// Balances that sum to zero, built from even cent amounts so no member sits
/// exactly on the one-cent tolerance.
fn closed_balances(values: &[i64]) -> Vec<(MemberId, Money)> {
    let mut balances = Vec::with_capacity(values.len() + 1);
    let mut sum = 0i64;
    for (idx, value) in values.iter().enumerate() {
        let cents = value * 2;
        sum += cents;
        balances.push((MemberId::from(NAMES[idx]), Money::from_cents(cents)));
    }
    balances.push((MemberId::from(NAMES[values.len()]), Money::from_cents(-sum)));
    balances
}

fn net_received(payments: &[SuggestedPayment]) -> HashMap<MemberId, Money> {
    let mut net: HashMap<MemberId, Money> = HashMap::new();
    for payment in payments {
        *net.entry(payment.to.clone()).or_default() += payment.amount;
        *net.entry(payment.from.clone()).or_default() -= payment.amount;
    }
    net
}

proptest! {
    #[test]
    fn payments_zero_every_balance(values in prop::collection::vec(-25_000i64..=25_000, 1..=7)) {
        let balances = closed_balances(&values);
        let payments = DebtSimplifier.simplify(&balances);
        let net = net_received(&payments);

        for (member, balance) in &balances {
            let received = net.get(member).copied().unwrap_or_default();
            prop_assert_eq!(received, *balance, "member {}", member);
        }
    }

    #[test]
    fn payments_stay_within_tolerance_for_any_input(
        values in prop::collection::vec(-50_000i64..=50_000, 1..=8),
    ) {
        let balances: Vec<(MemberId, Money)> = values
            .iter()
            .enumerate()
            .map(|(idx, cents)| (MemberId::from(NAMES[idx]), Money::from_cents(*cents)))
            .collect();
        let total: Money = balances.iter().map(|(_, balance)| *balance).sum();
        let payments = DebtSimplifier.simplify(&balances);
        let net = net_received(&payments);
        let tolerance = total.abs() + Money::EPSILON * Decimal::from(balances.len());

        for (member, balance) in &balances {
            let received = net.get(member).copied().unwrap_or_default();
            prop_assert!((received - *balance).abs() <= tolerance, "member {}", member);
        }
    }

    #[test]
    fn output_is_deterministic(values in prop::collection::vec(-25_000i64..=25_000, 1..=7)) {
        let balances = closed_balances(&values);

        prop_assert_eq!(DebtSimplifier.simplify(&balances), DebtSimplifier.simplify(&balances));
    }

    #[test]
    fn payments_are_positive_and_never_to_self(
        values in prop::collection::vec(-25_000i64..=25_000, 1..=7),
    ) {
        let balances = closed_balances(&values);

        for payment in DebtSimplifier.simplify(&balances) {
            prop_assert_ne!(&payment.from, &payment.to);
            prop_assert!(payment.amount > Money::EPSILON);
            prop_assert_eq!(payment.amount, payment.amount.round2());
        }
    }

    #[test]
    fn payment_count_is_bounded(values in prop::collection::vec(-25_000i64..=25_000, 1..=7)) {
        let balances = closed_balances(&values);
        let creditors = balances.iter().filter(|(_, b)| *b > Money::EPSILON).count();
        let debtors = balances.iter().filter(|(_, b)| *b < -Money::EPSILON).count();

        let payments = DebtSimplifier.simplify(&balances);

        if creditors == 0 || debtors == 0 {
            prop_assert!(payments.is_empty());
        } else {
            prop_assert!(payments.len() < creditors + debtors);
        }
    }

    #[test]
    fn settled_balances_produce_nothing(values in prop::collection::vec(-1i64..=1, 0..=8)) {
        let balances: Vec<(MemberId, Money)> = values
            .iter()
            .enumerate()
            .map(|(idx, cents)| (MemberId::from(NAMES[idx]), Money::from_cents(*cents)))
            .collect();

        prop_assert!(DebtSimplifier.simplify(&balances).is_empty());
    }
}
