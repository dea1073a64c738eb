use crate::model::{MemberBalance, MemberTotals, Money};

/// Turns per-member totals into signed net balances.
pub struct BalanceCalculator;

impl BalanceCalculator {
    /// Computes one balance per input, preserving input order.
    ///
    /// `balance = round2(total_paid - total_owed + paid_as_settlor - received_as_settlee)`.
    /// Rounding happens once, after the whole expression is evaluated.
    ///
    /// # Arguments
    /// * `members` - Validated, non-negative totals per member
    ///
    /// # Returns
    /// Balances in the same order as `members`
    pub fn compute_balances(&self, members: &[MemberTotals]) -> Vec<MemberBalance> {
        let balances: Vec<MemberBalance> = members.iter().map(Self::balance_of).collect();

        tracing::debug!(
            member_count = balances.len(),
            net_total = %balances.iter().map(|b| b.balance).sum::<Money>(),
            "Member balances computed"
        );

        balances
    }

    fn balance_of(totals: &MemberTotals) -> MemberBalance {
        let settlement_adjustment = totals.settlement_adjustment();
        let balance =
            (totals.total_paid - totals.total_owed + settlement_adjustment).round2();

        MemberBalance {
            member_id: totals.member_id.clone(),
            total_paid: totals.total_paid,
            total_owed: totals.total_owed,
            settlement_adjustment,
            balance,
        }
    }
}

/// Re-rounds every balance to cents. Other fields are left untouched.
pub fn normalize_balances(balances: &[MemberBalance]) -> Vec<MemberBalance> {
    balances
        .iter()
        .map(|balance| MemberBalance {
            balance: balance.balance.round2(),
            ..balance.clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MemberId;
    use rstest::{fixture, rstest};
    use rust_decimal_macros::dec;

    #[fixture]
    fn calculator() -> BalanceCalculator {
        BalanceCalculator
    }

    fn totals(id: &str, paid: i64, owed: i64, settlor: i64, settlee: i64) -> MemberTotals {
        MemberTotals {
            member_id: MemberId::from(id),
            total_paid: Money::from_cents(paid),
            total_owed: Money::from_cents(owed),
            paid_as_settlor: Money::from_cents(settlor),
            received_as_settlee: Money::from_cents(settlee),
        }
    }

    #[rstest]
    #[case::creditor(totals("a", 3000, 1000, 0, 0), 2000)]
    #[case::debtor(totals("b", 0, 1000, 0, 0), -1000)]
    #[case::settlor_cancels_debt(totals("b", 0, 1000, 1000, 0), 0)]
    #[case::settlee_cancels_credit(totals("a", 3000, 1000, 0, 2000), 0)]
    #[case::all_zero(totals("c", 0, 0, 0, 0), 0)]
    fn balance_formula(
        calculator: BalanceCalculator,
        #[case] input: MemberTotals,
        #[case] expected_cents: i64,
    ) {
        let result = calculator.compute_balances(std::slice::from_ref(&input));

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].member_id, input.member_id);
        assert_eq!(result[0].balance, Money::from_cents(expected_cents));
        assert_eq!(result[0].total_paid, input.total_paid);
        assert_eq!(result[0].total_owed, input.total_owed);
        assert_eq!(result[0].settlement_adjustment, input.settlement_adjustment());
    }

    #[rstest]
    fn preserves_input_order(calculator: BalanceCalculator) {
        let input = [
            totals("z", 0, 500, 0, 0),
            totals("a", 1000, 0, 0, 0),
            totals("m", 0, 500, 0, 0),
        ];

        let ids: Vec<String> = calculator
            .compute_balances(&input)
            .into_iter()
            .map(|b| b.member_id.to_string())
            .collect();

        assert_eq!(ids, ["z", "a", "m"]);
    }

    #[rstest]
    fn rounds_once_at_the_end(calculator: BalanceCalculator) {
        // 0.004 + 0.004 would round to 0.00 twice if rounded per term.
        let input = MemberTotals {
            member_id: MemberId::from("a"),
            total_paid: Money::from_decimal(dec!(0.004)),
            total_owed: Money::ZERO,
            paid_as_settlor: Money::from_decimal(dec!(0.004)),
            received_as_settlee: Money::ZERO,
        };

        let result = calculator.compute_balances(&[input]);

        assert_eq!(result[0].balance, Money::from_cents(1));
    }

    #[rstest]
    fn empty_input_yields_empty_output(calculator: BalanceCalculator) {
        assert!(calculator.compute_balances(&[]).is_empty());
    }

    #[test]
    fn normalize_rounds_balance_only() {
        let balance = MemberBalance {
            member_id: MemberId::from("a"),
            total_paid: Money::from_decimal(dec!(1.005)),
            total_owed: Money::ZERO,
            settlement_adjustment: Money::ZERO,
            balance: Money::from_decimal(dec!(1.005)),
        };

        let normalized = normalize_balances(&[balance]);

        assert_eq!(normalized[0].balance, Money::from_cents(101));
        assert_eq!(normalized[0].total_paid, Money::from_decimal(dec!(1.005)));
    }
}
