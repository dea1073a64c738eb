use crate::model::{BalanceEntry, MemberId, Money, SuggestedPayment};

/// Greedy settlement of signed balances.
///
/// Creditors and debtors are each sorted largest-first and matched with two
/// pointers. Every step fully clears at least one side, so the result holds at
/// most `creditors + debtors - 1` payments. This is not a minimum-transaction
/// solver; it is deterministic for a given input order.
pub struct DebtSimplifier;

struct Position {
    member_id: MemberId,
    remaining: Money,
}

impl DebtSimplifier {
    /// Suggests payments that, if all executed, zero every balance.
    ///
    /// Members within [`Money::EPSILON`] of zero are treated as settled.
    /// Payments are emitted creditor-major, in pointer order.
    pub fn simplify<B: BalanceEntry>(&self, balances: &[B]) -> Vec<SuggestedPayment> {
        let mut creditors = Self::creditors(balances);
        let mut debtors = Self::debtors(balances);

        if creditors.is_empty() || debtors.is_empty() {
            tracing::debug!(
                creditor_count = creditors.len(),
                debtor_count = debtors.len(),
                "Nothing to simplify"
            );
            return Vec::new();
        }

        let mut payments = Vec::with_capacity(creditors.len() + debtors.len() - 1);
        let (mut i, mut j) = (0, 0);

        while i < creditors.len() && j < debtors.len() {
            let creditor = &mut creditors[i];
            let debtor = &mut debtors[j];

            let amount = creditor.remaining.min(debtor.remaining).round2();

            if amount > Money::EPSILON {
                payments.push(SuggestedPayment {
                    from: debtor.member_id.clone(),
                    to: creditor.member_id.clone(),
                    amount,
                });

                creditor.remaining = (creditor.remaining - amount).round2();
                debtor.remaining = (debtor.remaining - amount).round2();
            }

            if creditor.remaining <= Money::EPSILON {
                i += 1;
            }
            if debtor.remaining <= Money::EPSILON {
                j += 1;
            }
        }

        let residual: Money = creditors
            .iter()
            .skip(i)
            .chain(debtors.iter().skip(j))
            .map(|position| position.remaining)
            .sum();
        if !residual.is_zero() {
            tracing::trace!(
                residual = %residual,
                "Dropped unmatched residual after simplification"
            );
        }

        tracing::debug!(
            creditor_count = creditors.len(),
            debtor_count = debtors.len(),
            payment_count = payments.len(),
            "Debts simplified"
        );

        payments
    }

    fn creditors<B: BalanceEntry>(balances: &[B]) -> Vec<Position> {
        let mut creditors: Vec<&B> = balances
            .iter()
            .filter(|entry| entry.balance() > Money::EPSILON)
            .collect();
        // Stable: equal balances keep input order.
        creditors.sort_by(|a, b| b.balance().cmp(&a.balance()));

        creditors
            .into_iter()
            .map(|entry| Position {
                member_id: entry.member_id().clone(),
                remaining: entry.balance().round2(),
            })
            .collect()
    }

    fn debtors<B: BalanceEntry>(balances: &[B]) -> Vec<Position> {
        let mut debtors: Vec<&B> = balances
            .iter()
            .filter(|entry| entry.balance() < -Money::EPSILON)
            .collect();
        debtors.sort_by(|a, b| a.balance().cmp(&b.balance()));

        debtors
            .into_iter()
            .map(|entry| Position {
                member_id: entry.member_id().clone(),
                remaining: entry.balance().abs().round2(),
            })
            .collect()
    }
}
