use crate::{
    error::{LedgerValidationError, RecordKind},
    model::GroupLedger,
};
use fxhash::{FxHashMap, FxHashSet};
use indexmap::IndexMap;
use rateio_domain::{ExpenseId, MemberId, MemberTotals, Money};
use rust_decimal::{Decimal, prelude::FromPrimitive};

/// Validates raw group records and folds them into per-member totals.
pub struct LedgerAggregator;

impl LedgerAggregator {
    /// Returns one [`MemberTotals`] per group member, in member order.
    ///
    /// Expenses without a payer add to nobody's paid total. Splits whose
    /// amounts do not add up to their expense are logged but accepted; the
    /// balances then no longer sum to zero.
    pub fn aggregate(
        &self,
        ledger: &GroupLedger,
    ) -> Result<Vec<MemberTotals>, LedgerValidationError> {
        let result = Self::aggregate_inner(ledger);
        if let Err(err) = &result {
            tracing::warn!(
                reject_reason = %err,
                member_count = ledger.members.len(),
                expense_count = ledger.expenses.len(),
                settlement_count = ledger.settlements.len(),
                "Group ledger rejected"
            );
        }
        result
    }

    fn aggregate_inner(ledger: &GroupLedger) -> Result<Vec<MemberTotals>, LedgerValidationError> {
        let mut totals: IndexMap<MemberId, MemberTotals> =
            IndexMap::with_capacity(ledger.members.len());
        for member in &ledger.members {
            if totals.contains_key(&member.id) {
                return Err(LedgerValidationError::DuplicateMember {
                    member_id: member.id.clone(),
                });
            }
            totals.insert(member.id.clone(), MemberTotals::new(member.id.clone()));
        }

        let mut expense_amounts: FxHashMap<&ExpenseId, Money> = FxHashMap::default();
        for expense in &ledger.expenses {
            within_limit(expense.amount)?;
            if expense.amount <= Money::ZERO {
                return Err(LedgerValidationError::NonPositiveExpense {
                    expense_id: expense.id.clone(),
                    amount: expense.amount,
                });
            }
            if expense_amounts.insert(&expense.id, expense.amount).is_some() {
                return Err(LedgerValidationError::DuplicateExpense {
                    expense_id: expense.id.clone(),
                });
            }
            if let Some(payer) = &expense.paid_by {
                let payer_totals = member_totals(&mut totals, payer, RecordKind::Expense)?;
                accumulate(&mut payer_totals.total_paid, expense.amount)?;
            }
        }

        let mut split_sums: FxHashMap<&ExpenseId, Money> = FxHashMap::default();
        for split in &ledger.splits {
            if !expense_amounts.contains_key(&split.expense_id) {
                return Err(LedgerValidationError::UnknownExpense {
                    expense_id: split.expense_id.clone(),
                });
            }
            within_limit(split.amount_owed)?;
            if split.amount_owed.is_negative() {
                return Err(LedgerValidationError::NegativeSplit {
                    expense_id: split.expense_id.clone(),
                    member_id: split.member_id.clone(),
                    amount: split.amount_owed,
                });
            }
            let debtor = member_totals(&mut totals, &split.member_id, RecordKind::Split)?;
            accumulate(&mut debtor.total_owed, split.amount_owed)?;
            accumulate(
                split_sums.entry(&split.expense_id).or_default(),
                split.amount_owed,
            )?;
        }

        let mut unbalanced: FxHashSet<&ExpenseId> = FxHashSet::default();
        for (expense_id, amount) in &expense_amounts {
            let allocated = split_sums.get(expense_id).copied().unwrap_or_default();
            if allocated != *amount {
                unbalanced.insert(expense_id);
            }
        }
        if !unbalanced.is_empty() {
            tracing::warn!(
                unbalanced_expense_count = unbalanced.len(),
                "Expense splits do not add up to their expense amounts"
            );
        }

        for settlement in &ledger.settlements {
            if settlement.from == settlement.to {
                return Err(LedgerValidationError::SelfSettlement {
                    member_id: settlement.from.clone(),
                });
            }
            within_limit(settlement.amount)?;
            if settlement.amount <= Money::ZERO {
                return Err(LedgerValidationError::NonPositiveSettlement {
                    from: settlement.from.clone(),
                    to: settlement.to.clone(),
                    amount: settlement.amount,
                });
            }
            let settlor = member_totals(&mut totals, &settlement.from, RecordKind::Settlement)?;
            accumulate(&mut settlor.paid_as_settlor, settlement.amount)?;
            let settlee = member_totals(&mut totals, &settlement.to, RecordKind::Settlement)?;
            accumulate(&mut settlee.received_as_settlee, settlement.amount)?;
        }

        tracing::debug!(
            member_count = totals.len(),
            expense_count = ledger.expenses.len(),
            split_count = ledger.splits.len(),
            settlement_count = ledger.settlements.len(),
            "Group ledger aggregated"
        );

        Ok(totals.into_values().collect())
    }
}

fn member_totals<'t>(
    totals: &'t mut IndexMap<MemberId, MemberTotals>,
    member_id: &MemberId,
    record: RecordKind,
) -> Result<&'t mut MemberTotals, LedgerValidationError> {
    totals
        .get_mut(member_id)
        .ok_or_else(|| LedgerValidationError::UnknownMember {
            record,
            member_id: member_id.clone(),
        })
}

fn within_limit(amount: Money) -> Result<(), LedgerValidationError> {
    if amount.is_within_limit() {
        Ok(())
    } else {
        Err(LedgerValidationError::AmountOutOfRange {
            value: amount.to_string(),
        })
    }
}

fn accumulate(total: &mut Money, amount: Money) -> Result<(), LedgerValidationError> {
    *total = total
        .checked_add(amount)
        .ok_or_else(|| LedgerValidationError::AmountOutOfRange {
            value: amount.to_string(),
        })?;
    Ok(())
}

/// Converts a floating-point amount from an untyped source into [`Money`].
pub fn amount_from_f64(value: f64) -> Result<Money, LedgerValidationError> {
    if !value.is_finite() {
        return Err(LedgerValidationError::NonFiniteAmount {
            value: value.to_string(),
        });
    }
    Decimal::from_f64(value)
        .map(Money::from_decimal)
        .ok_or_else(|| LedgerValidationError::AmountOutOfRange {
            value: value.to_string(),
        })
}
