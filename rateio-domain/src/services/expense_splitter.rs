use crate::model::{ExpenseShare, MemberId, Money};
use rust_decimal::Decimal;

/// How a single member participates in a custom split.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShareKind {
    /// A fixed amount.
    Fixed(Money),
    /// A percentage of whatever is left after all fixed shares.
    Percentage(Decimal),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomShare {
    pub member_id: MemberId,
    pub kind: ShareKind,
}

impl CustomShare {
    pub fn fixed(member_id: impl Into<MemberId>, amount: Money) -> Self {
        Self {
            member_id: member_id.into(),
            kind: ShareKind::Fixed(amount),
        }
    }

    pub fn percentage(member_id: impl Into<MemberId>, percent: Decimal) -> Self {
        Self {
            member_id: member_id.into(),
            kind: ShareKind::Percentage(percent),
        }
    }
}

/// Splits an expense into owed shares.
pub struct ExpenseSplitter;

impl ExpenseSplitter {
    /// Divides `total` evenly, giving the rounding remainder to the first member.
    ///
    /// The shares always sum exactly to `total`. 10.00 over three members
    /// yields `[3.34, 3.33, 3.33]`.
    pub fn split_equally(&self, total: Money, members: &[MemberId]) -> Vec<ExpenseShare> {
        if members.is_empty() {
            return Vec::new();
        }

        let count = Decimal::from(members.len());
        let per_member = (total / count).round2();
        let difference = (total - per_member * count).round2();

        members
            .iter()
            .enumerate()
            .map(|(idx, member_id)| ExpenseShare {
                member_id: member_id.clone(),
                amount_owed: if idx == 0 {
                    (per_member + difference).round2()
                } else {
                    per_member
                },
            })
            .collect()
    }

    /// Resolves fixed and percentage shares against `total`.
    ///
    /// Percentages apply to `total - sum(fixed)`. When the percentages add up
    /// to 100, the rounding remainder goes to the first percentage share, as in
    /// [`split_equally`](Self::split_equally). Otherwise the result is not
    /// forced to sum to `total`; see [`SplitSummary::unallocated`].
    pub fn split_custom(&self, total: Money, shares: &[CustomShare]) -> Vec<ExpenseShare> {
        if shares.is_empty() {
            return Vec::new();
        }

        let total_fixed: Money = shares
            .iter()
            .filter_map(|share| match share.kind {
                ShareKind::Fixed(amount) => Some(amount),
                ShareKind::Percentage(_) => None,
            })
            .sum();
        let remaining = total - total_fixed;

        let mut result: Vec<ExpenseShare> = shares
            .iter()
            .map(|share| ExpenseShare {
                member_id: share.member_id.clone(),
                amount_owed: match share.kind {
                    ShareKind::Fixed(amount) => amount.round2(),
                    ShareKind::Percentage(percent) => {
                        (remaining * percent / Decimal::ONE_HUNDRED).round2()
                    }
                },
            })
            .collect();

        let percent_sum: Decimal = shares
            .iter()
            .filter_map(|share| match share.kind {
                ShareKind::Percentage(percent) => Some(percent),
                ShareKind::Fixed(_) => None,
            })
            .sum();
        let first_percentage = shares
            .iter()
            .position(|share| matches!(share.kind, ShareKind::Percentage(_)));

        if let (Some(idx), true) = (first_percentage, percent_sum == Decimal::ONE_HUNDRED) {
            let allocated: Money = shares
                .iter()
                .zip(&result)
                .filter(|(share, _)| matches!(share.kind, ShareKind::Percentage(_)))
                .map(|(_, owed)| owed.amount_owed)
                .sum();
            let difference = (remaining.round2() - allocated).round2();
            result[idx].amount_owed = (result[idx].amount_owed + difference).round2();
        }

        result
    }
}

/// How well a list of shares covers an expense total.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitSummary {
    pub total: Money,
    pub allocated: Money,
}

impl SplitSummary {
    pub fn of(total: Money, shares: &[ExpenseShare]) -> Self {
        Self {
            total,
            allocated: shares.iter().map(|share| share.amount_owed).sum(),
        }
    }

    /// Positive when part of the expense is owed by nobody, negative when over-allocated.
    pub fn unallocated(&self) -> Money {
        self.total - self.allocated
    }

    pub fn is_exact(&self) -> bool {
        self.unallocated().is_zero()
    }
}

/// An expense amount is usable only when strictly positive.
pub fn is_valid_expense_amount(amount: Money) -> bool {
    amount > Money::ZERO
}
