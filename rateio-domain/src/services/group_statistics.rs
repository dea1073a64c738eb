use crate::model::{Expense, MemberId, Money};
use fxhash::FxHashMap;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopSpender {
    pub member_id: MemberId,
    pub total_paid: Money,
}

/// Aggregate figures for a group's expenses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupStatistics {
    pub total_expenses: Money,
    pub average_per_person: Money,
    pub expense_count: usize,
    pub by_category: BTreeMap<String, Money>,
    /// First member with the highest paid total. `None` for a group without members.
    pub top_spender: Option<TopSpender>,
    pub member_count: usize,
}

impl GroupStatistics {
    pub fn compute(expenses: &[Expense], members: &[MemberId]) -> Self {
        let total_expenses = group_total(expenses);
        let average_per_person = average_per_person(total_expenses, members.len());

        let mut by_category: BTreeMap<String, Money> = BTreeMap::new();
        let mut paid_by_member: FxHashMap<&MemberId, Money> = FxHashMap::default();
        for expense in expenses {
            *by_category.entry(expense.category.clone()).or_default() += expense.amount;
            if let Some(payer) = &expense.paid_by {
                *paid_by_member.entry(payer).or_default() += expense.amount;
            }
        }

        let mut top_spender: Option<TopSpender> = None;
        for member_id in members {
            let total_paid = paid_by_member.get(member_id).copied().unwrap_or_default();
            let is_new_max = top_spender
                .as_ref()
                .is_none_or(|current| total_paid > current.total_paid);
            if is_new_max {
                top_spender = Some(TopSpender {
                    member_id: member_id.clone(),
                    total_paid,
                });
            }
        }

        Self {
            total_expenses,
            average_per_person,
            expense_count: expenses.len(),
            by_category,
            top_spender,
            member_count: members.len(),
        }
    }
}

pub fn group_total(expenses: &[Expense]) -> Money {
    expenses.iter().map(|expense| expense.amount).sum()
}

/// Unrounded mean; zero for an empty group.
pub fn average_per_person(total: Money, member_count: usize) -> Money {
    if member_count == 0 {
        return Money::ZERO;
    }
    total / Decimal::from(member_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExpenseId;
    use rstest::rstest;

    fn expense(id: &str, cents: i64, payer: Option<&str>, category: &str) -> Expense {
        Expense {
            id: ExpenseId::from(id),
            amount: Money::from_cents(cents),
            paid_by: payer.map(MemberId::from),
            category: category.to_string(),
            description: String::new(),
        }
    }

    fn members(names: &[&str]) -> Vec<MemberId> {
        names.iter().map(|name| MemberId::from(*name)).collect()
    }

    #[test]
    fn computes_group_figures() {
        let expenses = [
            expense("e1", 9000, Some("a"), "Mercado"),
            expense("e2", 3000, Some("b"), "Transporte"),
            expense("e3", 1500, Some("b"), "Mercado"),
        ];

        let stats = GroupStatistics::compute(&expenses, &members(&["a", "b", "c"]));

        assert_eq!(stats.total_expenses, Money::from_cents(13500));
        assert_eq!(stats.average_per_person, Money::from_cents(4500));
        assert_eq!(stats.expense_count, 3);
        assert_eq!(stats.member_count, 3);
        assert_eq!(stats.by_category["Mercado"], Money::from_cents(10500));
        assert_eq!(stats.by_category["Transporte"], Money::from_cents(3000));
        assert_eq!(
            stats.top_spender,
            Some(TopSpender {
                member_id: MemberId::from("a"),
                total_paid: Money::from_cents(9000),
            })
        );
    }

    #[rstest]
    #[case::first_of_equals(&[("e1", 1000, "b"), ("e2", 1000, "a")], "a")]
    #[case::strict_max(&[("e1", 1000, "b"), ("e2", 999, "a")], "b")]
    fn top_spender_ties_favor_member_order(
        #[case] paid: &[(&str, i64, &str)],
        #[case] expected: &str,
    ) {
        let expenses: Vec<Expense> = paid
            .iter()
            .map(|(id, cents, payer)| expense(id, *cents, Some(payer), "Outros"))
            .collect();

        let stats = GroupStatistics::compute(&expenses, &members(&["a", "b"]));

        assert_eq!(
            stats.top_spender.map(|top| top.member_id),
            Some(MemberId::from(expected))
        );
    }

    #[test]
    fn expenses_without_payer_count_only_towards_totals() {
        let stats = GroupStatistics::compute(
            &[expense("e1", 500, None, "Outros")],
            &members(&["a"]),
        );

        assert_eq!(stats.total_expenses, Money::from_cents(500));
        assert_eq!(
            stats.top_spender.map(|top| top.total_paid),
            Some(Money::ZERO)
        );
    }

    #[test]
    fn empty_group_has_no_top_spender_and_zero_average() {
        let stats = GroupStatistics::compute(&[expense("e1", 500, Some("x"), "Outros")], &[]);

        assert_eq!(stats.average_per_person, Money::ZERO);
        assert_eq!(stats.top_spender, None);
    }
}
