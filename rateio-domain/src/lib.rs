#![warn(clippy::uninlined_format_args)]

pub mod model;
pub mod services;

pub use model::{
    BalanceEntry, Expense, ExpenseId, ExpenseShare, ExpenseSplit, Member, MemberBalance,
    MemberId, MemberTotals, Money, Settlement, SuggestedPayment,
};
pub use services::{BalanceCalculator, DebtSimplifier, ExpenseSplitter, GroupStatistics};
