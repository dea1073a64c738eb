pub mod balance_calculator;
pub mod debt_simplifier;
pub mod expense_splitter;
pub mod group_statistics;

pub use balance_calculator::{BalanceCalculator, normalize_balances};
pub use debt_simplifier::DebtSimplifier;
pub use expense_splitter::{
    CustomShare, ExpenseSplitter, ShareKind, SplitSummary, is_valid_expense_amount,
};
pub use group_statistics::{GroupStatistics, TopSpender, average_per_person, group_total};
