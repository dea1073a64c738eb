use crate::payment_request::PaymentRequestStatus;
use rateio_domain::{ExpenseId, MemberId, Money};
use std::fmt;

/// Which kind of record referenced an unknown member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Expense,
    Split,
    Settlement,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Expense => f.write_str("expense"),
            RecordKind::Split => f.write_str("split"),
            RecordKind::Settlement => f.write_str("settlement"),
        }
    }
}

/// Rejections raised while checking raw records before they reach the core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerValidationError {
    #[error("Amount {value} is not a finite number")]
    NonFiniteAmount { value: String },
    #[error("Amount {value} is out of range")]
    AmountOutOfRange { value: String },
    #[error("Duplicate member '{member_id}'")]
    DuplicateMember { member_id: MemberId },
    #[error("Duplicate expense '{expense_id}'")]
    DuplicateExpense { expense_id: ExpenseId },
    #[error("Expense '{expense_id}' must have a positive amount (found {amount})")]
    NonPositiveExpense { expense_id: ExpenseId, amount: Money },
    #[error("Split of expense '{expense_id}' for '{member_id}' is negative ({amount})")]
    NegativeSplit {
        expense_id: ExpenseId,
        member_id: MemberId,
        amount: Money,
    },
    #[error("Settlement from '{from}' to '{to}' must have a positive amount (found {amount})")]
    NonPositiveSettlement {
        from: MemberId,
        to: MemberId,
        amount: Money,
    },
    #[error("Settlement from '{member_id}' to itself")]
    SelfSettlement { member_id: MemberId },
    #[error("A {record} references unknown member '{member_id}'")]
    UnknownMember {
        record: RecordKind,
        member_id: MemberId,
    },
    #[error("A split references unknown expense '{expense_id}'")]
    UnknownExpense { expense_id: ExpenseId },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentRequestError {
    #[error("Payment request {id} is already {status}")]
    AlreadyResolved { id: u64, status: PaymentRequestStatus },
    #[error("Payment request amount must be positive (found {amount})")]
    NonPositiveAmount { amount: Money },
    #[error("Payment request from '{member_id}' to itself")]
    SelfPayment { member_id: MemberId },
}

/// Failures while turning a ledger script into entries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerScriptError {
    #[error("Script is missing a `MEMBERS := ...` declaration")]
    MissingMembersDeclaration,
    #[error("Syntax error at line {line}: {detail}")]
    SyntaxError { line: usize, detail: String },
    #[error("Undefined member '{name}' at line {line}")]
    UndefinedMember { name: String, line: usize },
    #[error("Invalid amount at line {line}: {detail}")]
    InvalidAmount { line: usize, detail: String },
    #[error("Split at line {line} leaves {unallocated} of {total} unassigned")]
    SplitMismatch {
        line: usize,
        total: Money,
        unallocated: Money,
    },
}
