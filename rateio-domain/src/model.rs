use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign},
    sync::Arc,
};

/// Opaque member identifier supplied by the caller.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberId(Arc<str>);

impl MemberId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MemberId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for MemberId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExpenseId(Arc<str>);

impl ExpenseId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ExpenseId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Currency amount with exact decimal arithmetic.
///
/// Rounding to cents happens only where a value is finalized, through
/// [`Money::round2`], always half away from zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);
    /// One cent. Balances and transfers at or below this magnitude count as settled.
    pub const EPSILON: Self = Self(Decimal::from_parts(1, 0, 0, false, 2));

    /// Largest magnitude a single expense, split or settlement may carry (10^15).
    pub const MAX_AMOUNT: Self = Self(Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0));

    pub const CENT_SCALE: u32 = 2;

    pub fn new(num: i64, scale: u32) -> Self {
        Self(Decimal::new(num, scale))
    }

    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, Self::CENT_SCALE))
    }

    pub fn from_decimal(value: Decimal) -> Self {
        Self(value)
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// True when a single record may carry this amount; see [`Money::MAX_AMOUNT`].
    pub fn is_within_limit(self) -> bool {
        self.abs() <= Self::MAX_AMOUNT
    }

    /// Rounds to two decimal places, midpoints away from zero.
    pub fn round2(self) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(Self::CENT_SCALE, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// True when the magnitude is within one cent of zero.
    pub fn is_settled(self) -> bool {
        self.abs() <= Self::EPSILON
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Div<Decimal> for Money {
    type Output = Self;

    fn div(self, rhs: Decimal) -> Self::Output {
        Self(self.0 / rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// A participant in a group. Only `id` matters to the calculations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub id: MemberId,
    pub display_name: String,
    /// Out-of-band payment routing key, carried through untouched.
    pub payment_address: Option<String>,
}

impl Member {
    pub fn new(id: impl Into<MemberId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            payment_address: None,
        }
    }

    pub fn with_payment_address(mut self, address: impl Into<String>) -> Self {
        self.payment_address = Some(address.into());
        self
    }
}

/// Pre-aggregated per-member totals. All amounts are expected to be non-negative.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberTotals {
    pub member_id: MemberId,
    pub total_paid: Money,
    pub total_owed: Money,
    pub paid_as_settlor: Money,
    pub received_as_settlee: Money,
}

impl MemberTotals {
    pub fn new(member_id: MemberId) -> Self {
        Self {
            member_id,
            total_paid: Money::ZERO,
            total_owed: Money::ZERO,
            paid_as_settlor: Money::ZERO,
            received_as_settlee: Money::ZERO,
        }
    }

    pub fn settlement_adjustment(&self) -> Money {
        self.paid_as_settlor - self.received_as_settlee
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberBalance {
    pub member_id: MemberId,
    pub total_paid: Money,
    pub total_owed: Money,
    pub settlement_adjustment: Money,
    /// Positive: the group owes this member. Negative: this member owes the group.
    pub balance: Money,
}

/// Anything that can be fed to the debt simplifier.
pub trait BalanceEntry {
    fn member_id(&self) -> &MemberId;
    fn balance(&self) -> Money;
}

impl BalanceEntry for MemberBalance {
    fn member_id(&self) -> &MemberId {
        &self.member_id
    }

    fn balance(&self) -> Money {
        self.balance
    }
}

impl BalanceEntry for (MemberId, Money) {
    fn member_id(&self) -> &MemberId {
        &self.0
    }

    fn balance(&self) -> Money {
        self.1
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SuggestedPayment {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Money,
}

/// A confirmed transfer between two members. Append-only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Money,
    pub settled_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Expense {
    pub id: ExpenseId,
    pub amount: Money,
    /// Expenses without a payer count towards nobody's paid total.
    pub paid_by: Option<MemberId>,
    pub category: String,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpenseSplit {
    pub expense_id: ExpenseId,
    pub member_id: MemberId,
    pub amount_owed: Money,
}

/// One member's portion of an expense before it is attached to an expense id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpenseShare {
    pub member_id: MemberId,
    pub amount_owed: Money,
}

impl ExpenseShare {
    pub fn into_split(self, expense_id: ExpenseId) -> ExpenseSplit {
        ExpenseSplit {
            expense_id,
            member_id: self.member_id,
            amount_owed: self.amount_owed,
        }
    }
}
