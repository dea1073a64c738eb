use rateio_domain::{
    Expense, ExpenseShare, ExpenseSplit, Member, MemberBalance, MemberId, Money, Settlement,
    SuggestedPayment,
};

/// Raw records for one group as supplied by the persistence layer.
///
/// Nothing here is trusted until [`crate::LedgerAggregator`] has validated it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupLedger {
    pub members: Vec<Member>,
    pub expenses: Vec<Expense>,
    pub splits: Vec<ExpenseSplit>,
    pub settlements: Vec<Settlement>,
}

impl GroupLedger {
    pub fn new(members: Vec<Member>) -> Self {
        Self {
            members,
            ..Self::default()
        }
    }

    pub fn member_ids(&self) -> Vec<MemberId> {
        self.members.iter().map(|member| member.id.clone()).collect()
    }

    /// Records an expense together with its owed shares.
    pub fn record_expense(&mut self, expense: Expense, shares: Vec<ExpenseShare>) {
        let expense_id = expense.id.clone();
        self.expenses.push(expense);
        self.splits.extend(
            shares
                .into_iter()
                .map(|share| share.into_split(expense_id.clone())),
        );
    }

    pub fn record_settlement(&mut self, settlement: Settlement) {
        self.settlements.push(settlement);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementResult {
    pub balances: Vec<MemberBalance>,
    pub suggested_payments: Vec<SuggestedPayment>,
}

/// How many suggested payments a member is involved in, per direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaymentCounts {
    pub to_pay: usize,
    pub to_receive: usize,
}

impl SettlementResult {
    pub fn balance_of(&self, member_id: &MemberId) -> Option<Money> {
        self.balances
            .iter()
            .find(|balance| &balance.member_id == member_id)
            .map(|balance| balance.balance)
    }

    pub fn payment_counts(&self, member_id: &MemberId) -> PaymentCounts {
        self.suggested_payments
            .iter()
            .fold(PaymentCounts::default(), |mut counts, payment| {
                if &payment.from == member_id {
                    counts.to_pay += 1;
                }
                if &payment.to == member_id {
                    counts.to_receive += 1;
                }
                counts
            })
    }

    pub fn is_settled(&self) -> bool {
        self.suggested_payments.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Balances,
    Settle,
    Statistics,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptEntry {
    Expense {
        expense: Expense,
        shares: Vec<ExpenseShare>,
    },
    Settlement(Settlement),
    Command(Command),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptEntryWithLine {
    pub line: usize,
    pub entry: ScriptEntry,
}

/// A parsed ledger script: the group members and its entries in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerScript {
    members: Vec<Member>,
    entries: Vec<ScriptEntryWithLine>,
}

impl LedgerScript {
    pub fn new(members: Vec<Member>, entries: Vec<ScriptEntryWithLine>) -> Self {
        Self { members, entries }
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn entries(&self) -> &[ScriptEntryWithLine] {
        &self.entries
    }

    pub fn has_commands(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| matches!(entry.entry, ScriptEntry::Command(_)))
    }

    /// Builds the ledger made of the first `prefix_len` entries. Commands are skipped.
    pub fn ledger_for_prefix(&self, prefix_len: usize) -> GroupLedger {
        let mut ledger = GroupLedger::new(self.members.clone());
        for entry in self.entries.iter().take(prefix_len) {
            match &entry.entry {
                ScriptEntry::Expense { expense, shares } => {
                    ledger.record_expense(expense.clone(), shares.clone());
                }
                ScriptEntry::Settlement(settlement) => {
                    ledger.record_settlement(settlement.clone());
                }
                ScriptEntry::Command(_) => {}
            }
        }
        ledger
    }

    pub fn ledger(&self) -> GroupLedger {
        self.ledger_for_prefix(self.entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rateio_domain::ExpenseId;
    use rstest::rstest;

    fn payment(from: &str, to: &str) -> SuggestedPayment {
        SuggestedPayment {
            from: MemberId::from(from),
            to: MemberId::from(to),
            amount: Money::from_cents(100),
        }
    }

    #[rstest]
    #[case::payer_only("c", PaymentCounts { to_pay: 1, to_receive: 0 })]
    #[case::receiver_twice("a", PaymentCounts { to_pay: 0, to_receive: 2 })]
    #[case::not_involved("z", PaymentCounts::default())]
    fn payment_counts_per_member(#[case] member: &str, #[case] expected: PaymentCounts) {
        let result = SettlementResult {
            balances: Vec::new(),
            suggested_payments: vec![payment("b", "a"), payment("c", "a")],
        };

        assert_eq!(result.payment_counts(&MemberId::from(member)), expected);
    }

    #[test]
    fn record_expense_attaches_expense_id_to_shares() {
        let mut ledger = GroupLedger::new(vec![Member::new("a", "Ana")]);
        ledger.record_expense(
            Expense {
                id: ExpenseId::from("e1"),
                amount: Money::from_cents(100),
                paid_by: Some(MemberId::from("a")),
                category: "Outros".to_string(),
                description: String::new(),
            },
            vec![ExpenseShare {
                member_id: MemberId::from("a"),
                amount_owed: Money::from_cents(100),
            }],
        );

        assert_eq!(ledger.splits.len(), 1);
        assert_eq!(ledger.splits[0].expense_id, ExpenseId::from("e1"));
    }

    #[test]
    fn ledger_for_prefix_stops_before_later_entries() {
        let settlement = |cents| ScriptEntryWithLine {
            line: 1,
            entry: ScriptEntry::Settlement(Settlement {
                from: MemberId::from("a"),
                to: MemberId::from("b"),
                amount: Money::from_cents(cents),
                settled_at: chrono::DateTime::<chrono::Utc>::UNIX_EPOCH,
            }),
        };
        let script = LedgerScript::new(
            vec![Member::new("a", "Ana"), Member::new("b", "Bruno")],
            vec![
                settlement(100),
                ScriptEntryWithLine {
                    line: 2,
                    entry: ScriptEntry::Command(Command::Balances),
                },
                settlement(200),
            ],
        );

        assert_eq!(script.ledger_for_prefix(2).settlements.len(), 1);
        assert_eq!(script.ledger().settlements.len(), 2);
        assert!(script.has_commands());
    }
}
