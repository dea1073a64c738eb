use chrono::{DateTime, Utc};
use fxhash::{FxHashMap, FxHashSet};
use rateio_application::{
    Command, LedgerScript, LedgerScriptError, LedgerScriptParser, ScriptEntry,
    ScriptEntryWithLine,
};
use rateio_domain::{
    Expense, ExpenseId, ExpenseShare, ExpenseSplitter, Member, MemberId, Money, Settlement,
    services::{CustomShare, SplitSummary, is_valid_expense_amount},
};
use rateio_parser::{
    Command as ParserCommand, CustomPart, ExpenseLine, ParseError, Participants, SettlementLine,
    ShareAmount, Statement as ParserStatement, parse_program,
};
use rust_decimal::Decimal;

pub const DEFAULT_CATEGORY: &str = "Outros";

/// Turns ledger script text into application entries.
///
/// Scripts carry no timestamps, so every settlement is stamped with `settled_at`.
pub struct RateioScriptParser {
    settled_at: DateTime<Utc>,
}

impl RateioScriptParser {
    pub fn new(settled_at: DateTime<Utc>) -> Self {
        Self { settled_at }
    }
}

impl Default for RateioScriptParser {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl LedgerScriptParser for RateioScriptParser {
    fn parse(&self, content: &str) -> Result<LedgerScript, LedgerScriptError> {
        let program = parse_program(content).map_err(|err| match err {
            ParseError::SyntaxError { line, detail } => {
                LedgerScriptError::SyntaxError { line, detail }
            }
        })?;

        let mut roster: Option<Roster> = None;
        let mut entries = Vec::with_capacity(program.statements.len());

        for rateio_parser::StatementWithLine { line, statement } in program.statements {
            if let ParserStatement::Members(names) = &statement {
                if roster.is_some() {
                    return Err(LedgerScriptError::SyntaxError {
                        line,
                        detail: "Members are already declared".to_string(),
                    });
                }
                roster = Some(Roster::declare(names, line)?);
                continue;
            }
            let Some(roster) = roster.as_ref() else {
                return Err(LedgerScriptError::MissingMembersDeclaration);
            };

            let entry = match statement {
                ParserStatement::Members(_) => continue,
                ParserStatement::Expense(expense) => self.expense_entry(roster, expense, line)?,
                ParserStatement::Settlement(settlement) => {
                    self.settlement_entry(roster, settlement, line)?
                }
                ParserStatement::Command(command) => ScriptEntry::Command(match command {
                    ParserCommand::Balances => Command::Balances,
                    ParserCommand::Settle => Command::Settle,
                    ParserCommand::Statistics => Command::Statistics,
                }),
            };
            entries.push(ScriptEntryWithLine { line, entry });
        }

        let roster = roster.ok_or(LedgerScriptError::MissingMembersDeclaration)?;
        tracing::debug!(
            member_count = roster.members.len(),
            entry_count = entries.len(),
            "Ledger script parsed"
        );
        Ok(LedgerScript::new(roster.members, entries))
    }
}

impl RateioScriptParser {
    fn expense_entry(
        &self,
        roster: &Roster,
        expense: ExpenseLine<'_>,
        line: usize,
    ) -> Result<ScriptEntry, LedgerScriptError> {
        let amount = within_limit(Money::from_decimal(expense.amount), line)?;
        if !is_valid_expense_amount(amount) {
            return Err(LedgerScriptError::InvalidAmount {
                line,
                detail: format!("Expense amount must be positive (found {amount})"),
            });
        }
        let payer = roster.resolve(expense.payer, line)?;

        let shares = match &expense.participants {
            Participants::Equal(names) => {
                let members = roster.resolve_distinct(names.iter().copied(), line)?;
                ExpenseSplitter.split_equally(amount, &members)
            }
            Participants::Custom(parts) => custom_shares(roster, amount, parts, line)?,
        };

        Ok(ScriptEntry::Expense {
            expense: Expense {
                id: ExpenseId::new(format!("line-{line}")),
                amount,
                paid_by: Some(payer),
                category: expense.category.unwrap_or(DEFAULT_CATEGORY).to_string(),
                description: expense.description.unwrap_or_default().to_string(),
            },
            shares,
        })
    }

    fn settlement_entry(
        &self,
        roster: &Roster,
        settlement: SettlementLine<'_>,
        line: usize,
    ) -> Result<ScriptEntry, LedgerScriptError> {
        let amount = within_limit(Money::from_decimal(settlement.amount), line)?;
        if amount <= Money::ZERO {
            return Err(LedgerScriptError::InvalidAmount {
                line,
                detail: format!("Settlement amount must be positive (found {amount})"),
            });
        }
        let from = roster.resolve(settlement.from, line)?;
        let to = roster.resolve(settlement.to, line)?;
        if from == to {
            return Err(LedgerScriptError::SyntaxError {
                line,
                detail: format!("'{from}' cannot settle with themselves"),
            });
        }

        Ok(ScriptEntry::Settlement(Settlement {
            from,
            to,
            amount,
            settled_at: self.settled_at,
        }))
    }
}

fn custom_shares(
    roster: &Roster,
    total: Money,
    parts: &[CustomPart<'_>],
    line: usize,
) -> Result<Vec<ExpenseShare>, LedgerScriptError> {
    let members = roster.resolve_distinct(parts.iter().map(|part| part.name), line)?;
    let custom = members
        .into_iter()
        .zip(parts)
        .map(|(member_id, part)| match part.share {
            ShareAmount::Fixed(value) => {
                within_limit(Money::from_decimal(value), line)
                    .map(|amount| CustomShare::fixed(member_id, amount))
            }
            ShareAmount::Percent(percent) if percent > Decimal::ONE_HUNDRED => {
                Err(LedgerScriptError::InvalidAmount {
                    line,
                    detail: format!("Percentage {percent}% is above 100%"),
                })
            }
            ShareAmount::Percent(percent) => Ok(CustomShare::percentage(member_id, percent)),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let shares = ExpenseSplitter.split_custom(total, &custom);
    let summary = SplitSummary::of(total, &shares);
    if !summary.is_exact() {
        return Err(LedgerScriptError::SplitMismatch {
            line,
            total,
            unallocated: summary.unallocated(),
        });
    }
    Ok(shares)
}

fn within_limit(amount: Money, line: usize) -> Result<Money, LedgerScriptError> {
    if amount.is_within_limit() {
        Ok(amount)
    } else {
        Err(LedgerScriptError::InvalidAmount {
            line,
            detail: format!("Amount {amount} exceeds {}", Money::MAX_AMOUNT),
        })
    }
}

struct Roster {
    members: Vec<Member>,
    by_name: FxHashMap<String, MemberId>,
}

impl Roster {
    fn declare(names: &[&str], line: usize) -> Result<Self, LedgerScriptError> {
        let mut members = Vec::with_capacity(names.len());
        let mut by_name = FxHashMap::default();
        for name in names {
            let id = MemberId::from(*name);
            if by_name.insert(name.to_string(), id.clone()).is_some() {
                return Err(LedgerScriptError::SyntaxError {
                    line,
                    detail: format!("Member '{name}' is declared twice"),
                });
            }
            members.push(Member::new(id, *name));
        }
        Ok(Self { members, by_name })
    }

    fn resolve(&self, name: &str, line: usize) -> Result<MemberId, LedgerScriptError> {
        self.by_name
            .get(name)
            .cloned()
            .ok_or_else(|| LedgerScriptError::UndefinedMember {
                name: name.to_string(),
                line,
            })
    }

    fn resolve_distinct<'n>(
        &self,
        names: impl Iterator<Item = &'n str>,
        line: usize,
    ) -> Result<Vec<MemberId>, LedgerScriptError> {
        let mut seen = FxHashSet::default();
        let mut resolved = Vec::new();
        for name in names {
            if !seen.insert(name) {
                return Err(LedgerScriptError::SyntaxError {
                    line,
                    detail: format!("Member '{name}' is listed twice"),
                });
            }
            resolved.push(self.resolve(name, line)?);
        }
        Ok(resolved)
    }
}
