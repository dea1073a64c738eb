use crate::{
    aggregator::LedgerAggregator,
    error::{LedgerScriptError, LedgerValidationError},
    memo::MemoizedEngine,
    model::{Command, GroupLedger, LedgerScript, ScriptEntry, SettlementResult},
    ports::{BalanceCache, LedgerScriptParser},
};
use rateio_domain::GroupStatistics;
use std::sync::Arc;

/// Output of one command in a ledger script, evaluated over the entries above it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub line: usize,
    pub command: Command,
    pub result: SettlementResult,
    pub statistics: GroupStatistics,
}

#[derive(Clone, Copy)]
pub struct LedgerProcessor<'a> {
    parser: &'a dyn LedgerScriptParser,
    engine: MemoizedEngine<'a>,
}

impl<'a> LedgerProcessor<'a> {
    pub fn new(parser: &'a dyn LedgerScriptParser, cache: Option<&'a dyn BalanceCache>) -> Self {
        Self {
            parser,
            engine: MemoizedEngine::new(cache),
        }
    }

    pub fn parse_script(&self, content: &str) -> Result<LedgerScript, LedgerScriptError> {
        self.parser.parse(content)
    }

    /// Validates the ledger, then computes balances and the suggested payments.
    pub fn compute(&self, ledger: &GroupLedger) -> Result<SettlementResult, LedgerValidationError> {
        let totals = LedgerAggregator.aggregate(ledger)?;
        let balances = self.engine.compute_balances(&totals);
        let payments = self.engine.simplify(&balances);

        Ok(SettlementResult {
            balances: Arc::unwrap_or_clone(balances),
            suggested_payments: Arc::unwrap_or_clone(payments),
        })
    }

    /// Validates the ledger, then summarizes its expenses.
    pub fn statistics(
        &self,
        ledger: &GroupLedger,
    ) -> Result<GroupStatistics, LedgerValidationError> {
        LedgerAggregator.aggregate(ledger)?;
        Ok(GroupStatistics::compute(&ledger.expenses, &ledger.member_ids()))
    }

    pub fn compute_for_prefix(
        &self,
        script: &LedgerScript,
        prefix_len: usize,
    ) -> Result<SettlementResult, LedgerValidationError> {
        self.compute(&script.ledger_for_prefix(prefix_len))
    }

    /// Evaluates every command against the entries that precede it.
    pub fn evaluate(
        &self,
        script: &LedgerScript,
    ) -> Result<Vec<CommandOutcome>, LedgerValidationError> {
        let mut outcomes = Vec::new();
        for (idx, entry) in script.entries().iter().enumerate() {
            let ScriptEntry::Command(command) = entry.entry else {
                continue;
            };
            let ledger = script.ledger_for_prefix(idx);
            outcomes.push(CommandOutcome {
                line: entry.line,
                command,
                result: self.compute(&ledger)?,
                statistics: GroupStatistics::compute(&ledger.expenses, &ledger.member_ids()),
            });
        }

        tracing::debug!(command_count = outcomes.len(), "Ledger script evaluated");

        Ok(outcomes)
    }

    pub fn clear_cache(&self) {
        self.engine.clear();
    }
}
