use std::{borrow::Cow, env, fs, process};

use rateio_application::{
    BalanceCache, Command, CommandOutcome, LedgerProcessor, LedgerScript, SettlementResult,
};
use rateio_domain::{GroupStatistics, Member, MemberId};
use rateio_infrastructure::{EngineConfig, RateioScriptParser};
use tracing_subscriber::EnvFilter;

type CliResult<T> = Result<T, Cow<'static, str>>;

fn main() {
    init_logging();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> CliResult<()> {
    let Some(path) = env::args().nth(1) else {
        return Err("Usage: rateio <file.rateio>".into());
    };

    let source =
        fs::read_to_string(&path).map_err(|err| format!("Failed to read '{path}': {err}"))?;

    let config = EngineConfig::from_env().map_err(|err| err.to_string())?;
    let cache = config.build_cache();
    if let Some(cache) = &cache {
        tracing::debug!(ttl_secs = cache.ttl().as_secs(), "Balance cache enabled");
    }
    let parser = RateioScriptParser::default();
    let processor = LedgerProcessor::new(
        &parser,
        cache.as_ref().map(|cache| cache as &dyn BalanceCache),
    );

    let script = processor
        .parse_script(&source)
        .map_err(|err| err.to_string())?;

    print_script_output(&processor, &script)
}

fn print_script_output(processor: &LedgerProcessor<'_>, script: &LedgerScript) -> CliResult<()> {
    let members = script.members();

    if !script.has_commands() {
        let result = processor
            .compute(&script.ledger())
            .map_err(|err| err.to_string())?;
        println!("{}", format_balances(members, &result));
        println!("{}", format_payments(members, &result));
        return Ok(());
    }

    let outcomes = processor
        .evaluate(script)
        .map_err(|err| err.to_string())?;
    for CommandOutcome {
        command,
        result,
        statistics,
        ..
    } in &outcomes
    {
        let output = match command {
            Command::Balances => format_balances(members, result),
            Command::Settle => format_payments(members, result),
            Command::Statistics => format_statistics(members, statistics),
        };
        println!("{output}");
    }

    Ok(())
}

fn display_name<'m>(members: &'m [Member], member_id: &'m MemberId) -> &'m str {
    members
        .iter()
        .find(|member| &member.id == member_id)
        .map_or(member_id.as_str(), |member| member.display_name.as_str())
}

fn format_balances(members: &[Member], result: &SettlementResult) -> String {
    let mut lines = vec!["Balances:".to_string()];
    for balance in &result.balances {
        let sign = if balance.balance.is_negative() { "" } else { "+" };
        lines.push(format!(
            "  {}: {sign}{}",
            display_name(members, &balance.member_id),
            balance.balance
        ));
    }
    lines.join("\n")
}

fn format_payments(members: &[Member], result: &SettlementResult) -> String {
    if result.is_settled() {
        return "Suggested payments: none, everyone is settled".to_string();
    }
    let mut lines = vec!["Suggested payments:".to_string()];
    for payment in &result.suggested_payments {
        lines.push(format!(
            "  {} -> {}: {}",
            display_name(members, &payment.from),
            display_name(members, &payment.to),
            payment.amount
        ));
    }
    lines.join("\n")
}

fn format_statistics(members: &[Member], statistics: &GroupStatistics) -> String {
    let mut lines = vec![
        "Statistics:".to_string(),
        format!("  Total: {}", statistics.total_expenses),
        format!("  Expenses: {}", statistics.expense_count),
        format!(
            "  Average per person ({}): {}",
            statistics.member_count,
            statistics.average_per_person.round2()
        ),
    ];
    if let Some(top) = &statistics.top_spender {
        lines.push(format!(
            "  Top spender: {} ({})",
            display_name(members, &top.member_id),
            top.total_paid
        ));
    }
    for (category, total) in &statistics.by_category {
        lines.push(format!("  {category}: {total}"));
    }
    lines.join("\n")
}
