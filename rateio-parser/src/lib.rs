#![warn(clippy::uninlined_format_args)]

mod detail;

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_till, take_until, take_while_m_n, take_while1},
    character::complete::{char, digit1, multispace1, one_of, satisfy},
    combinator::{map_res, not, opt, recognize},
    multi::{many0, many1},
    sequence::{delimited, terminated},
};
use rust_decimal::Decimal;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareAmount {
    Fixed(Decimal),
    /// Percentage of what is left after the fixed shares.
    Percent(Decimal),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomPart<'a> {
    pub name: &'a str,
    pub share: ShareAmount,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Participants<'a> {
    Equal(Vec<&'a str>),
    Custom(Vec<CustomPart<'a>>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseLine<'a> {
    pub payer: &'a str,
    pub amount: Decimal,
    pub category: Option<&'a str>,
    pub description: Option<&'a str>,
    pub participants: Participants<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementLine<'a> {
    pub from: &'a str,
    pub amount: Decimal,
    pub to: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Balances,
    Settle,
    Statistics,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement<'a> {
    Members(Vec<&'a str>),
    Expense(ExpenseLine<'a>),
    Settlement(SettlementLine<'a>),
    Command(Command),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementWithLine<'a> {
    pub line: usize,
    pub statement: Statement<'a>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program<'a> {
    pub statements: Vec<StatementWithLine<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Syntax error at line {line}: {detail}")]
    SyntaxError { line: usize, detail: String },
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(is_identifier_char).parse(input)
}

// Matches a whole word only, so `for` does not match the start of `fortunato`.
fn keyword<'a>(word: &'static str) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str> {
    move |input| terminated(tag_no_case(word), not(satisfy(is_identifier_char))).parse(input)
}

fn sp(input: &str) -> IResult<&str, &str> {
    fn comment(input: &str) -> IResult<&str, &str> {
        delimited(tag("/*"), take_until("*/"), tag("*/")).parse(input)
    }

    fn line_comment(input: &str) -> IResult<&str, &str> {
        recognize((tag("//"), take_till(|c| c == '\n'))).parse(input)
    }

    recognize(many0(alt((multispace1, comment, line_comment)))).parse(input)
}

// 12, 12.5, 12.50, 12,50 and an optional R$ prefix
fn amount(input: &str) -> IResult<&str, Decimal> {
    let (input, _) = opt((tag_no_case("R$"), sp)).parse(input)?;
    map_res(
        recognize((
            digit1,
            opt((
                one_of(".,"),
                take_while_m_n(1, 2, |c: char| c.is_ascii_digit()),
            )),
        )),
        |text: &str| Decimal::from_str(&text.replace(',', ".")),
    )
    .parse(input)
}

fn share_amount(input: &str) -> IResult<&str, ShareAmount> {
    (amount, opt(char('%')))
        .map(|(value, percent)| match percent {
            Some(_) => ShareAmount::Percent(value),
            None => ShareAmount::Fixed(value),
        })
        .parse(input)
}

fn custom_part(input: &str) -> IResult<&str, CustomPart<'_>> {
    (identifier, sp, char('='), sp, share_amount)
        .map(|(name, _, _, _, share)| CustomPart { name, share })
        .parse(input)
}

// Either every participant carries a share or none does; mixing leaves unparsed input.
fn participants(input: &str) -> IResult<&str, Participants<'_>> {
    alt((
        many1((custom_part, sp).map(|(part, _)| part)).map(Participants::Custom),
        many1((identifier, sp).map(|(name, _)| name)).map(Participants::Equal),
    ))
    .parse(input)
}

fn category(input: &str) -> IResult<&str, &str> {
    (char('#'), identifier).map(|(_, name)| name).parse(input)
}

fn description(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_till(|c| c == '"'), char('"')).parse(input)
}

fn paid(input: &str) -> IResult<&str, &str> {
    alt((keyword("paid"), keyword("pagou"))).parse(input)
}

fn for_(input: &str) -> IResult<&str, &str> {
    alt((keyword("for"), keyword("para"))).parse(input)
}

fn settled(input: &str) -> IResult<&str, &str> {
    alt((keyword("settled"), keyword("acertou"))).parse(input)
}

fn to(input: &str) -> IResult<&str, &str> {
    alt((keyword("to"), keyword("com"))).parse(input)
}

// {payer} paid {amount} [#category] ["description"] for {participants}
fn expense(input: &str) -> IResult<&str, ExpenseLine<'_>> {
    (
        identifier,
        sp,
        paid,
        sp,
        amount,
        sp,
        opt((category, sp).map(|(name, _)| name)),
        opt((description, sp).map(|(text, _)| text)),
        for_,
        sp,
        participants,
    )
        .map(
            |(payer, _, _, _, amount, _, category, description, _, _, participants)| ExpenseLine {
                payer,
                amount,
                category,
                description,
                participants,
            },
        )
        .parse(input)
}

// {from} settled {amount} to {to}
fn settlement(input: &str) -> IResult<&str, SettlementLine<'_>> {
    (identifier, sp, settled, sp, amount, sp, to, sp, identifier)
        .map(|(from, _, _, _, amount, _, _, _, to)| SettlementLine { from, amount, to })
        .parse(input)
}

fn members(input: &str) -> IResult<&str, Vec<&str>> {
    (
        alt((tag("MEMBERS"), tag("MEMBROS"))),
        sp,
        tag(":="),
        sp,
        many1((identifier, sp).map(|(name, _)| name)),
    )
        .map(|(_, _, _, _, names)| names)
        .parse(input)
}

fn command(input: &str) -> IResult<&str, Command> {
    (
        char('!'),
        alt((
            alt((keyword("balances"), keyword("saldos"))).map(|_| Command::Balances),
            alt((keyword("settle"), keyword("acertar"))).map(|_| Command::Settle),
            alt((keyword("stats"), keyword("resumo"))).map(|_| Command::Statistics),
        )),
    )
        .map(|(_, command)| command)
        .parse(input)
}

fn statement(input: &str) -> IResult<&str, Statement<'_>> {
    alt((
        members.map(Statement::Members),
        command.map(Statement::Command),
        settlement.map(Statement::Settlement),
        expense.map(Statement::Expense),
    ))
    .parse(input)
}

fn statement_with_sp(input: &str) -> IResult<&str, Statement<'_>> {
    (sp, statement, sp).map(|(_, stmt, _)| stmt).parse(input)
}

/// Parses a ledger script line by line. Blank and comment-only lines are skipped.
pub fn parse_program(input: &str) -> Result<Program<'_>, ParseError> {
    let mut statements = Vec::new();

    for (idx, line) in input.lines().enumerate() {
        let (rest, _) = sp(line).map_err(|e| ParseError::SyntaxError {
            line: idx + 1,
            detail: detail::syntax_error_detail(e),
        })?;
        if rest.trim().is_empty() {
            continue;
        }
        match statement_with_sp(rest) {
            Ok((rest, stmt)) => {
                if !rest.trim().is_empty() {
                    return Err(ParseError::SyntaxError {
                        line: idx + 1,
                        detail: detail::unparsed_input_detail(rest),
                    });
                }
                statements.push(StatementWithLine {
                    line: idx + 1,
                    statement: stmt,
                });
            }
            Err(e) => {
                return Err(ParseError::SyntaxError {
                    line: idx + 1,
                    detail: detail::syntax_error_detail(e),
                });
            }
        }
    }

    Ok(Program { statements })
}
