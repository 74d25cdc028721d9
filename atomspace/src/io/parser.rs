//! A parser for Atomese s-expressions.
//!
//! The parser only builds an [SExpression] tree; turning it into atoms is
//! done by [crate::io::load].

pub mod ast;
pub(crate) mod types;

use std::fmt::Debug;

use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, tag, take_while1},
    character::complete::{char, multispace1},
    combinator::{all_consuming, cut, map, opt, value},
    multi::{many0, many1},
    sequence::{delimited, pair, preceded, terminated},
    Err,
};

use ast::{SExpression, SExpressionKind};
use types::IntermediateResult;
pub use types::{LocatedParseError, ParseError, ParseResult};

/// Parse every top-level expression in `input`.
///
/// # Errors
/// Returns a [LocatedParseError] pointing at the first syntax error.
pub fn parse_expressions(input: &str) -> ParseResult<Vec<SExpression<'_>>> {
    let origin = input;
    all_input_consumed(
        input,
        preceded(
            multispace_or_comment0,
            many0(terminated(
                move |rest| expression(origin, rest, 0),
                multispace_or_comment0,
            )),
        ),
    )
}

/// Parse exactly one expression from `input`.
///
/// # Errors
/// Returns a [LocatedParseError] if `input` is not a single expression.
pub fn parse_expression(input: &str) -> ParseResult<SExpression<'_>> {
    let origin = input;
    all_input_consumed(
        input,
        delimited(
            multispace_or_comment0,
            move |rest| expression(origin, rest, 0),
            multispace_or_comment0,
        ),
    )
}

/// A combinator to add tracing to the parser.
/// [fun] is an identifier for the parser and [parser] is the actual parser.
#[inline(always)]
fn traced<'a, T, P>(
    fun: &'static str,
    mut parser: P,
) -> impl FnMut(&'a str) -> IntermediateResult<'a, T>
where
    T: Debug,
    P: FnMut(&'a str) -> IntermediateResult<'a, T>,
{
    move |input| {
        log::trace!(target: "parser", "{fun}({input:?})");
        let result = parser(input);
        log::trace!(target: "parser", "{fun}({input:?}) -> {result:?}");
        result
    }
}

/// Run `parser` on `input` and make sure all input has been consumed.
fn all_input_consumed<'a, T>(
    input: &'a str,
    parser: impl FnMut(&'a str) -> IntermediateResult<'a, T>,
) -> ParseResult<T> {
    all_consuming(parser)(input)
        .map(|(_, result)| result)
        .map_err(|e| match e {
            Err::Incomplete(e) => ParseError::MissingInput(match e {
                nom::Needed::Unknown => "expected an unknown amount of further input".to_string(),
                nom::Needed::Size(size) => format!("expected at least {size} more bytes"),
            })
            .at("")
            .locate(input),
            Err::Error(e) | Err::Failure(e) => e.locate(input),
        })
}

/// A combinator that recognises a comment, starting at a `;`
/// character and ending at the end of the line.
fn comment(input: &str) -> IntermediateResult<()> {
    alt((
        value((), pair(tag(";"), is_not("\n\r"))),
        // a comment that immediately precedes the end of the line
        value((), tag(";")),
    ))(input)
}

/// A combinator that recognises an arbitrary amount of whitespace and
/// comments.
fn multispace_or_comment0(input: &str) -> IntermediateResult<()> {
    value((), many0(alt((value((), multispace1), comment))))(input)
}

/// A combinator that recognises any non-empty amount of whitespace
/// and comments.
fn multispace_or_comment1(input: &str) -> IntermediateResult<()> {
    value((), many1(alt((value((), multispace1), comment))))(input)
}

/// A combinator that modifies the associated error.
fn map_error<'a, T: 'a>(
    mut parser: impl FnMut(&'a str) -> IntermediateResult<'a, T> + 'a,
    mut error: impl FnMut() -> ParseError + 'a,
) -> impl FnMut(&'a str) -> IntermediateResult<'a, T> + 'a {
    move |input| {
        parser(input).map_err(|e| match e {
            Err::Incomplete(_) => e,
            Err::Error(context) => {
                let mut err = error().at(input);
                err.append(context);
                Err::Error(err)
            }
            Err::Failure(context) => {
                let mut err = error().at(input);
                err.append(context);
                Err::Failure(err)
            }
        })
    }
}

/// A combinator that creates a parser for a specific token.
fn token<'a>(token: &'a str) -> impl FnMut(&'a str) -> IntermediateResult<'a, &'a str> {
    map_error(tag(token), move || ParseError::ExpectedToken(token.to_string()))
}

fn is_symbol_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '(' | ')' | '"' | ';')
}

/// A bare word, e.g. a type name, `stv` or a number.
fn word(input: &str) -> IntermediateResult<&str> {
    traced("word", take_while1(is_symbol_char))(input)
}

/// A double quoted string with `\"`, `\\`, `\n` and `\t` escapes.
fn string_literal(input: &str) -> IntermediateResult<String> {
    traced(
        "string_literal",
        map_error(
            delimited(
                char('"'),
                map(
                    opt(escaped_transform(
                        is_not("\\\""),
                        '\\',
                        alt((
                            value("\\", tag("\\")),
                            value("\"", tag("\"")),
                            value("\n", tag("n")),
                            value("\t", tag("t")),
                        )),
                    )),
                    Option::unwrap_or_default,
                ),
                cut(char('"')),
            ),
            || ParseError::ExpectedStringLiteral,
        ),
    )(input)
}

fn offset_of(origin: &str, rest: &str) -> usize {
    origin.len().saturating_sub(rest.len())
}

/// How many lists an expression may be nested in.
pub(crate) const MAX_NESTING: usize = 128;

/// A single s-expression, enclosed in `depth` lists.
fn expression<'a>(
    origin: &'a str,
    input: &'a str,
    depth: usize,
) -> IntermediateResult<'a, SExpression<'a>> {
    if depth > MAX_NESTING {
        return Err(Err::Failure(
            ParseError::NestingTooDeep(MAX_NESTING).at(input),
        ));
    }

    let offset = offset_of(origin, input);

    let list = map(
        preceded(
            token("("),
            cut(pair(
                delimited(
                    multispace_or_comment0,
                    map_error(word, || ParseError::ExpectedTypeName),
                    multispace_or_comment0,
                ),
                terminated(
                    many0(terminated(
                        move |rest| expression(origin, rest, depth + 1),
                        multispace_or_comment0,
                    )),
                    token(")"),
                ),
            )),
        ),
        |(head, items)| SExpressionKind::List { head, items },
    );

    let atom = alt((
        map(string_literal, SExpressionKind::String),
        map(word, |word| match word.parse::<f64>() {
            Ok(number) => SExpressionKind::Number(number),
            Err(_) => SExpressionKind::Symbol(word),
        }),
    ));

    // Failures keep their own position, so that errors point into the
    // innermost expression.
    let (rest, kind) = traced("expression", alt((list, atom)))(input).map_err(|e| match e {
        Err::Error(context) => {
            let mut err = ParseError::ExpectedExpression.at(input);
            err.append(context);
            Err::Error(err)
        }
        e => e,
    })?;

    // Consecutive expressions must be separated
    if !rest.is_empty() && !rest.starts_with([')', '(']) {
        if let Err(Err::Error(_)) = multispace_or_comment1(rest) {
            return Err(Err::Failure(
                ParseError::SyntaxError("missing separator".to_string()).at(rest),
            ));
        }
    }

    Ok((rest, SExpression { offset, kind }))
}
