//! Error and result types of the Atomese parser.

use nom::{
    error::{ErrorKind, FromExternalError},
    IResult,
};
use thiserror::Error;

/// An intermediate parsing result
pub(crate) type IntermediateResult<'a, T> = IResult<&'a str, T, PendingParseError>;

/// The result of a parse
pub type ParseResult<T> = Result<T, LocatedParseError>;

/// Errors that can occur during parsing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// A syntax error.
    #[error("Syntax error: {0}")]
    SyntaxError(String),
    /// More input needed.
    #[error("Expected further input: {0}")]
    MissingInput(String),
    /// Expected a specific token.
    #[error(r#"Expected "{0}""#)]
    ExpectedToken(String),
    /// Expected an expression.
    #[error("Expected an expression, i.e. a list, a string or a number")]
    ExpectedExpression,
    /// Expected a type name after an opening parenthesis.
    #[error("Expected a type name")]
    ExpectedTypeName,
    /// Expected a string literal.
    #[error("Expected a string literal")]
    ExpectedStringLiteral,
    /// Name of a type that does not exist.
    #[error(r#"Unknown type "{0}""#)]
    UnknownType(String),
    /// A type that cannot be written down as an atom.
    #[error(r#"Type "{0}" is neither a node nor a link type"#)]
    NotAnAtomType(String),
    /// A node expression without exactly one name.
    #[error(r#"Node "{0}" expects exactly one name"#)]
    NodeArity(String),
    /// Something other than an atom occurs inside of a link.
    #[error(r#"Link "{0}" may only contain atoms"#)]
    ExpectedAtom(String),
    /// A malformed truth value.
    #[error(r#"Truth value "{0}" expects {1} numbers"#)]
    TruthValueArity(String, usize),
    /// Lists nested deeper than the parser accepts.
    #[error("Expressions may be nested at most {0} levels deep")]
    NestingTooDeep(usize),
    /// A truth value that is not attached to an atom.
    #[error("A truth value must be the last element of an atom")]
    DetachedTruthValue,
}

/// A [ParseError] together with the amount of input left when it occurred.
#[derive(Debug, Clone)]
pub(crate) struct PendingParseError {
    pub(crate) source: ParseError,
    pub(crate) remaining: usize,
    pub(crate) context: Vec<PendingParseError>,
}

impl ParseError {
    /// Attach the position given by the remaining `input`.
    pub(crate) fn at(self, input: &str) -> PendingParseError {
        PendingParseError {
            source: self,
            remaining: input.len(),
            context: Vec::new(),
        }
    }

    /// Attach a position given as byte offset into `full`.
    pub(crate) fn at_offset(self, full: &str, offset: usize) -> LocatedParseError {
        PendingParseError {
            source: self,
            remaining: full.len().saturating_sub(offset),
            context: Vec::new(),
        }
        .locate(full)
    }
}

impl PendingParseError {
    /// Append another [PendingParseError] as context to this error.
    pub(crate) fn append(&mut self, other: PendingParseError) {
        self.context.push(other)
    }

    /// Resolve the position of this error within `full`.
    pub(crate) fn locate(self, full: &str) -> LocatedParseError {
        let offset = full.len().saturating_sub(self.remaining);
        let before = &full[..floor_char_boundary(full, offset)];

        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |index| index + 1);
        let column = before[line_start..].chars().count() + 1;

        let line_text = full[line_start..]
            .lines()
            .next()
            .unwrap_or_default()
            .to_string();
        let fragment = format!("\"{line_text}\"\n{}^", "-".repeat(column));

        LocatedParseError {
            source: self.source,
            line,
            column,
            fragment,
            context: self
                .context
                .into_iter()
                .map(|context| context.locate(full))
                .collect(),
        }
    }
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// A [ParseError] at a certain location
#[derive(Debug, Clone, Error)]
#[error("Parse error on line {}, column {}: {}\nat {}{}", .line, .column, .source, .fragment, format_parse_error_context(.context))]
pub struct LocatedParseError {
    #[source]
    pub(crate) source: ParseError,
    pub(crate) line: usize,
    pub(crate) column: usize,
    pub(crate) fragment: String,
    pub(crate) context: Vec<LocatedParseError>,
}

impl LocatedParseError {
    /// Return the underlying [ParseError].
    pub fn kind(&self) -> &ParseError {
        &self.source
    }

    /// Line of the error, starting at 1.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Column of the error, starting at 1.
    pub fn column(&self) -> usize {
        self.column
    }
}

fn format_parse_error_context(context: &[LocatedParseError]) -> String {
    let mut fragments = Vec::new();

    for error in context {
        let error_string = format!("{error}");
        for line in error_string.split('\n') {
            fragments.push(format!("{}{line}", " ".repeat(2)));
        }
    }

    if fragments.is_empty() {
        String::new()
    } else {
        format!("\nContext:\n{}", fragments.join("\n"))
    }
}

impl nom::error::ParseError<&str> for PendingParseError {
    fn from_error_kind(input: &str, kind: ErrorKind) -> Self {
        ParseError::SyntaxError(kind.description().to_string()).at(input)
    }

    fn append(input: &str, kind: ErrorKind, other: Self) -> Self {
        let mut error = ParseError::SyntaxError(kind.description().to_string()).at(input);
        error.append(other);
        error
    }
}

impl FromExternalError<&str, ParseError> for PendingParseError {
    fn from_external_error(input: &str, _kind: ErrorKind, e: ParseError) -> Self {
        e.at(input)
    }
}

#[cfg(test)]
mod test {
    use super::ParseError;

    use test_log::test;

    #[test]
    fn positions() {
        let input = "(Concept \"a\")\n  (List\n    oops)";
        let offset = input.find("oops").unwrap();
        let error = ParseError::ExpectedExpression.at_offset(input, offset);

        assert_eq!(error.line(), 3);
        assert_eq!(error.column(), 5);
        assert!(error.to_string().starts_with("Parse error on line 3, column 5"));
    }
}
