//! Syntax tree of Atomese s-expressions.

/// Kinds of [SExpression]
#[derive(Debug, Clone, PartialEq)]
pub enum SExpressionKind<'a> {
    /// A parenthesised list starting with a symbol
    List {
        /// The leading symbol, e.g. `ConceptNode` or `stv`
        head: &'a str,
        /// Remaining elements
        items: Vec<SExpression<'a>>,
    },
    /// A quoted string, with escapes resolved
    String(String),
    /// A number
    Number(f64),
    /// A bare symbol
    Symbol(&'a str),
}

/// An s-expression together with its position in the input
#[derive(Debug, Clone, PartialEq)]
pub struct SExpression<'a> {
    /// Byte offset of the first character
    pub offset: usize,
    /// The expression itself
    pub kind: SExpressionKind<'a>,
}

impl<'a> SExpression<'a> {
    /// Return a short description used in error messages.
    pub fn describe(&self) -> String {
        match &self.kind {
            SExpressionKind::List { head, .. } => (*head).to_string(),
            SExpressionKind::String(string) => format!("\"{string}\""),
            SExpressionKind::Number(number) => number.to_string(),
            SExpressionKind::Symbol(symbol) => (*symbol).to_string(),
        }
    }
}
