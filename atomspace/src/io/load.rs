//! Loading Atomese text into an [AtomSpace].

use std::{fs::read_to_string, path::Path};

use crate::{
    atom::{Atom, Handle},
    atomspace::AtomSpace,
    error::Error,
    types::Type,
    value::TruthValue,
};

use super::parser::{
    ast::{SExpression, SExpressionKind},
    parse_expressions, LocatedParseError, ParseError, MAX_NESTING,
};

/// An atom built from text, not yet inserted
type Built = (Handle, Option<TruthValue>);

/// Turns [SExpression]s into atoms, locating errors within `input`.
struct AtomBuilder<'a> {
    input: &'a str,
}

impl<'a> AtomBuilder<'a> {
    fn error(&self, expression: &SExpression, error: ParseError) -> LocatedParseError {
        error.at_offset(self.input, expression.offset)
    }

    fn truth_value(
        &self,
        expression: &SExpression,
        head: &str,
        items: &[SExpression],
    ) -> Result<TruthValue, LocatedParseError> {
        let numbers = items
            .iter()
            .map(|item| match item.kind {
                SExpressionKind::Number(number) => Some(number),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .unwrap_or_default();

        match (head, &numbers[..]) {
            ("stv", [mean, confidence]) => Ok(TruthValue::simple(*mean, *confidence)),
            ("ctv", [mean, confidence, count]) => {
                Ok(TruthValue::count(*mean, *confidence, *count))
            }
            _ => {
                let expected = if head == "stv" { 2 } else { 3 };
                Err(self.error(
                    expression,
                    ParseError::TruthValueArity(head.to_string(), expected),
                ))
            }
        }
    }

    /// Build the atom written by `expression`, which is nested in `depth` links.
    fn build(&self, expression: &SExpression, depth: usize) -> Result<Built, LocatedParseError> {
        if depth > MAX_NESTING {
            return Err(self.error(expression, ParseError::NestingTooDeep(MAX_NESTING)));
        }

        let SExpressionKind::List { head, items } = &expression.kind else {
            return Err(self.error(expression, ParseError::ExpectedExpression));
        };

        if is_truth_value(head) {
            return Err(self.error(expression, ParseError::DetachedTruthValue));
        }

        let atom_type = Type::from_name(head)
            .map_err(|_| self.error(expression, ParseError::UnknownType(head.to_string())))?;

        // A trailing truth value belongs to the atom itself
        let (items, tv) = match items.split_last() {
            Some((last, rest)) => match &last.kind {
                SExpressionKind::List { head, items: tv } if is_truth_value(head) => {
                    (rest, Some(self.truth_value(last, head, tv)?))
                }
                _ => (&items[..], None),
            },
            None => (&items[..], None),
        };

        let atom = if atom_type.is_node() {
            let name = match items {
                [SExpression {
                    kind: SExpressionKind::String(name),
                    ..
                }] => name.clone(),
                [SExpression {
                    kind: SExpressionKind::Number(number),
                    ..
                }] if atom_type.is_a(Type::NumberNode) => number.to_string(),
                _ => {
                    return Err(
                        self.error(expression, ParseError::NodeArity(atom_type.to_string()))
                    )
                }
            };
            Atom::node(atom_type, name)
        } else if atom_type.is_link() {
            let mut outgoing = Vec::with_capacity(items.len());
            for item in items {
                match &item.kind {
                    SExpressionKind::List { head, .. } if is_truth_value(head) => {
                        return Err(self.error(item, ParseError::DetachedTruthValue))
                    }
                    SExpressionKind::List { .. } => {
                        let (child, child_tv) = self.build(item, depth + 1)?;
                        if child_tv.is_some() {
                            return Err(self.error(item, ParseError::DetachedTruthValue));
                        }
                        outgoing.push(child);
                    }
                    _ => {
                        return Err(
                            self.error(item, ParseError::ExpectedAtom(atom_type.to_string()))
                        )
                    }
                }
            }
            Atom::link(atom_type, outgoing)
        } else {
            return Err(self.error(expression, ParseError::NotAnAtomType(head.to_string())));
        };

        // Both constructors only reject non-atom types, excluded above
        atom.map(|atom| (atom, tv))
            .map_err(|_| self.error(expression, ParseError::NotAnAtomType(head.to_string())))
    }
}

fn is_truth_value(head: &str) -> bool {
    matches!(head, "stv" | "ctv")
}

/// Parse `input` and add every top-level atom to `atomspace`.
///
/// Nothing is added if `input` contains an error.
/// Returns the handles held by `atomspace`, in input order.
pub fn load_str(atomspace: &AtomSpace, input: &str) -> Result<Vec<Handle>, Error> {
    let expressions = parse_expressions(input)?;
    let builder = AtomBuilder { input };

    let built = expressions
        .iter()
        .map(|expression| builder.build(expression, 0))
        .collect::<Result<Vec<_>, _>>()?;

    let mut result = Vec::with_capacity(built.len());
    for (atom, tv) in built {
        let atom = atomspace.add_atom(&atom)?;
        if let Some(tv) = tv {
            atomspace.set_truth_value(&atom, tv)?;
        }
        result.push(atom);
    }

    log::debug!(
        "loaded {} atoms into atomspace \"{}\"",
        result.len(),
        atomspace.name()
    );

    Ok(result)
}

/// Read the file at `path` and load its contents into `atomspace`.
pub fn load_file<P: AsRef<Path>>(atomspace: &AtomSpace, path: P) -> Result<Vec<Handle>, Error> {
    let path = path.as_ref();
    log::info!("loading {}", path.display());

    let input = read_to_string(path).map_err(|error| Error::IOReading {
        error,
        filename: path.to_path_buf(),
    })?;

    load_str(atomspace, &input)
}

#[cfg(test)]
mod test {
    use assert_fs::{prelude::*, TempDir};

    use super::{load_file, load_str};
    use crate::{
        atomspace::AtomSpace,
        error::Error,
        io::parser::{ParseError, MAX_NESTING},
        types::Type,
        value::TruthValue,
    };

    use test_log::test;

    #[test]
    fn nodes_links_and_short_names() {
        let space = AtomSpace::new();
        let loaded = load_str(
            &space,
            r#"
            (Inheritance (Concept "cat") (ConceptNode "animal"))
            (ListLink (Number 3) (NumberNode "4.5"))
            "#,
        )
        .unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].atom_type(), Type::InheritanceLink);
        assert_eq!(space.size(), 6);
        assert!(space.get_node(Type::ConceptNode, "cat").is_some());
        assert!(space.get_node(Type::NumberNode, "3").is_some());
        assert!(space.get_node(Type::NumberNode, "4.5").is_some());
    }

    #[test]
    fn truth_values() {
        let space = AtomSpace::new();
        let loaded = load_str(
            &space,
            r#"(Concept "a" (stv 0.5 0.25))
               (Member (Concept "b") (Concept "c") (ctv 1 0.5 800))"#,
        )
        .unwrap();

        assert_eq!(space.truth_value(&loaded[0]), TruthValue::simple(0.5, 0.25));
        assert_eq!(
            space.truth_value(&loaded[1]),
            TruthValue::count(1.0, 0.5, 800.0)
        );
        let b = space.get_node(Type::ConceptNode, "b").unwrap();
        assert!(space.truth_value(&b).is_default());
    }

    #[test]
    fn loading_twice_is_idempotent() {
        let space = AtomSpace::new();
        let text = r#"(Evaluation (Predicate "p") (List (Concept "a") (Concept "b")))"#;

        let first = load_str(&space, text).unwrap();
        let size = space.size();
        let second = load_str(&space, text).unwrap();

        assert_eq!(first, second);
        assert_eq!(space.size(), size);
    }

    #[test]
    fn located_errors() {
        let space = AtomSpace::new();

        let Err(Error::Parse(error)) = load_str(&space, "(Concept \"a\")\n(Frobnicate \"b\")")
        else {
            panic!("expected a parse error");
        };
        assert_eq!(error.line(), 2);
        assert_eq!(error.column(), 1);
        assert_eq!(error.kind(), &ParseError::UnknownType("Frobnicate".to_string()));

        // nothing was added
        assert!(space.is_empty());
    }

    #[test]
    fn malformed_atoms() {
        let space = AtomSpace::new();

        let kind = |text: &str| match load_str(&space, text) {
            Err(Error::Parse(error)) => error.kind().clone(),
            other => panic!("expected a parse error, got {other:?}"),
        };

        assert_eq!(
            kind(r#"(Concept "a" "b")"#),
            ParseError::NodeArity("ConceptNode".to_string())
        );
        assert_eq!(
            kind(r#"(List "a")"#),
            ParseError::ExpectedAtom("ListLink".to_string())
        );
        assert_eq!(
            kind(r#"(Concept "a" (stv 1))"#),
            ParseError::TruthValueArity("stv".to_string(), 2)
        );
        assert_eq!(kind("(stv 1 1)"), ParseError::DetachedTruthValue);
        assert_eq!(
            kind(r#"(List (stv 1 1) (Concept "a"))"#),
            ParseError::DetachedTruthValue
        );
        assert_eq!(
            kind(r#"(TruthValue "a")"#),
            ParseError::NotAnAtomType("TruthValue".to_string())
        );
        assert_eq!(kind(r#""loose""#), ParseError::ExpectedExpression);
    }

    #[test]
    fn deeply_nested_links() {
        let nested = |depth: usize| {
            format!(
                "{}(Concept \"a\"){}",
                "(List ".repeat(depth),
                ")".repeat(depth)
            )
        };

        let space = AtomSpace::new();
        let loaded = load_str(&space, &nested(MAX_NESTING - 1)).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(space.size(), MAX_NESTING);

        let other = AtomSpace::new();
        let Err(Error::Parse(error)) = load_str(&other, &nested(10_000)) else {
            panic!("expected a parse error");
        };
        assert_eq!(error.kind(), &ParseError::NestingTooDeep(MAX_NESTING));
        assert!(other.is_empty());
    }

    #[test]
    fn files() {
        let dir = TempDir::new().unwrap();
        let file = dir.child("kb.scm");
        file.write_str("; animals\n(Inheritance (Concept \"cat\") (Concept \"animal\"))\n")
            .unwrap();

        let space = AtomSpace::new();
        let loaded = load_file(&space, file.path()).unwrap();
        assert_eq!(loaded.len(), 1);

        let missing = load_file(&space, dir.child("missing.scm").path());
        assert!(matches!(missing, Err(Error::IOReading { .. })));
    }
}
