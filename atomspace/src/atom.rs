//! This module defines [Atom] and [Handle].
//!
//! Atoms are immutable. A node is identified by its type and name, a link
//! by its type and outgoing sequence. Equality, hashing and ordering are
//! all based on content, so two separately built atoms with the same
//! content are interchangeable.

use std::{cmp::Ordering, fmt, hash::Hash, ops::Deref, sync::Arc};

use crate::{error::Error, types::Type};

/// Multiplier mixed into every hash; `(1 << 44) - 377` is prime.
const HASH_PRIME: u64 = (1 << 44) - 377;
/// Most significant bit, set for links and cleared for nodes.
const LINK_MASK: u64 = 1 << 63;

/// Bit-mixing of the murmur64 finaliser
fn murmur_mix(mut hash: u64) -> u64 {
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51_afd7_ed55_8ccd);
    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    hash ^= hash >> 33;
    hash
}

/// 64-bit FNV-1a over the given bytes
pub(crate) fn string_hash(name: &str) -> u64 {
    name.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

/// Quote a node name, escaping `"` and `\`.
pub(crate) fn quote_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 2);
    result.push('"');
    for c in name.chars() {
        if c == '"' || c == '\\' {
            result.push('\\');
        }
        result.push(c);
    }
    result.push('"');
    result
}

#[derive(Debug)]
enum Content {
    Node(String),
    Link(Vec<Handle>),
}

/// A node or a link
#[derive(Debug)]
pub struct Atom {
    atom_type: Type,
    content: Content,
    hash: u64,
    /// No variables occur anywhere in this atom
    closed: bool,
}

impl Atom {
    /// Create a new node.
    ///
    /// # Errors
    /// Returns an error if `atom_type` is not a node type.
    pub fn node(atom_type: Type, name: impl Into<String>) -> Result<Handle, Error> {
        if !atom_type.is_node() {
            return Err(Error::InvalidType {
                expected: Type::Node,
                found: atom_type,
            });
        }

        let name = name.into();

        let mut hash = string_hash(&name);
        hash = hash.wrapping_add((hash << 5) ^ HASH_PRIME.wrapping_mul(atom_type.type_hash()));
        hash = murmur_mix(hash) & !LINK_MASK;

        let closed = !(atom_type.is_a(Type::VariableNode) || atom_type.is_a(Type::GlobNode));

        Ok(Handle(Arc::new(Atom {
            atom_type,
            content: Content::Node(name),
            hash,
            closed,
        })))
    }

    /// Create a new link.
    ///
    /// # Errors
    /// Returns an error if `atom_type` is not a link type.
    pub fn link(atom_type: Type, outgoing: Vec<Handle>) -> Result<Handle, Error> {
        if !atom_type.is_link() {
            return Err(Error::InvalidType {
                expected: Type::Link,
                found: atom_type,
            });
        }

        let closed = outgoing.iter().all(|atom| atom.closed);
        let unique = closed && atom_type.is_a(Type::GrantLink) && !outgoing.is_empty();

        // Closed grants are identified by their first atom alone
        let hashed = if unique {
            &outgoing[..1]
        } else {
            &outgoing[..]
        };

        let mut hash = HASH_PRIME.wrapping_mul(atom_type.type_hash());
        for atom in hashed {
            hash = hash.wrapping_add((hash << 5) ^ 353u64.wrapping_mul(atom.hash));
        }
        hash = murmur_mix(hash) | LINK_MASK;

        Ok(Handle(Arc::new(Atom {
            atom_type,
            content: Content::Link(outgoing),
            hash,
            closed,
        })))
    }

    /// Return the type of this atom.
    pub fn atom_type(&self) -> Type {
        self.atom_type
    }

    /// Check whether this atom's type is `atom_type` or a descendant of it.
    pub fn is_type(&self, atom_type: Type) -> bool {
        self.atom_type.is_a(atom_type)
    }

    /// Whether this atom is a node.
    pub fn is_node(&self) -> bool {
        matches!(self.content, Content::Node(_))
    }

    /// Whether this atom is a link.
    pub fn is_link(&self) -> bool {
        matches!(self.content, Content::Link(_))
    }

    /// Whether no variable occurs in this atom.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Content hash of this atom.
    pub fn content_hash(&self) -> u64 {
        self.hash
    }

    /// Return the name of a node.
    ///
    /// # Errors
    /// Returns an error if this atom is a link.
    pub fn name(&self) -> Result<&str, Error> {
        match &self.content {
            Content::Node(name) => Ok(name),
            Content::Link(_) => Err(Error::NotANode(self.to_short_string())),
        }
    }

    /// Return the outgoing set of a link.
    ///
    /// # Errors
    /// Returns an error if this atom is a node.
    pub fn outgoing(&self) -> Result<&[Handle], Error> {
        match &self.content {
            Content::Node(_) => Err(Error::NotALink(self.to_short_string())),
            Content::Link(outgoing) => Ok(outgoing),
        }
    }

    /// Number of atoms in the outgoing set; zero for nodes.
    pub fn arity(&self) -> usize {
        match &self.content {
            Content::Node(_) => 0,
            Content::Link(outgoing) => outgoing.len(),
        }
    }

    /// Closed grants only compare their first atom.
    fn is_unique(&self) -> bool {
        self.closed && self.atom_type.is_a(Type::GrantLink) && self.arity() > 0
    }

    /// Multi-line representation, each line prefixed by `indent`.
    pub fn to_indented_string(&self, indent: &str) -> String {
        match &self.content {
            Content::Node(name) => format!("{indent}({} {})", self.atom_type, quote_name(name)),
            Content::Link(outgoing) if outgoing.is_empty() => {
                format!("{indent}({})", self.atom_type)
            }
            Content::Link(outgoing) => {
                let inner_indent = format!("{indent}  ");
                let children = outgoing
                    .iter()
                    .map(|atom| atom.to_indented_string(&inner_indent))
                    .collect::<Vec<_>>()
                    .join("\n");

                format!("{indent}({}\n{children})", self.atom_type)
            }
        }
    }

    /// Single-line representation.
    pub fn to_short_string(&self) -> String {
        match &self.content {
            Content::Node(name) => format!("({} {})", self.atom_type, quote_name(name)),
            Content::Link(outgoing) => {
                let mut result = format!("({}", self.atom_type);
                for atom in outgoing {
                    result.push(' ');
                    result.push_str(&atom.to_short_string());
                }
                result.push(')');
                result
            }
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_indented_string(""))
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        if self.hash != other.hash || self.atom_type != other.atom_type {
            return false;
        }

        match (&self.content, &other.content) {
            (Content::Node(left), Content::Node(right)) => left == right,
            (Content::Link(left), Content::Link(right)) => {
                if self.is_unique() && other.is_unique() {
                    left[0] == right[0]
                } else {
                    left == right
                }
            }
            _ => false,
        }
    }
}

impl Eq for Atom {}

impl PartialOrd for Atom {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Atom {
    fn cmp(&self, other: &Self) -> Ordering {
        self.atom_type
            .name()
            .cmp(other.atom_type.name())
            .then_with(|| match (&self.content, &other.content) {
                (Content::Node(left), Content::Node(right)) => left.cmp(right),
                (Content::Node(_), Content::Link(_)) => Ordering::Less,
                (Content::Link(_), Content::Node(_)) => Ordering::Greater,
                (Content::Link(left), Content::Link(right)) => {
                    if self.is_unique() && other.is_unique() {
                        left[0].cmp(&right[0])
                    } else {
                        left.len().cmp(&right.len()).then_with(|| left.cmp(right))
                    }
                }
            })
    }
}

/// Shared pointer to an [Atom]
///
/// Cloning a handle is cheap. Handles compare by content.
#[derive(Clone)]
pub struct Handle(Arc<Atom>);

impl Handle {
    /// Whether both handles point to the same allocation.
    pub fn ptr_eq(&self, other: &Handle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for Handle {
    type Target = Atom;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl PartialEq for Handle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || *self.0 == *other.0
    }
}

impl Eq for Handle {}

impl Hash for Handle {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.hash)
    }
}

impl PartialOrd for Handle {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Handle {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.ptr_eq(other) {
            Ordering::Equal
        } else {
            self.0.cmp(&other.0)
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_short_string())
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use super::{Atom, Handle};
    use crate::types::Type;

    use quickcheck_macros::quickcheck;
    use test_log::test;

    fn concept(name: &str) -> Handle {
        Atom::node(Type::ConceptNode, name).unwrap()
    }

    #[test]
    fn content_equality() {
        let a = concept("a");
        let b = concept("a");
        assert!(!a.ptr_eq(&b));
        assert_eq!(a, b);
        assert_eq!(a.content_hash(), b.content_hash());

        let predicate = Atom::node(Type::PredicateNode, "a").unwrap();
        assert_ne!(a, predicate);

        let list = Atom::link(Type::ListLink, vec![a.clone(), concept("b")]).unwrap();
        let same = Atom::link(Type::ListLink, vec![b, concept("b")]).unwrap();
        let reversed = Atom::link(Type::ListLink, vec![concept("b"), a]).unwrap();
        assert_eq!(list, same);
        assert_ne!(list, reversed);

        let set: HashSet<Handle> = [list, same, reversed].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn hash_marks_links() {
        let node = concept("a");
        let link = Atom::link(Type::ListLink, vec![node.clone()]).unwrap();
        assert_eq!(node.content_hash() >> 63, 0);
        assert_eq!(link.content_hash() >> 63, 1);
    }

    #[test]
    fn type_checks() {
        assert!(Atom::node(Type::ListLink, "a").is_err());
        assert!(Atom::link(Type::ConceptNode, vec![]).is_err());
        assert!(Atom::node(Type::FloatValue, "a").is_err());

        let node = concept("a");
        assert!(node.outgoing().is_err());
        assert_eq!(node.name().unwrap(), "a");
        assert_eq!(node.arity(), 0);

        let link = Atom::link(Type::ListLink, vec![node]).unwrap();
        assert!(link.name().is_err());
        assert_eq!(link.arity(), 1);
    }

    #[test]
    fn closed_grants_compare_first_atom() {
        let grant = Atom::link(Type::GrantLink, vec![concept("A"), concept("B")]).unwrap();
        let other = Atom::link(Type::GrantLink, vec![concept("A"), concept("foo")]).unwrap();
        assert_eq!(grant, other);
        assert_eq!(grant.content_hash(), other.content_hash());

        let variable = Atom::node(Type::VariableNode, "$x").unwrap();
        let open = Atom::link(Type::GrantLink, vec![variable.clone(), concept("B")]).unwrap();
        let open_other = Atom::link(Type::GrantLink, vec![variable, concept("C")]).unwrap();
        assert!(!open.is_closed());
        assert_ne!(open, open_other);
    }

    #[test]
    fn string_forms() {
        let list = Atom::link(
            Type::ListLink,
            vec![
                concept("a"),
                Atom::link(Type::SetLink, vec![concept("say \"hi\"")]).unwrap(),
            ],
        )
        .unwrap();

        assert_eq!(
            list.to_string(),
            "(ListLink\n  (ConceptNode \"a\")\n  (SetLink\n    (ConceptNode \"say \\\"hi\\\"\")))"
        );
        assert_eq!(
            list.to_short_string(),
            "(ListLink (ConceptNode \"a\") (SetLink (ConceptNode \"say \\\"hi\\\"\")))"
        );

        let empty = Atom::link(Type::ListLink, vec![]).unwrap();
        assert_eq!(empty.to_string(), "(ListLink)");
    }

    #[test]
    fn ordering() {
        let a = concept("a");
        let b = concept("b");
        let predicate = Atom::node(Type::PredicateNode, "a").unwrap();
        let list = Atom::link(Type::ListLink, vec![a.clone()]).unwrap();
        let longer = Atom::link(Type::ListLink, vec![a.clone(), a.clone()]).unwrap();

        let mut atoms = vec![predicate.clone(), longer.clone(), b.clone(), list.clone(), a.clone()];
        atoms.sort();
        assert_eq!(atoms, vec![a, b, list, longer, predicate]);
    }

    #[quickcheck]
    #[cfg_attr(miri, ignore)]
    fn order_agrees_with_equality(left: String, right: String) -> bool {
        let left = concept(&left);
        let right = concept(&right);
        (left.cmp(&right) == std::cmp::Ordering::Equal) == (left == right)
    }
}
