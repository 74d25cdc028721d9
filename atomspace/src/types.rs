//! This module defines [Type], the static hierarchy of atom and value types.

use std::fmt;

use ascii_tree::Tree;
use enum_assoc::Assoc;
use once_cell::sync::Lazy;
use serde::{Serialize, Serializer};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use crate::{atom::string_hash, error::Error};

/// Type of a value or atom
///
/// Every type except [Type::Value] has exactly one parent type.
/// The hierarchy is fixed at compile time.
#[derive(Assoc, EnumIter, Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[func(pub fn name(&self) -> &'static str)]
#[func(fn parent_type(&self) -> Type)]
pub enum Type {
    /// Root of the hierarchy
    #[assoc(name = "Value", parent_type = Type::Value)]
    Value,
    /// Vector of floating point numbers
    #[assoc(name = "FloatValue", parent_type = Type::Value)]
    FloatValue,
    /// Vector of strings
    #[assoc(name = "StringValue", parent_type = Type::Value)]
    StringValue,
    /// Vector of values
    #[assoc(name = "LinkValue", parent_type = Type::Value)]
    LinkValue,
    /// Base type of all truth values
    #[assoc(name = "TruthValue", parent_type = Type::Value)]
    TruthValue,
    /// Truth value given by mean and confidence
    #[assoc(name = "SimpleTruthValue", parent_type = Type::TruthValue)]
    SimpleTruthValue,
    /// Truth value given by mean, confidence and count
    #[assoc(name = "CountTruthValue", parent_type = Type::TruthValue)]
    CountTruthValue,
    /// Base type of all atoms
    #[assoc(name = "Atom", parent_type = Type::Value)]
    Atom,
    /// Atoms identified by a name
    #[assoc(name = "Node", parent_type = Type::Atom)]
    Node,
    /// Atoms identified by their outgoing set
    #[assoc(name = "Link", parent_type = Type::Atom)]
    Link,

    #[assoc(name = "ConceptNode", parent_type = Type::Node)]
    ConceptNode,
    #[assoc(name = "PredicateNode", parent_type = Type::Node)]
    PredicateNode,
    #[assoc(name = "SchemaNode", parent_type = Type::Node)]
    SchemaNode,
    #[assoc(name = "VariableNode", parent_type = Type::Node)]
    VariableNode,
    #[assoc(name = "GlobNode", parent_type = Type::Node)]
    GlobNode,
    #[assoc(name = "NumberNode", parent_type = Type::Node)]
    NumberNode,
    #[assoc(name = "TypeNode", parent_type = Type::Node)]
    TypeNode,
    #[assoc(name = "AnchorNode", parent_type = Type::Node)]
    AnchorNode,
    /// Base type of layered atomspaces
    #[assoc(name = "Frame", parent_type = Type::Node)]
    Frame,
    #[assoc(name = "AtomSpace", parent_type = Type::Frame)]
    AtomSpace,

    #[assoc(name = "ListLink", parent_type = Type::Link)]
    ListLink,
    #[assoc(name = "SetLink", parent_type = Type::Link)]
    SetLink,
    #[assoc(name = "MemberLink", parent_type = Type::Link)]
    MemberLink,
    #[assoc(name = "InheritanceLink", parent_type = Type::Link)]
    InheritanceLink,
    #[assoc(name = "SimilarityLink", parent_type = Type::Link)]
    SimilarityLink,
    #[assoc(name = "EvaluationLink", parent_type = Type::Link)]
    EvaluationLink,
    #[assoc(name = "ExecutionLink", parent_type = Type::Link)]
    ExecutionLink,
    #[assoc(name = "ContextLink", parent_type = Type::Link)]
    ContextLink,
    #[assoc(name = "AndLink", parent_type = Type::Link)]
    AndLink,
    #[assoc(name = "OrLink", parent_type = Type::Link)]
    OrLink,
    #[assoc(name = "NotLink", parent_type = Type::Link)]
    NotLink,
    #[assoc(name = "VariableList", parent_type = Type::Link)]
    VariableList,
    #[assoc(name = "VariableSet", parent_type = Type::Link)]
    VariableSet,
    #[assoc(name = "TypedVariableLink", parent_type = Type::Link)]
    TypedVariableLink,
    /// Links binding variables
    #[assoc(name = "ScopeLink", parent_type = Type::Link)]
    ScopeLink,
    #[assoc(name = "LambdaLink", parent_type = Type::ScopeLink)]
    LambdaLink,
    #[assoc(name = "RuleLink", parent_type = Type::ScopeLink)]
    RuleLink,
    /// Links of which at most one may exist for a given first atom
    #[assoc(name = "UniqueLink", parent_type = Type::Link)]
    UniqueLink,
    #[assoc(name = "GrantLink", parent_type = Type::UniqueLink)]
    GrantLink,
    #[assoc(name = "DefineLink", parent_type = Type::UniqueLink)]
    DefineLink,
}

/// Types in declaration order, used for name lookups
static ALL_TYPES: Lazy<Vec<Type>> = Lazy::new(|| Type::iter().collect());

impl Type {
    /// Return the parent of this type, or `None` for the root.
    pub fn parent(&self) -> Option<Type> {
        let parent = self.parent_type();
        (parent != *self).then_some(parent)
    }

    /// Check whether `self` is `other` or one of its descendants.
    pub fn is_a(&self, other: Type) -> bool {
        let mut current = *self;

        loop {
            if current == other {
                return true;
            }

            match current.parent() {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Whether this is a node type.
    pub fn is_node(&self) -> bool {
        self.is_a(Type::Node)
    }

    /// Whether this is a link type.
    pub fn is_link(&self) -> bool {
        self.is_a(Type::Link)
    }

    /// Whether this is an atom type.
    pub fn is_atom(&self) -> bool {
        self.is_a(Type::Atom)
    }

    /// Return the direct children of this type.
    pub fn children(&self) -> impl Iterator<Item = Type> + '_ {
        ALL_TYPES
            .iter()
            .copied()
            .filter(move |child| child.parent() == Some(*self))
    }

    /// Return all descendants of this type, excluding itself.
    pub fn children_recursive(&self) -> Vec<Type> {
        ALL_TYPES
            .iter()
            .copied()
            .filter(|child| child != self && child.is_a(*self))
            .collect()
    }

    /// Find a type by its full name (`ConceptNode`) or by its
    /// short Atomese name (`Concept`, `List`).
    pub fn from_name(name: &str) -> Result<Type, Error> {
        let exact = ALL_TYPES.iter().find(|t| t.name() == name);
        if let Some(found) = exact {
            return Ok(*found);
        }

        ALL_TYPES
            .iter()
            .find(|t| {
                let full = t.name();
                (t.is_node() && full.strip_suffix("Node") == Some(name))
                    || (t.is_link() && full.strip_suffix("Link") == Some(name))
            })
            .copied()
            .ok_or_else(|| Error::UnknownType {
                name: name.to_string(),
            })
    }

    /// Hash of the type name.
    ///
    /// Only depends on the name, so adding types does not change it.
    pub fn type_hash(&self) -> u64 {
        string_hash(self.name())
    }

    /// Render the hierarchy below this type.
    pub fn tree(&self) -> Tree {
        let children: Vec<Tree> = self.children().map(|child| child.tree()).collect();

        if children.is_empty() {
            Tree::Leaf(vec![self.name().to_string()])
        } else {
            Tree::Node(self.name().to_string(), children)
        }
    }

    /// Render the hierarchy below this type as a string.
    pub fn tree_string(&self) -> String {
        let mut result = String::new();
        // Writing into a `String` does not fail
        let _ = ascii_tree::write_tree(&mut result, &self.tree());
        result
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Type {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}
