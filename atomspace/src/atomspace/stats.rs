//! This module defines [AtomSpaceStats].

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::Type;

use super::AtomSpace;

/// Summary of the contents of an [AtomSpace]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AtomSpaceStats {
    /// Name of the atomspace
    pub name: String,
    /// Number of parent frames below it
    pub depth: usize,
    /// Number of visible atoms
    pub size: usize,
    /// Number of visible nodes
    pub nodes: usize,
    /// Number of visible links
    pub links: usize,
    /// Number of visible atoms per type
    pub types: BTreeMap<Type, usize>,
}

impl AtomSpaceStats {
    pub(crate) fn collect(space: &AtomSpace) -> Self {
        let atoms = space.atoms();

        let mut types = BTreeMap::new();
        for atom in &atoms {
            *types.entry(atom.atom_type()).or_insert(0) += 1;
        }

        Self {
            name: space.name().to_string(),
            depth: space.depth(),
            size: atoms.len(),
            nodes: atoms.iter().filter(|atom| atom.is_node()).count(),
            links: atoms.iter().filter(|atom| atom.is_link()).count(),
            types,
        }
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod test {
    use crate::{atomspace::AtomSpace, types::Type};

    use test_log::test;

    #[test]
    fn counts_per_type() {
        let space = AtomSpace::named("stats", Vec::new());
        let a = space.add_node(Type::ConceptNode, "a").unwrap();
        let b = space.add_node(Type::ConceptNode, "b").unwrap();
        space.add_link(Type::ListLink, vec![a, b]).unwrap();

        let stats = space.stats();
        assert_eq!(stats.size, 3);
        assert_eq!(stats.nodes, 2);
        assert_eq!(stats.links, 1);
        assert_eq!(stats.types.get(&Type::ConceptNode), Some(&2));
        assert_eq!(stats.types.get(&Type::ListLink), Some(&1));

        let json: serde_json::Value = serde_json::from_str(&stats.to_json().unwrap()).unwrap();
        assert_eq!(json["name"], "stats");
        assert_eq!(json["types"]["ConceptNode"], 2);
    }
}
