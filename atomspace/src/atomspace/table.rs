//! This module defines [AtomTable], the storage of a single frame.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::{atom::Handle, types::Type, value::Value};

/// Values attached to an atom, by key
pub(crate) type Values = BTreeMap<Handle, Value>;

/// Atoms containing a given atom, grouped by their type
pub(crate) type IncomingSet = HashMap<Type, HashSet<Handle>>;

/// Atoms, values and incoming sets held by one frame
#[derive(Debug, Default)]
pub(crate) struct AtomTable {
    /// Atoms of this frame with their values
    atoms: HashMap<Handle, Values>,
    /// Incoming sets contributed by links of this frame.
    /// Keys may be atoms that live in a parent frame.
    incoming: HashMap<Handle, IncomingSet>,
    /// Atoms of parent frames that were removed in this frame
    hidden: HashSet<Handle>,
}

impl AtomTable {
    /// Return the handle stored for `atom`, if any.
    pub(crate) fn get(&self, atom: &Handle) -> Option<&Handle> {
        self.atoms.get_key_value(atom).map(|(key, _)| key)
    }

    /// Whether `atom` was hidden in this frame.
    pub(crate) fn is_hidden(&self, atom: &Handle) -> bool {
        self.hidden.contains(atom)
    }

    /// Return the values of `atom`, if it is stored here.
    pub(crate) fn values(&self, atom: &Handle) -> Option<&Values> {
        self.atoms.get(atom)
    }

    /// Return the values of `atom`, inserting `initial` if it is not stored here.
    pub(crate) fn values_mut(&mut self, atom: &Handle, initial: Values) -> &mut Values {
        if !self.atoms.contains_key(atom) {
            self.insert(atom.clone(), initial);
        }

        self.atoms.entry(atom.clone()).or_default()
    }

    /// Insert `atom` and register it in the incoming sets of its outgoing atoms.
    pub(crate) fn insert(&mut self, atom: Handle, values: Values) {
        self.hidden.remove(&atom);

        if let Ok(outgoing) = atom.outgoing() {
            for child in outgoing {
                self.incoming
                    .entry(child.clone())
                    .or_default()
                    .entry(atom.atom_type())
                    .or_default()
                    .insert(atom.clone());
            }
        }

        self.atoms.insert(atom, values);
    }

    /// Remove `atom` from this frame.
    ///
    /// Returns `true` if it was stored here.
    pub(crate) fn remove(&mut self, atom: &Handle) -> bool {
        let Some((stored, _)) = self.atoms.remove_entry(atom) else {
            return false;
        };

        if let Ok(outgoing) = stored.outgoing() {
            for child in outgoing {
                let Some(by_type) = self.incoming.get_mut(child) else {
                    continue;
                };

                if let Some(set) = by_type.get_mut(&stored.atom_type()) {
                    set.remove(&stored);
                    if set.is_empty() {
                        by_type.remove(&stored.atom_type());
                    }
                }

                if by_type.is_empty() {
                    self.incoming.remove(child);
                }
            }
        }

        true
    }

    /// Mark an atom of a parent frame as removed in this frame.
    pub(crate) fn hide(&mut self, atom: Handle) {
        self.hidden.insert(atom);
    }

    /// Incoming links of `atom` recorded in this frame, optionally
    /// restricted to descendants of `link_type`.
    pub(crate) fn incoming(&self, atom: &Handle, link_type: Option<Type>) -> Vec<Handle> {
        let Some(by_type) = self.incoming.get(atom) else {
            return Vec::new();
        };

        by_type
            .iter()
            .filter(|(t, _)| link_type.map_or(true, |wanted| t.is_a(wanted)))
            .flat_map(|(_, set)| set.iter().cloned())
            .collect()
    }

    /// Iterate over the atoms stored in this frame.
    pub(crate) fn atoms(&self) -> impl Iterator<Item = &Handle> {
        self.atoms.keys()
    }

    /// Iterate over the hidden atoms.
    pub(crate) fn hidden(&self) -> impl Iterator<Item = &Handle> {
        self.hidden.iter()
    }

    /// Number of atoms stored in this frame.
    pub(crate) fn len(&self) -> usize {
        self.atoms.len()
    }

    /// Remove everything.
    pub(crate) fn clear(&mut self) {
        self.atoms.clear();
        self.incoming.clear();
        self.hidden.clear();
    }
}
