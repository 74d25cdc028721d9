//! This module defines [AtomSpace], the store holding atoms and their values.
//!
//! An [AtomSpace] may be layered on top of parent spaces, forming a frame.
//! A frame sees every atom of its parents. Additions and value updates only
//! ever touch the frame itself: updating a value on an atom of a parent
//! first copies the atom's values into the frame. Removing an atom of a
//! parent hides it in the frame without affecting the parent.
//!
//! Locks are always taken from a frame towards its parents, never the
//! other way around.

pub(crate) mod stats;
pub(crate) mod table;

use std::{
    collections::HashSet,
    fmt,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak,
    },
};

use crate::{
    atom::{Atom, Handle},
    error::Error,
    types::Type,
    value::{truth_key, TruthValue, Value},
};

pub use stats::AtomSpaceStats;
use table::{AtomTable, Values};

/// Used to generate names for unnamed atomspaces
static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

struct AtomSpaceData {
    name: String,
    parents: Vec<AtomSpace>,
    children: Mutex<Vec<Weak<AtomSpaceData>>>,
    read_only: AtomicBool,
    table: RwLock<AtomTable>,
}

/// Thread-safe, shared store of atoms
///
/// Cloning an [AtomSpace] yields another handle to the same store.
#[derive(Clone)]
pub struct AtomSpace(Arc<AtomSpaceData>);

impl Default for AtomSpace {
    fn default() -> Self {
        Self::new()
    }
}

impl AtomSpace {
    /// Create a new, empty atomspace.
    pub fn new() -> Self {
        Self::with_parents(Vec::new())
    }

    /// Create a new frame on top of `parent`.
    pub fn with_parent(parent: &AtomSpace) -> Self {
        Self::with_parents(vec![parent.clone()])
    }

    /// Create a new frame on top of all the given `parents`.
    pub fn with_parents(parents: Vec<AtomSpace>) -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        Self::named(format!("atomspace-{id}"), parents)
    }

    /// Create a new frame with the given name.
    pub fn named(name: impl Into<String>, parents: Vec<AtomSpace>) -> Self {
        let data = Arc::new(AtomSpaceData {
            name: name.into(),
            parents,
            children: Mutex::new(Vec::new()),
            read_only: AtomicBool::new(false),
            table: RwLock::new(AtomTable::default()),
        });

        for parent in &data.parents {
            parent.lock_children().push(Arc::downgrade(&data));
        }

        let space = AtomSpace(data);
        log::debug!(
            "created atomspace \"{}\" at depth {}",
            space.name(),
            space.depth()
        );

        space
    }

    fn read(&self) -> RwLockReadGuard<'_, AtomTable> {
        self.0.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, AtomTable> {
        self.0.table.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_children(&self) -> std::sync::MutexGuard<'_, Vec<Weak<AtomSpaceData>>> {
        self.0.children.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_writable(&self) -> Result<(), Error> {
        if self.is_read_only() {
            return Err(Error::ReadOnly(self.name().to_string()));
        }

        Ok(())
    }

    /// Return the name of this atomspace.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Return the parent frames.
    pub fn parents(&self) -> &[AtomSpace] {
        &self.0.parents
    }

    /// Return the frames created on top of this one that are still alive.
    ///
    /// Frames that have been dropped are forgotten.
    pub fn children(&self) -> Vec<AtomSpace> {
        let mut children = self.lock_children();
        children.retain(|child| child.strong_count() > 0);
        children
            .iter()
            .filter_map(Weak::upgrade)
            .map(AtomSpace)
            .collect()
    }

    /// Number of frames below this one; zero for a root space.
    pub fn depth(&self) -> usize {
        self.parents()
            .iter()
            .map(|parent| parent.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Whether both handles refer to the same store.
    pub fn ptr_eq(&self, other: &AtomSpace) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Whether mutations are rejected.
    pub fn is_read_only(&self) -> bool {
        self.0.read_only.load(Ordering::Acquire)
    }

    /// Allow or forbid mutations.
    pub fn set_read_only(&self, read_only: bool) {
        log::debug!("atomspace \"{}\" read-only: {read_only}", self.name());
        self.0.read_only.store(read_only, Ordering::Release);
    }

    /// Return the handle this space holds for `atom`, if it is visible here.
    pub fn get_atom(&self, atom: &Handle) -> Option<Handle> {
        {
            let table = self.read();
            if let Some(stored) = table.get(atom) {
                return Some(stored.clone());
            }
            if table.is_hidden(atom) {
                return None;
            }
        }

        self.parents()
            .iter()
            .find_map(|parent| parent.get_atom(atom))
    }

    /// Whether `atom` is visible in this space.
    pub fn contains(&self, atom: &Handle) -> bool {
        self.get_atom(atom).is_some()
    }

    /// Whether `atom` is stored in this frame itself.
    fn holds(&self, atom: &Handle) -> bool {
        self.read().get(atom).is_some()
    }

    /// Return the node with the given type and name, if present.
    pub fn get_node(&self, node_type: Type, name: &str) -> Option<Handle> {
        Atom::node(node_type, name)
            .ok()
            .and_then(|node| self.get_atom(&node))
    }

    /// Return the link with the given type and outgoing set, if present.
    pub fn get_link(&self, link_type: Type, outgoing: &[Handle]) -> Option<Handle> {
        Atom::link(link_type, outgoing.to_vec())
            .ok()
            .and_then(|link| self.get_atom(&link))
    }

    /// Return the closed [Type::GrantLink] granted to `alias`, if any.
    pub fn get_grant(&self, alias: &Handle) -> Option<Handle> {
        // Only the first atom matters for closed grants
        Atom::link(Type::GrantLink, vec![alias.clone(), alias.clone()])
            .ok()
            .filter(|grant| grant.is_closed())
            .and_then(|grant| self.get_atom(&grant))
    }

    /// Insert `atom` and, recursively, its outgoing atoms.
    ///
    /// Returns the handle held by the space, which may be a previously
    /// inserted atom with the same content.
    ///
    /// # Errors
    /// Returns an error if the space is read-only.
    pub fn add_atom(&self, atom: &Handle) -> Result<Handle, Error> {
        self.check_writable()?;

        if let Some(existing) = self.get_atom(atom) {
            return Ok(existing);
        }

        let canonical = match atom.outgoing() {
            Ok(outgoing) => {
                let added = outgoing
                    .iter()
                    .map(|child| self.add_atom(child))
                    .collect::<Result<Vec<_>, _>>()?;

                if added.iter().zip(outgoing).all(|(new, old)| new.ptr_eq(old)) {
                    atom.clone()
                } else {
                    Atom::link(atom.atom_type(), added)?
                }
            }
            Err(_) => atom.clone(),
        };

        let mut table = self.write();
        if let Some(existing) = table.get(&canonical) {
            return Ok(existing.clone());
        }

        log::trace!("{}: adding {canonical:?}", self.name());
        table.insert(canonical.clone(), Values::default());

        Ok(canonical)
    }

    /// Insert a node.
    ///
    /// # Errors
    /// Returns an error if `node_type` is not a node type or the space is read-only.
    pub fn add_node(&self, node_type: Type, name: impl Into<String>) -> Result<Handle, Error> {
        self.add_atom(&Atom::node(node_type, name)?)
    }

    /// Insert a link.
    ///
    /// # Errors
    /// Returns an error if `link_type` is not a link type or the space is read-only.
    pub fn add_link(&self, link_type: Type, outgoing: Vec<Handle>) -> Result<Handle, Error> {
        self.add_atom(&Atom::link(link_type, outgoing)?)
    }

    /// Remove `atom` from this space.
    ///
    /// Returns `false` if the atom is not present, or if it still appears in
    /// other links and `recursive` is not set. Links of child frames that
    /// would lose sight of the atom count as well. With `recursive`, the
    /// links containing the atom are removed first, from whichever frame
    /// holds them.
    ///
    /// # Errors
    /// Returns an error if the space is read-only.
    pub fn extract_atom(&self, atom: &Handle, recursive: bool) -> Result<bool, Error> {
        self.check_writable()?;

        let Some(atom) = self.get_atom(atom) else {
            return Ok(false);
        };

        let incoming = self.incoming_set(&atom);
        let in_children = self.incoming_in_children(&atom);
        if !incoming.is_empty() || !in_children.is_empty() {
            if !recursive {
                log::debug!(
                    "{}: not removing {atom:?}, it has {} incoming links",
                    self.name(),
                    incoming.len() + in_children.len()
                );
                return Ok(false);
            }

            for link in incoming {
                self.extract_atom(&link, true)?;
            }
            for (child, link) in in_children {
                child.extract_atom(&link, true)?;
            }
        }

        let in_parents = self
            .parents()
            .iter()
            .any(|parent| parent.contains(&atom));

        let mut table = self.write();
        table.remove(&atom);
        if in_parents {
            table.hide(atom.clone());
        }

        log::trace!("{}: removed {atom:?}", self.name());

        Ok(true)
    }

    /// Links containing `atom` stored in frames above this one that would
    /// lose sight of `atom` if this frame removed it.
    fn incoming_in_children(&self, atom: &Handle) -> Vec<(AtomSpace, Handle)> {
        let mut result = Vec::new();

        for child in self.children() {
            let provided_elsewhere = child
                .parents()
                .iter()
                .filter(|parent| !parent.ptr_eq(self))
                .any(|parent| parent.contains(atom));
            if provided_elsewhere {
                continue;
            }

            let links = {
                let table = child.read();
                if table.get(atom).is_some() || table.is_hidden(atom) {
                    continue;
                }
                table.incoming(atom, None)
            };

            result.extend(links.into_iter().map(|link| (child.clone(), link)));
            result.extend(child.incoming_in_children(atom));
        }

        result
    }

    /// Remove every atom stored in this frame.
    ///
    /// Atoms of parent frames stay visible.
    ///
    /// # Errors
    /// Returns an error if the space is read-only.
    pub fn clear(&self) -> Result<(), Error> {
        self.check_writable()?;
        log::debug!("clearing atomspace \"{}\"", self.name());
        self.write().clear();
        Ok(())
    }

    /// Return a snapshot of all atoms visible in this space.
    pub fn atoms(&self) -> Vec<Handle> {
        let (mut result, hidden) = {
            let table = self.read();
            let own: Vec<Handle> = table.atoms().cloned().collect();
            let hidden: HashSet<Handle> = table.hidden().cloned().collect();
            (own, hidden)
        };

        if self.parents().is_empty() {
            return result;
        }

        let mut seen: HashSet<Handle> = result.iter().cloned().collect();
        for parent in self.parents() {
            for atom in parent.atoms() {
                if !hidden.contains(&atom) && seen.insert(atom.clone()) {
                    result.push(atom);
                }
            }
        }

        result
    }

    /// Return all visible atoms in ascending order.
    pub fn sorted_atoms(&self) -> Vec<Handle> {
        let mut atoms = self.atoms();
        atoms.sort();
        atoms
    }

    /// Return the atoms of type `atom_type`, including descendant types
    /// if `subclasses` is set.
    pub fn atoms_by_type(&self, atom_type: Type, subclasses: bool) -> Vec<Handle> {
        self.atoms()
            .into_iter()
            .filter(|atom| {
                if subclasses {
                    atom.is_type(atom_type)
                } else {
                    atom.atom_type() == atom_type
                }
            })
            .collect()
    }

    /// Number of visible atoms.
    pub fn size(&self) -> usize {
        if self.parents().is_empty() {
            self.read().len()
        } else {
            self.atoms().len()
        }
    }

    /// Whether no atom is visible.
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Number of visible nodes.
    pub fn num_nodes(&self) -> usize {
        self.atoms().iter().filter(|atom| atom.is_node()).count()
    }

    /// Number of visible links.
    pub fn num_links(&self) -> usize {
        self.atoms().iter().filter(|atom| atom.is_link()).count()
    }

    /// Return the visible links containing `atom`.
    pub fn incoming_set(&self, atom: &Handle) -> Vec<Handle> {
        self.incoming_filtered(atom, None)
    }

    /// Return the visible links of type `link_type` (or a descendant)
    /// containing `atom`.
    pub fn incoming_set_by_type(&self, atom: &Handle, link_type: Type) -> Vec<Handle> {
        self.incoming_filtered(atom, Some(link_type))
    }

    fn incoming_filtered(&self, atom: &Handle, link_type: Option<Type>) -> Vec<Handle> {
        let mut candidates: HashSet<Handle> =
            self.read().incoming(atom, link_type).into_iter().collect();

        for parent in self.parents() {
            candidates.extend(parent.incoming_filtered(atom, link_type));
        }

        let mut result: Vec<Handle> = candidates
            .into_iter()
            .filter(|link| self.contains(link))
            .collect();
        result.sort();
        result
    }

    /// Apply `f` to the values of `atom` in the frame closest to this one
    /// that stores it.
    fn with_values<R>(&self, atom: &Handle, f: &impl Fn(&Values) -> R) -> Option<R> {
        {
            let table = self.read();
            if let Some(values) = table.values(atom) {
                return Some(f(values));
            }
            if table.is_hidden(atom) {
                return None;
            }
        }

        self.parents()
            .iter()
            .find_map(|parent| parent.with_values(atom, f))
    }

    /// Replace the value at `key` of `atom` by the result of `update`,
    /// copying the atom into this frame first if needed.
    fn update_value(
        &self,
        atom: &Handle,
        key: &Handle,
        update: impl FnOnce(Option<&Value>) -> Value,
    ) -> Result<Value, Error> {
        let atom = self.add_atom(atom)?;

        let inherited = if self.holds(&atom) {
            Values::default()
        } else {
            self.with_values(&atom, &Values::clone)
                .unwrap_or_default()
        };

        let mut table = self.write();
        let values = table.values_mut(&atom, inherited);
        let new_value = update(values.get(key));
        values.insert(key.clone(), new_value.clone());

        Ok(new_value)
    }

    /// Attach `value` to `atom` under `key`, inserting `atom` if needed.
    ///
    /// # Errors
    /// Returns an error if the space is read-only.
    pub fn set_value(&self, atom: &Handle, key: &Handle, value: Value) -> Result<(), Error> {
        self.update_value(atom, key, |_| value).map(|_| ())
    }

    /// Return the value of `atom` at `key`.
    pub fn get_value(&self, atom: &Handle, key: &Handle) -> Option<Value> {
        self.with_values(atom, &|values| values.get(key).cloned())
            .flatten()
    }

    /// Return the keys under which `atom` has values.
    pub fn keys(&self, atom: &Handle) -> Vec<Handle> {
        self.with_values(atom, &|values| values.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Return the truth value of `atom`, or the default truth value.
    pub fn truth_value(&self, atom: &Handle) -> TruthValue {
        self.get_value(atom, &truth_key())
            .and_then(|value| value.as_truth_value())
            .unwrap_or_default()
    }

    /// Set the truth value of `atom`.
    ///
    /// # Errors
    /// Returns an error if the space is read-only.
    pub fn set_truth_value(&self, atom: &Handle, tv: TruthValue) -> Result<(), Error> {
        self.set_value(atom, &truth_key(), tv.into())
    }

    /// Add `by` to the entry `index` of the float vector at `key`.
    ///
    /// The vector is created or extended with zeros as needed; any other
    /// value at `key` is replaced.
    ///
    /// # Errors
    /// Returns an error if the space is read-only or `index` is `usize::MAX`.
    pub fn increment_count(
        &self,
        atom: &Handle,
        key: &Handle,
        index: usize,
        by: f64,
    ) -> Result<Value, Error> {
        let length = index
            .checked_add(1)
            .ok_or(Error::IndexOutOfRange(index))?;

        self.update_value(atom, key, |old| {
            let mut floats = old
                .and_then(Value::as_floats)
                .map(<[f64]>::to_vec)
                .unwrap_or_default();

            if floats.len() <= index {
                floats.resize(length, 0.0);
            }
            floats[index] += by;

            Value::Float(floats)
        })
    }

    /// Add `by` observations to the truth value of `atom`.
    ///
    /// # Errors
    /// Returns an error if the space is read-only.
    pub fn increment_count_tv(&self, atom: &Handle, by: f64) -> Result<TruthValue, Error> {
        let value = self.update_value(atom, &truth_key(), |old| {
            let tv = old.and_then(Value::as_truth_value).unwrap_or_default();
            tv.increment_count(by).into()
        })?;

        Ok(value.as_truth_value().unwrap_or_default())
    }

    /// Copy every value of `from` onto `to`.
    ///
    /// # Errors
    /// Returns an error if the space is read-only.
    pub fn copy_values(&self, from: &Handle, to: &Handle) -> Result<(), Error> {
        let values = self.with_values(from, &Values::clone).unwrap_or_default();

        for (key, value) in values {
            self.set_value(to, &key, value)?;
        }

        Ok(())
    }

    /// Remove all values of `atom` in this frame.
    ///
    /// # Errors
    /// Returns an error if the space is read-only.
    pub fn clear_values(&self, atom: &Handle) -> Result<(), Error> {
        let atom = self.add_atom(atom)?;
        self.write().values_mut(&atom, Values::default()).clear();
        Ok(())
    }

    /// Count atoms per type.
    pub fn stats(&self) -> AtomSpaceStats {
        AtomSpaceStats::collect(self)
    }
}

impl Drop for AtomSpaceData {
    fn drop(&mut self) {
        // The strong count of this frame is already zero
        for parent in &self.parents {
            parent.lock_children().retain(|child| child.strong_count() > 0);
        }
    }
}

impl fmt::Debug for AtomSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AtomSpace")
            .field("name", &self.name())
            .field("depth", &self.depth())
            .field("read_only", &self.is_read_only())
            .finish()
    }
}

impl IntoIterator for &AtomSpace {
    type Item = Handle;
    type IntoIter = std::vec::IntoIter<Handle>;

    fn into_iter(self) -> Self::IntoIter {
        self.atoms().into_iter()
    }
}

#[cfg(test)]
mod test {
    use super::AtomSpace;
    use crate::{
        atom::{Atom, Handle},
        error::Error,
        types::Type,
        value::{TruthValue, Value},
    };

    use quickcheck_macros::quickcheck;
    use test_log::test;

    fn concept(space: &AtomSpace, name: &str) -> Handle {
        space.add_node(Type::ConceptNode, name).unwrap()
    }

    #[test]
    fn fresh_space_is_empty() {
        let space = AtomSpace::new();
        assert!(space.is_empty());
        assert_eq!(space.size(), 0);
        assert!(space.atoms().is_empty());
        assert_eq!(space.depth(), 0);
    }

    #[test]
    fn add_is_idempotent() {
        let space = AtomSpace::new();
        let first = concept(&space, "a");
        let second = concept(&space, "a");
        assert!(first.ptr_eq(&second));
        assert_eq!(space.size(), 1);
    }

    #[test]
    fn links_insert_outgoing() {
        let space = AtomSpace::new();
        let a = Atom::node(Type::ConceptNode, "a").unwrap();
        let b = Atom::node(Type::ConceptNode, "b").unwrap();
        let link = space
            .add_link(Type::InheritanceLink, vec![a.clone(), b.clone()])
            .unwrap();

        assert_eq!(space.size(), 3);
        assert_eq!(space.num_nodes(), 2);
        assert_eq!(space.num_links(), 1);
        assert!(space.contains(&a));
        assert_eq!(space.incoming_set(&a), vec![link.clone()]);
        assert_eq!(
            space.incoming_set_by_type(&b, Type::InheritanceLink),
            vec![link.clone()]
        );
        assert!(space.incoming_set_by_type(&b, Type::ListLink).is_empty());

        // The stored link refers to the stored outgoing atoms
        let stored_a = space.get_node(Type::ConceptNode, "a").unwrap();
        assert!(link.outgoing().unwrap()[0].ptr_eq(&stored_a));
        assert_eq!(space.get_link(Type::InheritanceLink, &[a, b]), Some(link));
    }

    #[test]
    fn extract_respects_incoming() {
        let space = AtomSpace::new();
        let a = concept(&space, "a");
        let b = concept(&space, "b");
        let list = space.add_link(Type::ListLink, vec![a.clone(), b]).unwrap();
        let outer = space.add_link(Type::SetLink, vec![list.clone()]).unwrap();

        assert!(!space.extract_atom(&a, false).unwrap());
        assert_eq!(space.size(), 4);

        assert!(space.extract_atom(&a, true).unwrap());
        assert!(!space.contains(&a));
        assert!(!space.contains(&list));
        assert!(!space.contains(&outer));
        assert_eq!(space.size(), 1);

        assert!(!space.extract_atom(&a, true).unwrap());
    }

    #[test]
    fn atoms_by_type() {
        let space = AtomSpace::new();
        concept(&space, "a");
        space.add_node(Type::PredicateNode, "p").unwrap();
        space.add_node(Type::VariableNode, "$x").unwrap();

        assert_eq!(space.atoms_by_type(Type::ConceptNode, false).len(), 1);
        assert_eq!(space.atoms_by_type(Type::Node, false).len(), 0);
        assert_eq!(space.atoms_by_type(Type::Node, true).len(), 3);
    }

    #[test]
    fn sorted_iteration() {
        let space = AtomSpace::new();
        let b = concept(&space, "b");
        let a = concept(&space, "a");
        let list = space.add_link(Type::ListLink, vec![b.clone()]).unwrap();

        assert_eq!(space.sorted_atoms(), vec![a, b, list]);
        assert_eq!((&space).into_iter().count(), 3);
    }

    #[test]
    fn grants_are_unique() {
        let space = AtomSpace::new();
        let alias = concept(&space, "A");
        let grant = space
            .add_link(Type::GrantLink, vec![alias.clone(), concept(&space, "B")])
            .unwrap();
        let again = space
            .add_link(Type::GrantLink, vec![alias.clone(), concept(&space, "foo")])
            .unwrap();

        assert!(grant.ptr_eq(&again));
        assert_eq!(
            again.outgoing().unwrap()[1].name().unwrap(),
            "B",
            "the first grant wins"
        );
        assert_eq!(space.get_grant(&alias), Some(grant));
        assert_eq!(space.atoms_by_type(Type::GrantLink, false).len(), 1);
    }

    #[test]
    fn values_and_truth_values() {
        let space = AtomSpace::new();
        let a = concept(&space, "a");
        let key = space.add_node(Type::PredicateNode, "key").unwrap();

        assert_eq!(space.truth_value(&a), TruthValue::default());
        assert_eq!(space.get_value(&a, &key), None);

        space.set_value(&a, &key, Value::Float(vec![1.0, 2.0])).unwrap();
        assert_eq!(space.get_value(&a, &key), Some(Value::Float(vec![1.0, 2.0])));

        space.set_truth_value(&a, TruthValue::simple(0.8, 0.9)).unwrap();
        assert_eq!(space.truth_value(&a), TruthValue::simple(0.8, 0.9));
        assert_eq!(space.keys(&a).len(), 2);

        let counted = space.increment_count(&a, &key, 3, 0.5).unwrap();
        assert_eq!(counted, Value::Float(vec![1.0, 2.0, 0.0, 0.5]));

        let tv = space.increment_count_tv(&a, 800.0).unwrap();
        assert_eq!(tv, TruthValue::count(0.8, 0.5, 800.0));

        let b = Atom::node(Type::ConceptNode, "b").unwrap();
        space.copy_values(&a, &b).unwrap();
        assert!(space.contains(&b));
        assert_eq!(space.truth_value(&b), tv);

        space.clear_values(&a).unwrap();
        assert!(space.keys(&a).is_empty());

        assert!(matches!(
            space.increment_count(&a, &key, usize::MAX, 1.0),
            Err(Error::IndexOutOfRange(usize::MAX))
        ));
        assert_eq!(space.get_value(&a, &key), None);
    }

    #[test]
    fn read_only_rejects_changes() {
        let space = AtomSpace::new();
        let a = concept(&space, "a");
        space.set_read_only(true);

        assert!(matches!(
            space.add_node(Type::ConceptNode, "b"),
            Err(Error::ReadOnly(_))
        ));
        assert!(space.extract_atom(&a, true).is_err());
        assert!(space.set_truth_value(&a, TruthValue::TRUE).is_err());
        assert!(space.clear().is_err());
        assert_eq!(space.size(), 1);

        space.set_read_only(false);
        assert!(space.add_node(Type::ConceptNode, "b").is_ok());
    }

    #[test]
    fn frames_see_parents() {
        let base = AtomSpace::new();
        let a = concept(&base, "a");
        base.set_truth_value(&a, TruthValue::simple(0.5, 0.5)).unwrap();

        let frame = AtomSpace::with_parent(&base);
        assert_eq!(frame.depth(), 1);
        assert!(frame.contains(&a));
        assert_eq!(frame.size(), 1);

        let b = concept(&frame, "b");
        assert!(frame.contains(&b));
        assert!(!base.contains(&b));
        assert_eq!(frame.size(), 2);

        // Copy on write
        frame.set_truth_value(&a, TruthValue::TRUE).unwrap();
        assert_eq!(frame.truth_value(&a), TruthValue::TRUE);
        assert_eq!(base.truth_value(&a), TruthValue::simple(0.5, 0.5));
        assert_eq!(frame.size(), 2);

        // Hiding
        assert!(frame.extract_atom(&a, false).unwrap());
        assert!(!frame.contains(&a));
        assert!(base.contains(&a));
        assert_eq!(frame.size(), 1);

        // Re-adding unhides
        concept(&frame, "a");
        assert!(frame.contains(&a));
    }

    #[test]
    fn frame_incoming_sets() {
        let base = AtomSpace::new();
        let a = concept(&base, "a");
        let base_link = base.add_link(Type::ListLink, vec![a.clone()]).unwrap();

        let frame = AtomSpace::with_parent(&base);
        let frame_link = frame.add_link(Type::SetLink, vec![a.clone()]).unwrap();

        assert_eq!(frame.incoming_set(&a).len(), 2);
        assert_eq!(base.incoming_set(&a), vec![base_link.clone()]);

        assert!(frame.extract_atom(&base_link, false).unwrap());
        assert_eq!(frame.incoming_set(&a), vec![frame_link]);
        assert_eq!(base.incoming_set(&a), vec![base_link]);
    }

    #[test]
    fn parent_extract_respects_child_frames() {
        let base = AtomSpace::new();
        let a = concept(&base, "a");
        let frame = AtomSpace::with_parent(&base);
        let link = frame.add_link(Type::ListLink, vec![a.clone()]).unwrap();
        let top = AtomSpace::with_parent(&frame);
        let outer = top.add_link(Type::SetLink, vec![link.clone()]).unwrap();

        assert!(!base.extract_atom(&a, false).unwrap());
        assert!(base.contains(&a));
        assert!(frame.contains(&link));

        // The frame link only depends on atoms of the frame
        assert!(!frame.extract_atom(&link, false).unwrap());

        assert!(base.extract_atom(&a, true).unwrap());
        assert!(!base.contains(&a));
        assert!(!frame.contains(&link));
        assert!(!top.contains(&outer));
        for space in [&base, &frame, &top] {
            for atom in space.atoms() {
                for child in atom.outgoing().unwrap_or_default() {
                    assert!(space.contains(child));
                }
            }
        }
    }

    #[test]
    fn parent_extract_keeps_copied_atoms() {
        let base = AtomSpace::new();
        let a = concept(&base, "a");
        let frame = AtomSpace::with_parent(&base);
        frame.set_truth_value(&a, TruthValue::TRUE).unwrap();
        let link = frame.add_link(Type::ListLink, vec![a.clone()]).unwrap();

        // The frame holds its own copy of the atom
        assert!(base.extract_atom(&a, false).unwrap());
        assert!(!base.contains(&a));
        assert!(frame.contains(&a));
        assert!(frame.contains(&link));
        assert_eq!(frame.truth_value(&a), TruthValue::TRUE);
    }

    #[test]
    fn dropped_frames_leave_no_entries() {
        let base = AtomSpace::new();
        let kept = AtomSpace::with_parent(&base);
        for _ in 0..1000 {
            let frame = AtomSpace::with_parent(&base);
            AtomSpace::with_parent(&frame);
        }

        assert_eq!(base.lock_children().len(), 1);
        assert!(kept.lock_children().is_empty());
    }

    #[test]
    fn dropped_frames_are_scrubbed() {
        let base = AtomSpace::new();
        let kept = AtomSpace::with_parent(&base);
        {
            let _dropped = AtomSpace::with_parent(&base);
            assert_eq!(base.children().len(), 2);
        }

        let children = base.children();
        assert_eq!(children.len(), 1);
        assert!(children[0].ptr_eq(&kept));
    }

    #[test]
    fn clear_only_affects_frame() {
        let base = AtomSpace::new();
        concept(&base, "a");
        let frame = AtomSpace::with_parent(&base);
        concept(&frame, "b");

        frame.clear().unwrap();
        assert_eq!(frame.size(), 1);
        assert_eq!(base.size(), 1);

        base.clear().unwrap();
        assert!(frame.is_empty());
    }

    #[test]
    fn shared_between_threads() {
        let space = AtomSpace::new();

        let handles: Vec<_> = (0..4)
            .map(|thread| {
                let space = space.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        space
                            .add_node(Type::ConceptNode, format!("{}", (thread * 50 + i) % 100))
                            .unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(space.size(), 100);
    }

    #[quickcheck]
    #[cfg_attr(miri, ignore)]
    fn size_counts_distinct_names(names: Vec<String>) -> bool {
        let space = AtomSpace::new();
        for name in &names {
            space.add_node(Type::ConceptNode, name.clone()).unwrap();
        }

        let distinct: std::collections::HashSet<_> = names.into_iter().collect();
        space.size() == distinct.len()
    }
}
