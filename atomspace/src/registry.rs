//! Process-wide default [AtomSpace]
//!
//! Operations that are not given an atomspace explicitly, like the type
//! constructors of the Python bindings, resolve against the default.

use std::sync::{Mutex, MutexGuard, PoisonError};

use once_cell::sync::Lazy;

use crate::atomspace::AtomSpace;

/// Global default atomspace, if one is registered
static DEFAULT_ATOMSPACE: Lazy<Mutex<Option<AtomSpace>>> = Lazy::new(|| Mutex::new(None));

fn instance() -> MutexGuard<'static, Option<AtomSpace>> {
    DEFAULT_ATOMSPACE
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

/// Register `atomspace` as the process default.
///
/// Returns the previously registered atomspace, if any.
pub fn set_default_atomspace(atomspace: &AtomSpace) -> Option<AtomSpace> {
    log::debug!("default atomspace is now \"{}\"", atomspace.name());
    instance().replace(atomspace.clone())
}

/// Return the process default atomspace, if one is registered.
pub fn default_atomspace() -> Option<AtomSpace> {
    instance().clone()
}

/// Register `atomspace`, or a fresh atomspace if none is given, as the
/// process default and return it.
pub fn initialize_opencog(atomspace: Option<&AtomSpace>) -> AtomSpace {
    let atomspace = atomspace.cloned().unwrap_or_default();
    set_default_atomspace(&atomspace);
    atomspace
}

/// Drop the default atomspace registration.
///
/// Safe to call any number of times.
pub fn finalize_opencog() {
    match instance().take() {
        Some(atomspace) => log::debug!("finalized default atomspace \"{}\"", atomspace.name()),
        None => log::debug!("finalize called without a default atomspace"),
    }
}

#[cfg(test)]
mod test {
    use std::sync::Mutex;

    use super::{default_atomspace, finalize_opencog, initialize_opencog, set_default_atomspace};
    use crate::{atomspace::AtomSpace, types::Type};

    use quickcheck_macros::quickcheck;
    use test_log::test;

    /// Tests share the global registry
    static SERIAL: Mutex<()> = Mutex::new(());

    #[test]
    fn initialize_finalize() {
        let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());

        let atomspace = AtomSpace::new();
        set_default_atomspace(&atomspace);
        finalize_opencog();

        assert!(default_atomspace().is_none());
        assert!(atomspace.is_empty());
    }

    #[test]
    fn finalize_is_idempotent() {
        let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());

        finalize_opencog();
        finalize_opencog();
        assert!(default_atomspace().is_none());
    }

    #[test]
    fn set_returns_previous() {
        let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());

        let first = AtomSpace::new();
        let second = AtomSpace::new();

        set_default_atomspace(&first);
        let previous = set_default_atomspace(&second).unwrap();
        assert!(previous.ptr_eq(&first));
        assert!(default_atomspace().unwrap().ptr_eq(&second));

        finalize_opencog();
    }

    #[test]
    fn initialize_creates_space() {
        let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());

        let created = initialize_opencog(None);
        assert!(default_atomspace().unwrap().ptr_eq(&created));

        let given = AtomSpace::new();
        let registered = initialize_opencog(Some(&given));
        assert!(registered.ptr_eq(&given));

        finalize_opencog();
    }

    #[quickcheck]
    #[cfg_attr(miri, ignore)]
    fn registration_leaves_contents_alone(names: Vec<String>) -> bool {
        let _guard = SERIAL.lock().unwrap_or_else(|e| e.into_inner());

        let atomspace = AtomSpace::new();
        for name in &names {
            atomspace
                .add_node(Type::ConceptNode, name.clone())
                .unwrap();
        }
        let before = atomspace.sorted_atoms();

        set_default_atomspace(&atomspace);
        finalize_opencog();

        default_atomspace().is_none() && atomspace.sorted_atoms() == before
    }
}
