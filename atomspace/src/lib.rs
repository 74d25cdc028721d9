//! An in-memory hypergraph store of typed nodes and links
//!
//! Atoms are kept in an [AtomSpace], which may be layered on top of other
//! atomspaces as frames. Atoms carry [values][value::Value], most
//! prominently a [TruthValue]. Contents can be loaded from and dumped to
//! Atomese text with the functions in [io].

#![deny(
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts
)]
#![warn(
    missing_docs,
    unused_import_braces,
    unused_qualifications,
    unused_extern_crates,
    variant_size_differences
)]

pub mod atom;
pub mod atomspace;
pub mod error;
pub mod io;
pub mod registry;
pub mod types;
pub mod value;

pub use atom::{Atom, Handle};
pub use atomspace::{AtomSpace, AtomSpaceStats};
pub use error::Error;
pub use io::{load_file, load_str, write_sorted, write_sorted_file};
pub use registry::{default_atomspace, finalize_opencog, initialize_opencog, set_default_atomspace};
pub use types::Type;
pub use value::{TruthValue, Value};
