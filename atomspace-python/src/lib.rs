// FIXME: remove this once the pyo3 macros don't trigger this
#![allow(non_local_definitions)]

use std::path::PathBuf;

use atomspace::{
    default_atomspace, finalize_opencog, initialize_opencog,
    io::{load_file, load_str, write_sorted_file},
    set_default_atomspace,
    value::truth_key,
    AtomSpace, Handle, TruthValue, Type, Value,
};

use pyo3::{
    basic::CompareOp, create_exception, exceptions::PyException, prelude::*, types::PyTuple,
    IntoPyObjectExt,
};

create_exception!(module, AtomSpaceError, PyException);

trait PythonResult {
    type Value;

    fn py_res(self) -> PyResult<Self::Value>;
}

impl<T> PythonResult for Result<T, atomspace::Error> {
    type Value = T;

    fn py_res(self) -> PyResult<Self::Value> {
        self.map_err(|err| AtomSpaceError::new_err(format!("{err}")))
    }
}

fn truth_value(tv: Option<(f64, f64)>) -> Option<TruthValue> {
    tv.map(|(mean, confidence)| TruthValue::simple(mean, confidence))
}

#[pyclass(name = "AtomSpace")]
#[derive(Clone)]
struct PyAtomSpace(AtomSpace);

#[pyclass(name = "Atom")]
#[derive(Clone)]
struct PyAtom {
    handle: Handle,
    space: AtomSpace,
}

impl PyAtom {
    fn new(handle: Handle, space: &AtomSpace) -> Self {
        Self {
            handle,
            space: space.clone(),
        }
    }
}

fn wrap_all(handles: Vec<Handle>, space: &AtomSpace) -> Vec<PyAtom> {
    handles
        .into_iter()
        .map(|handle| PyAtom::new(handle, space))
        .collect()
}

/// Values accepted by `AtomSpace.set_value`
#[derive(FromPyObject)]
enum ValueInput {
    Float(f64),
    String(String),
    Floats(Vec<f64>),
    Strings(Vec<String>),
}

impl From<ValueInput> for Value {
    fn from(value: ValueInput) -> Self {
        match value {
            ValueInput::Float(float) => Value::Float(vec![float]),
            ValueInput::String(string) => Value::String(vec![string]),
            ValueInput::Floats(floats) => Value::Float(floats),
            ValueInput::Strings(strings) => Value::String(strings),
        }
    }
}

fn value_to_python(py: Python<'_>, value: Value, space: &AtomSpace) -> PyResult<PyObject> {
    match value {
        Value::Float(floats) => floats.into_py_any(py),
        Value::String(strings) => strings.into_py_any(py),
        Value::Link(values) => values
            .into_iter()
            .map(|value| value_to_python(py, value, space))
            .collect::<PyResult<Vec<_>>>()?
            .into_py_any(py),
        Value::Atom(handle) => PyAtom::new(handle, space).into_py_any(py),
        Value::Truth(tv) => (tv.mean(), tv.confidence()).into_py_any(py),
    }
}

fn add_with_tv(
    space: &AtomSpace,
    handle: Result<Handle, atomspace::Error>,
    tv: Option<(f64, f64)>,
) -> PyResult<PyAtom> {
    let handle = handle.py_res()?;
    if let Some(tv) = truth_value(tv) {
        space.set_truth_value(&handle, tv).py_res()?;
    }

    Ok(PyAtom::new(handle, space))
}

#[pymethods]
impl PyAtomSpace {
    #[new]
    #[pyo3(signature=(parent=None))]
    fn py_new(parent: Option<PyRef<'_, PyAtomSpace>>) -> Self {
        match parent {
            Some(parent) => PyAtomSpace(AtomSpace::with_parent(&parent.0)),
            None => PyAtomSpace(AtomSpace::new()),
        }
    }

    #[getter]
    fn name(&self) -> String {
        self.0.name().to_string()
    }

    #[pyo3(signature=(type_name, name, tv=None))]
    fn add_node(&self, type_name: &str, name: String, tv: Option<(f64, f64)>) -> PyResult<PyAtom> {
        let node_type = Type::from_name(type_name).py_res()?;
        add_with_tv(&self.0, self.0.add_node(node_type, name), tv)
    }

    #[pyo3(signature=(type_name, outgoing, tv=None))]
    fn add_link(
        &self,
        type_name: &str,
        outgoing: Vec<PyAtom>,
        tv: Option<(f64, f64)>,
    ) -> PyResult<PyAtom> {
        let link_type = Type::from_name(type_name).py_res()?;
        let outgoing = outgoing.into_iter().map(|atom| atom.handle).collect();
        add_with_tv(&self.0, self.0.add_link(link_type, outgoing), tv)
    }

    #[pyo3(signature=(atom, recursive=false))]
    fn remove(&self, atom: PyRef<'_, PyAtom>, recursive: bool) -> PyResult<bool> {
        self.0.extract_atom(&atom.handle, recursive).py_res()
    }

    fn clear(&self) -> PyResult<()> {
        self.0.clear().py_res()
    }

    #[pyo3(signature=(type_name, subclass=true))]
    fn get_atoms_by_type(&self, type_name: &str, subclass: bool) -> PyResult<Vec<PyAtom>> {
        let atom_type = Type::from_name(type_name).py_res()?;
        Ok(wrap_all(self.0.atoms_by_type(atom_type, subclass), &self.0))
    }

    fn set_value(
        &self,
        atom: PyRef<'_, PyAtom>,
        key: PyRef<'_, PyAtom>,
        value: ValueInput,
    ) -> PyResult<()> {
        self.0
            .set_value(&atom.handle, &key.handle, value.into())
            .py_res()
    }

    fn get_value(
        &self,
        py: Python<'_>,
        atom: PyRef<'_, PyAtom>,
        key: PyRef<'_, PyAtom>,
    ) -> PyResult<Option<PyObject>> {
        self.0
            .get_value(&atom.handle, &key.handle)
            .map(|value| value_to_python(py, value, &self.0))
            .transpose()
    }

    fn keys(&self, atom: PyRef<'_, PyAtom>) -> Vec<PyAtom> {
        wrap_all(self.0.keys(&atom.handle), &self.0)
    }

    fn load(&self, text: &str) -> PyResult<Vec<PyAtom>> {
        Ok(wrap_all(load_str(&self.0, text).py_res()?, &self.0))
    }

    fn load_file(&self, path: PathBuf) -> PyResult<Vec<PyAtom>> {
        Ok(wrap_all(load_file(&self.0, path).py_res()?, &self.0))
    }

    fn stats(&self) -> PyResult<String> {
        self.0
            .stats()
            .to_json()
            .map_err(|err| AtomSpaceError::new_err(format!("{err}")))
    }

    fn __len__(&self) -> usize {
        self.0.size()
    }

    fn __iter__(&self) -> AtomIterator {
        AtomIterator {
            atoms: self.0.atoms().into_iter(),
            space: self.0.clone(),
        }
    }

    fn __contains__(&self, atom: PyRef<'_, PyAtom>) -> bool {
        self.0.contains(&atom.handle)
    }

    fn __repr__(&self) -> String {
        format!("AtomSpace(name = {:?}, size = {})", self.0.name(), self.0.size())
    }
}

#[pyclass]
struct AtomIterator {
    atoms: std::vec::IntoIter<Handle>,
    space: AtomSpace,
}

#[pymethods]
impl AtomIterator {
    fn __iter__(slf: PyRef<'_, Self>) -> PyRef<'_, Self> {
        slf
    }

    fn __next__(mut slf: PyRefMut<'_, Self>) -> Option<PyAtom> {
        let next = slf.atoms.next()?;
        Some(PyAtom::new(next, &slf.space))
    }
}

#[pymethods]
impl PyAtom {
    #[getter]
    fn type_name(&self) -> &'static str {
        self.handle.atom_type().name()
    }

    #[getter]
    fn name(&self) -> PyResult<String> {
        self.handle.name().map(str::to_string).py_res()
    }

    #[getter]
    fn out(&self) -> PyResult<Vec<PyAtom>> {
        let outgoing = self.handle.outgoing().py_res()?;
        Ok(wrap_all(outgoing.to_vec(), &self.space))
    }

    #[getter]
    fn arity(&self) -> usize {
        self.handle.arity()
    }

    #[getter]
    fn tv(&self) -> (f64, f64) {
        let tv = self.space.truth_value(&self.handle);
        (tv.mean(), tv.confidence())
    }

    #[setter]
    fn set_tv(&mut self, tv: (f64, f64)) -> PyResult<()> {
        let (mean, confidence) = tv;
        self.space
            .set_truth_value(&self.handle, TruthValue::simple(mean, confidence))
            .py_res()
    }

    #[getter]
    fn incoming(&self) -> Vec<PyAtom> {
        wrap_all(self.space.incoming_set(&self.handle), &self.space)
    }

    fn is_node(&self) -> bool {
        self.handle.is_node()
    }

    fn is_link(&self) -> bool {
        self.handle.is_link()
    }

    fn short_string(&self) -> String {
        self.handle.to_short_string()
    }

    fn __str__(&self) -> String {
        self.handle.to_string()
    }

    fn __repr__(&self) -> String {
        self.handle.to_short_string()
    }

    fn __hash__(&self) -> u64 {
        self.handle.content_hash()
    }

    fn __richcmp__(&self, other: PyRef<'_, PyAtom>, op: CompareOp) -> bool {
        op.matches(self.handle.cmp(&other.handle))
    }
}

fn default_space() -> PyResult<AtomSpace> {
    default_atomspace().ok_or_else(|| {
        AtomSpaceError::new_err("no default atomspace, call set_default_atomspace first")
    })
}

/// Generates a Python constructor for each node type, adding to the
/// default atomspace.
macro_rules! node_constructors {
    ($($name:ident),* $(,)?) => {
        $(
            #[pyfunction]
            #[pyo3(signature=(name, tv=None))]
            #[allow(non_snake_case)]
            fn $name(name: String, tv: Option<(f64, f64)>) -> PyResult<PyAtom> {
                let space = default_space()?;
                add_with_tv(&space, space.add_node(Type::$name, name), tv)
            }
        )*

        fn add_node_constructors(m: &Bound<'_, PyModule>) -> PyResult<()> {
            $(m.add_function(wrap_pyfunction!($name, m)?)?;)*
            Ok(())
        }
    };
}

/// Generates a Python constructor for each link type, taking the
/// outgoing atoms as positional arguments.
macro_rules! link_constructors {
    ($($name:ident),* $(,)?) => {
        $(
            #[pyfunction]
            #[pyo3(signature=(*outgoing, tv=None))]
            #[allow(non_snake_case)]
            fn $name(outgoing: &Bound<'_, PyTuple>, tv: Option<(f64, f64)>) -> PyResult<PyAtom> {
                let space = default_space()?;
                let outgoing = outgoing
                    .extract::<Vec<PyAtom>>()?
                    .into_iter()
                    .map(|atom| atom.handle)
                    .collect();
                add_with_tv(&space, space.add_link(Type::$name, outgoing), tv)
            }
        )*

        fn add_link_constructors(m: &Bound<'_, PyModule>) -> PyResult<()> {
            $(m.add_function(wrap_pyfunction!($name, m)?)?;)*
            Ok(())
        }
    };
}

node_constructors!(
    ConceptNode,
    PredicateNode,
    SchemaNode,
    VariableNode,
    GlobNode,
    NumberNode,
    TypeNode,
    AnchorNode,
);

link_constructors!(
    ListLink,
    SetLink,
    MemberLink,
    InheritanceLink,
    SimilarityLink,
    EvaluationLink,
    ExecutionLink,
    ContextLink,
    AndLink,
    OrLink,
    NotLink,
    VariableList,
    VariableSet,
    TypedVariableLink,
    ScopeLink,
    LambdaLink,
    RuleLink,
    UniqueLink,
    GrantLink,
    DefineLink,
);

#[pyfunction(name = "set_default_atomspace")]
fn py_set_default_atomspace(space: PyRef<'_, PyAtomSpace>) -> Option<PyAtomSpace> {
    set_default_atomspace(&space.0).map(PyAtomSpace)
}

#[pyfunction(name = "get_default_atomspace")]
fn py_get_default_atomspace() -> Option<PyAtomSpace> {
    default_atomspace().map(PyAtomSpace)
}

#[pyfunction(name = "initialize_opencog")]
#[pyo3(signature=(space=None))]
fn py_initialize_opencog(space: Option<PyRef<'_, PyAtomSpace>>) -> PyAtomSpace {
    PyAtomSpace(initialize_opencog(space.as_ref().map(|space| &space.0)))
}

#[pyfunction(name = "finalize_opencog")]
fn py_finalize_opencog() {
    finalize_opencog()
}

#[pyfunction(name = "write_sorted_file")]
fn py_write_sorted_file(path: PathBuf, space: PyRef<'_, PyAtomSpace>) -> PyResult<usize> {
    write_sorted_file(path, &space.0).py_res()
}

/// Return the key under which truth values are stored.
#[pyfunction(name = "truth_key")]
fn py_truth_key() -> PyResult<PyAtom> {
    let space = default_space()?;
    Ok(PyAtom::new(truth_key(), &space))
}

/// Python bindings for the atomspace
#[pymodule]
fn opencog_atomspace(_py: Python, m: &Bound<PyModule>) -> PyResult<()> {
    m.add("AtomSpaceError", m.py().get_type::<AtomSpaceError>())?;
    m.add_class::<PyAtomSpace>()?;
    m.add_class::<PyAtom>()?;
    m.add_function(wrap_pyfunction!(py_set_default_atomspace, m)?)?;
    m.add_function(wrap_pyfunction!(py_get_default_atomspace, m)?)?;
    m.add_function(wrap_pyfunction!(py_initialize_opencog, m)?)?;
    m.add_function(wrap_pyfunction!(py_finalize_opencog, m)?)?;
    m.add_function(wrap_pyfunction!(py_write_sorted_file, m)?)?;
    m.add_function(wrap_pyfunction!(py_truth_key, m)?)?;
    add_node_constructors(m)?;
    add_link_constructors(m)?;
    Ok(())
}
