//! # phreeqc-python
//!
//! Python bindings for phreeqc-core, built with PyO3.
//!
//! Exposes the following to Python as the `pyphreeqc._bindings` module:
//!
//! - `Var(value=None)` -- a tagged engine scalar with a `value` property
//! - `VResult` -- engine result codes (`VR_OK`, `VR_OUTOFMEMORY`, ...)
//! - `VarKind` -- variant kinds (`TT_EMPTY`, `TT_LONG`, ...)
//! - `Phreeqc(database="phreeqc.dat", database_directory=None)` -- an engine
//!   with NumPy-style `phreeqc[row, col]` access to its selected output
//!
//! Without the `iphreeqc` feature only `Phreeqc.from_rows(...)` can build a
//! `Phreeqc`; the constructor raises `RuntimeError`.

use std::path::PathBuf;

use phreeqc_core::{
    Axis, AxisKey, DatabaseConfig, Engine, MemoryEngine, Phreeqc, PhreeqcError, Selection, Slice,
    TableIndex, VResult, Var, VarKind,
};
use pyo3::exceptions::{PyIndexError, PyRuntimeError, PyTypeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyFloat, PyInt, PyList, PySlice, PyString, PyTuple};

type BoxedEngine = Box<dyn Engine + Send + Sync>;

/// Map core errors onto the Python exception a caller would expect.
fn to_py_err(err: PhreeqcError) -> PyErr {
    match err {
        PhreeqcError::TypeMismatch(_) | PhreeqcError::IndexType { .. } => {
            PyTypeError::new_err(err.to_string())
        }
        PhreeqcError::ZeroStep => PyValueError::new_err(err.to_string()),
        PhreeqcError::TooManyIndices(_) => PyIndexError::new_err(err.to_string()),
        _ => PyRuntimeError::new_err(err.to_string()),
    }
}

// ============================================================================
// Enums
// ============================================================================

/// Engine result codes stored in an error-kind `Var`.
#[pyclass(name = "VResult", module = "pyphreeqc._bindings", eq, eq_int)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PyVResult {
    #[pyo3(name = "VR_OK")]
    Ok = 0,
    #[pyo3(name = "VR_OUTOFMEMORY")]
    OutOfMemory = -1,
    #[pyo3(name = "VR_BADVARTYPE")]
    BadVarType = -2,
    #[pyo3(name = "VR_INVALIDARG")]
    InvalidArg = -3,
    #[pyo3(name = "VR_INVALIDROW")]
    InvalidRow = -4,
    #[pyo3(name = "VR_INVALIDCOL")]
    InvalidCol = -5,
}

impl From<VResult> for PyVResult {
    fn from(code: VResult) -> Self {
        match code {
            VResult::Ok => PyVResult::Ok,
            VResult::OutOfMemory => PyVResult::OutOfMemory,
            VResult::BadVarType => PyVResult::BadVarType,
            VResult::InvalidArg => PyVResult::InvalidArg,
            VResult::InvalidRow => PyVResult::InvalidRow,
            VResult::InvalidCol => PyVResult::InvalidCol,
        }
    }
}

impl From<PyVResult> for VResult {
    fn from(code: PyVResult) -> Self {
        match code {
            PyVResult::Ok => VResult::Ok,
            PyVResult::OutOfMemory => VResult::OutOfMemory,
            PyVResult::BadVarType => VResult::BadVarType,
            PyVResult::InvalidArg => VResult::InvalidArg,
            PyVResult::InvalidRow => VResult::InvalidRow,
            PyVResult::InvalidCol => VResult::InvalidCol,
        }
    }
}

/// The kind tag of a `Var`.
#[pyclass(name = "VarKind", module = "pyphreeqc._bindings", eq, eq_int)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PyVarKind {
    #[pyo3(name = "TT_EMPTY")]
    Empty = 0,
    #[pyo3(name = "TT_ERROR")]
    Error = 1,
    #[pyo3(name = "TT_LONG")]
    Long = 2,
    #[pyo3(name = "TT_DOUBLE")]
    Double = 3,
    #[pyo3(name = "TT_STRING")]
    String = 4,
}

impl From<VarKind> for PyVarKind {
    fn from(kind: VarKind) -> Self {
        match kind {
            VarKind::Empty => PyVarKind::Empty,
            VarKind::Error => PyVarKind::Error,
            VarKind::Long => PyVarKind::Long,
            VarKind::Double => PyVarKind::Double,
            VarKind::String => PyVarKind::String,
        }
    }
}

// ============================================================================
// Value conversion
// ============================================================================

/// Pick a kind for a Python object: `VResult`, then `int` (so `bool` and
/// other ints never become floats), `float`, `str`, `None`.
fn var_from_py(value: &Bound<'_, PyAny>) -> PyResult<Var> {
    if let Ok(code) = value.extract::<PyVResult>() {
        return Ok(Var::Error(code.into()));
    }
    if value.is_instance_of::<PyInt>() {
        return Ok(Var::Long(value.extract()?));
    }
    if value.is_instance_of::<PyFloat>() {
        return Ok(Var::Double(value.extract()?));
    }
    if value.is_instance_of::<PyString>() {
        return Ok(Var::String(value.extract()?));
    }
    if value.is_none() {
        return Ok(Var::Empty);
    }
    let type_name = value.get_type().name()?.to_string();
    Err(to_py_err(PhreeqcError::TypeMismatch(type_name)))
}

fn var_to_py(py: Python<'_>, var: &Var) -> PyResult<PyObject> {
    let obj = match var {
        Var::Empty => py.None(),
        Var::Error(code) => Py::new(py, PyVResult::from(*code))?.into_any(),
        Var::Long(l) => (*l).into_pyobject(py)?.into_any().unbind(),
        Var::Double(d) => (*d).into_pyobject(py)?.into_any().unbind(),
        Var::String(s) => s.as_str().into_pyobject(py)?.into_any().unbind(),
    };
    Ok(obj)
}

fn list_to_py(py: Python<'_>, vars: &[Var]) -> PyResult<PyObject> {
    let items = vars
        .iter()
        .map(|var| var_to_py(py, var))
        .collect::<PyResult<Vec<_>>>()?;
    Ok(PyList::new(py, items)?.into_any().unbind())
}

fn selection_to_py(py: Python<'_>, selection: &Selection) -> PyResult<PyObject> {
    match selection {
        Selection::Scalar(var) => var_to_py(py, var),
        Selection::List(vars) => list_to_py(py, vars),
        Selection::Table(rows) => {
            let items = rows
                .iter()
                .map(|row| list_to_py(py, row))
                .collect::<PyResult<Vec<_>>>()?;
            Ok(PyList::new(py, items)?.into_any().unbind())
        }
    }
}

// ============================================================================
// Index conversion
// ============================================================================

/// A slice field as an `i64`. Ints past either end saturate, which selects
/// the same positions once the slice is clamped to the axis.
fn slice_bound(slice: &Bound<'_, PySlice>, name: &str) -> PyResult<Option<i64>> {
    let bound = slice.getattr(name)?;
    if bound.is_none() {
        return Ok(None);
    }
    match bound.extract::<i64>() {
        Ok(value) => Ok(Some(value)),
        Err(_) if bound.is_instance_of::<PyInt>() && bound.lt(0)? => Ok(Some(-i64::MAX)),
        Err(_) if bound.is_instance_of::<PyInt>() => Ok(Some(i64::MAX)),
        Err(err) => Err(err),
    }
}

fn axis_key(key: &Bound<'_, PyAny>, axis: Axis) -> PyResult<AxisKey> {
    if let Ok(slice) = key.downcast::<PySlice>() {
        return Ok(AxisKey::Slice(Slice::new(
            slice_bound(slice, "start")?,
            slice_bound(slice, "stop")?,
            slice_bound(slice, "step")?,
        )));
    }
    if key.is_instance_of::<PyInt>() {
        return Ok(AxisKey::Index(key.extract()?));
    }
    Err(to_py_err(PhreeqcError::IndexType { axis }))
}

/// Accept `row`, `(row,)` or `(row, col)`; every key is checked before the
/// engine is touched.
fn table_index(key: &Bound<'_, PyAny>) -> PyResult<TableIndex> {
    let keys: Vec<Bound<'_, PyAny>> = match key.downcast::<PyTuple>() {
        Ok(tuple) => tuple.iter().collect(),
        Err(_) => vec![key.clone()],
    };
    if keys.len() > 2 {
        return Err(to_py_err(PhreeqcError::TooManyIndices(keys.len())));
    }
    let axis_keys = keys
        .iter()
        .zip([Axis::Row, Axis::Column])
        .map(|(key, axis)| axis_key(key, axis))
        .collect::<PyResult<Vec<_>>>()?;
    TableIndex::from_keys(axis_keys).map_err(to_py_err)
}

// ============================================================================
// Classes
// ============================================================================

/// A single engine scalar: empty, error code, int, float or str.
///
/// Args:
///     value: Optional initial value; see the `value` property.
///
/// Raises:
///     TypeError: If `value` is not a VResult, int, float, str or None.
#[pyclass(name = "Var", module = "pyphreeqc._bindings")]
#[derive(Debug, Default)]
struct PyVar {
    var: Var,
}

#[pymethods]
impl PyVar {
    #[new]
    #[pyo3(signature = (value=None))]
    fn new(value: Option<&Bound<'_, PyAny>>) -> PyResult<Self> {
        let mut var = Var::new();
        if let Some(value) = value {
            var.assign(var_from_py(value)?);
        }
        Ok(PyVar { var })
    }

    /// The held value: None, a VResult, an int, a float or a str.
    #[getter]
    fn value(&self, py: Python<'_>) -> PyResult<PyObject> {
        var_to_py(py, &self.var)
    }

    /// Replace the held value. A previously held string is released.
    ///
    /// Raises:
    ///     TypeError: If `value` has no matching kind.
    #[setter]
    fn set_value(&mut self, value: &Bound<'_, PyAny>) -> PyResult<()> {
        self.var.assign(var_from_py(value)?);
        Ok(())
    }

    #[getter]
    fn kind(&self) -> PyVarKind {
        self.var.kind().into()
    }

    fn __repr__(&self) -> String {
        match &self.var {
            Var::Empty => "Var(None)".to_string(),
            Var::Error(code) => format!("Var(VResult.{})", code),
            Var::Long(l) => format!("Var({})", l),
            Var::Double(d) => format!("Var({:?})", d),
            Var::String(s) => format!("Var({:?})", s),
        }
    }
}

/// A PHREEQC engine with indexed access to its selected output.
///
/// Args:
///     database: Database file name. Default: "phreeqc.dat".
///     database_directory: Directory holding the database. Default: the
///         PHREEQC_DATABASE_DIR environment variable, else "./database".
///
/// Raises:
///     RuntimeError: If the database fails to load, or the module was built
///         without IPhreeqc support.
#[pyclass(name = "Phreeqc", module = "pyphreeqc._bindings")]
struct PyPhreeqc {
    inner: Phreeqc<BoxedEngine>,
}

#[cfg(feature = "iphreeqc")]
fn native_engine() -> PyResult<BoxedEngine> {
    let engine = phreeqc_core::IPhreeqc::new().map_err(to_py_err)?;
    Ok(Box::new(engine))
}

#[cfg(not(feature = "iphreeqc"))]
fn native_engine() -> PyResult<BoxedEngine> {
    Err(PyRuntimeError::new_err(
        "pyphreeqc was built without IPhreeqc support; rebuild with the `iphreeqc` feature or use Phreeqc.from_rows",
    ))
}

#[pymethods]
impl PyPhreeqc {
    #[new]
    #[pyo3(signature = (database="phreeqc.dat", database_directory=None))]
    fn new(database: &str, database_directory: Option<PathBuf>) -> PyResult<Self> {
        let mut config = DatabaseConfig::new(database);
        if let Some(directory) = database_directory {
            config = config.with_directory(directory);
        }
        tracing::debug!(path = %config.path().display(), "opening engine");
        let inner = Phreeqc::with_database(native_engine()?, &config).map_err(to_py_err)?;
        Ok(PyPhreeqc { inner })
    }

    /// Build a Phreeqc over an in-memory selected output.
    ///
    /// Args:
    ///     rows: A list of rows, each a list of None/int/float/str/VResult.
    ///     components: Optional component names.
    ///
    /// Raises:
    ///     TypeError: If a cell has no matching kind.
    #[staticmethod]
    #[pyo3(signature = (rows, components=None))]
    fn from_rows<'py>(
        rows: Vec<Vec<Bound<'py, PyAny>>>,
        components: Option<Vec<String>>,
    ) -> PyResult<Self> {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(var_from_py).collect::<PyResult<Vec<_>>>())
            .collect::<PyResult<Vec<_>>>()?;
        let engine = MemoryEngine::from_rows(rows).with_components(components.unwrap_or_default());
        Ok(PyPhreeqc {
            inner: Phreeqc::new(Box::new(engine)),
        })
    }

    fn load_database(&mut self, path: PathBuf) -> PyResult<()> {
        self.inner.load_database(path).map_err(to_py_err)
    }

    fn run_string(&mut self, input: &str) -> PyResult<()> {
        self.inner.run_string(input).map_err(to_py_err)
    }

    fn get_error_string(&self) -> String {
        self.inner.error_string()
    }

    fn get_selected_output_row_count(&self) -> PyResult<usize> {
        self.inner.selected_output_row_count().map_err(to_py_err)
    }

    fn get_selected_output_column_count(&self) -> PyResult<usize> {
        self.inner.selected_output_column_count().map_err(to_py_err)
    }

    fn get_component_count(&self) -> PyResult<usize> {
        self.inner.component_count().map_err(to_py_err)
    }

    fn get_component(&self, n: usize) -> PyResult<String> {
        self.inner.component(n).map_err(to_py_err)
    }

    /// Write cell (row, col) into `var` in place.
    fn get_value(&self, row: i64, col: i64, mut var: PyRefMut<'_, PyVar>) -> PyResult<()> {
        self.inner
            .engine()
            .get_value(row, col, &mut var.var)
            .map_err(to_py_err)
    }

    /// `(rows, columns)` of the selected output, queried on every access.
    #[getter]
    fn shape(&self) -> PyResult<(usize, usize)> {
        self.inner.shape().map_err(to_py_err)
    }

    fn __len__(&self) -> PyResult<usize> {
        self.get_selected_output_row_count()
    }

    /// Index the selected output with `phreeqc[row]` or `phreeqc[row, col]`.
    ///
    /// Each key is an int or a slice. Two ints give a scalar, one int and
    /// one slice give a list, two slices give a list of rows.
    ///
    /// Raises:
    ///     TypeError: If a key is neither int nor slice.
    ///     IndexError: If more than two keys are given.
    ///     ValueError: If a slice step is zero.
    fn __getitem__(&self, py: Python<'_>, key: &Bound<'_, PyAny>) -> PyResult<PyObject> {
        let index = table_index(key)?;
        let selection = self.inner.get(index).map_err(to_py_err)?;
        selection_to_py(py, &selection)
    }
}

/// The native extension module, exposed as `pyphreeqc._bindings`.
#[pymodule]
fn _bindings(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyVar>()?;
    m.add_class::<PyVResult>()?;
    m.add_class::<PyVarKind>()?;
    m.add_class::<PyPhreeqc>()?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}
