//! Python Bindings
//!
//! Exposes the engine to Python as the `_core` extension module. Reactive
//! handles are `!Send`, so every class here is `unsendable` and must stay
//! on the thread that created it, which also owns its runtime.
//!
//! An exception raised by a Python callback inside an effect or derived
//! computation is turned into a Rust panic. It then follows the engine's
//! usual rules: it unwinds out of `effect(...)` on the first run, and fails
//! the microtask's turn (reported by `flush()`) on later runs.

use pyo3::exceptions::PyTypeError;
use pyo3::prelude::*;

use crate::reactive::{self, ReadSignal, Signal};

/// A Python object stored in a signal.
struct PyValue(PyObject);

impl Clone for PyValue {
    fn clone(&self) -> Self {
        Python::with_gil(|py| Self(self.0.clone_ref(py)))
    }
}

fn call_or_panic(callable: &PyObject) -> PyObject {
    Python::with_gil(|py| match callable.call0(py) {
        Ok(value) => value,
        Err(err) => panic!("python callback raised: {err}"),
    })
}

fn repr(py: Python<'_>, value: &PyObject) -> String {
    value
        .bind(py)
        .repr()
        .map(|r| r.to_string())
        .unwrap_or_else(|_| "?".to_string())
}

/// Python-exposed Signal type.
#[pyclass(name = "Signal", unsendable)]
pub struct PySignal {
    inner: Signal<PyValue>,
}

#[pymethods]
impl PySignal {
    #[new]
    fn new(value: PyObject) -> Self {
        Self {
            inner: Signal::new(PyValue(value)),
        }
    }

    /// Untracked read.
    #[getter]
    fn value(&self) -> PyObject {
        self.inner.get_untracked().0
    }

    /// Silent write: no subscriber is notified.
    #[setter]
    fn set_value(&self, value: PyObject) {
        self.inner.set_untracked(PyValue(value));
    }

    #[getter]
    fn id(&self) -> u64 {
        self.inner.id()
    }

    fn get(&self) -> PyObject {
        self.inner.get().0
    }

    fn set(&self, value: PyObject) {
        self.inner.set(PyValue(value));
    }

    fn update(&self, py: Python<'_>, f: PyObject) -> PyResult<()> {
        let current = self.inner.get_untracked();
        let next = f.call1(py, (current.0,))?;
        self.inner.set(PyValue(next));
        Ok(())
    }

    fn subscribe(&self, callback: PyObject) {
        self.inner.subscribe(move || {
            call_or_panic(&callback);
        });
    }

    fn subscriber_count(&self) -> usize {
        self.inner.subscriber_count()
    }

    fn __repr__(&self, py: Python<'_>) -> String {
        format!(
            "Signal(id={}, value={}, subscribers={})",
            self.inner.id(),
            repr(py, &self.inner.get_untracked().0),
            self.inner.subscriber_count()
        )
    }
}

/// Python-exposed read-only signal, as returned by `derived`.
#[pyclass(name = "ReadSignal", unsendable)]
pub struct PyReadSignal {
    inner: ReadSignal<PyValue>,
}

#[pymethods]
impl PyReadSignal {
    #[getter]
    fn value(&self) -> PyObject {
        self.inner.get_untracked().0
    }

    fn get(&self) -> PyObject {
        self.inner.get().0
    }

    fn subscribe(&self, callback: PyObject) {
        self.inner.subscribe(move || {
            call_or_panic(&callback);
        });
    }

    fn __repr__(&self, py: Python<'_>) -> String {
        format!(
            "ReadSignal(id={}, value={})",
            self.inner.id(),
            repr(py, &self.inner.get_untracked().0)
        )
    }
}

#[pyfunction]
fn signal(value: PyObject) -> PySignal {
    PySignal::new(value)
}

/// Tracked read of a `Signal` or `ReadSignal`.
#[pyfunction]
fn get(readable: &Bound<'_, PyAny>) -> PyResult<PyObject> {
    if let Ok(signal) = readable.downcast::<PySignal>() {
        return Ok(signal.borrow().get());
    }
    if let Ok(signal) = readable.downcast::<PyReadSignal>() {
        return Ok(signal.borrow().get());
    }
    Err(PyTypeError::new_err("get() expects a Signal or ReadSignal"))
}

#[pyfunction]
fn effect(callable: PyObject) {
    reactive::effect(move || {
        call_or_panic(&callable);
    });
}

#[pyfunction]
fn derived(callable: PyObject) -> PyReadSignal {
    PyReadSignal {
        inner: reactive::derived(move || PyValue(call_or_panic(&callable))),
    }
}

/// Drain the microtask queue; returns the number of tasks run.
#[pyfunction]
fn flush() -> PyResult<usize> {
    Ok(reactive::flush()?.ran)
}

pub(crate) fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySignal>()?;
    m.add_class::<PyReadSignal>()?;
    m.add_function(wrap_pyfunction!(signal, m)?)?;
    m.add_function(wrap_pyfunction!(get, m)?)?;
    m.add_function(wrap_pyfunction!(effect, m)?)?;
    m.add_function(wrap_pyfunction!(derived, m)?)?;
    m.add_function(wrap_pyfunction!(flush, m)?)?;
    Ok(())
}
