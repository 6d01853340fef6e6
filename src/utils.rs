//! utils — Python argument conversion for the PyO3 bindings.
//!
//! Converts array-likes (numpy arrays, pandas Series, sequences) into the
//! `ndarray` columns of [`PanelData`](crate::panel::PanelData) and builds
//! the validated option structs from keyword arguments. Compiled only with
//! the `python-bindings` feature.
#[cfg(feature = "python-bindings")]
use ndarray::{Array1, Array2};

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyTypeError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Vec → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1, PyReadonlyArray2,
};

#[cfg(feature = "python-bindings")]
use crate::{
    panel::{PanelData, PanelOptions},
    statistical_tests::TestMode,
};

/// Contiguous 1-D float64 view of an array-like, copying only when needed.
#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArray1<f64>>() {
            if series_ro.as_slice().is_ok() {
                return Ok(series_ro);
            }
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        PyTypeError::new_err("expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64")
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// Owned 1-D float64 column.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_column<'py>(py: Python<'py>, raw: &Bound<'py, PyAny>) -> PyResult<Array1<f64>> {
    let arr = extract_f64_array(py, raw)?;
    Ok(arr.as_array().to_owned())
}

/// Owned 1-D int64 column (individual or cluster ids).
#[cfg(feature = "python-bindings")]
pub fn extract_i64_column<'py>(raw: &Bound<'py, PyAny>) -> PyResult<Array1<i64>> {
    if let Ok(arr) = raw.extract::<PyReadonlyArray1<i64>>() {
        return Ok(arr.as_array().to_owned());
    }
    if let Ok(obj) = raw.call_method("to_numpy", (false,), None) {
        if let Ok(series) = obj.extract::<PyReadonlyArray1<i64>>() {
            return Ok(series.as_array().to_owned());
        }
    }
    let vec: Vec<i64> = raw
        .extract()
        .map_err(|_| PyTypeError::new_err("expected a 1-D array-like of int64 identifiers"))?;
    Ok(Array1::from(vec))
}

/// Owned N×k float64 covariate matrix; a 1-D input is one covariate.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_matrix<'py>(py: Python<'py>, raw: &Bound<'py, PyAny>) -> PyResult<Array2<f64>> {
    if let Ok(arr) = raw.extract::<PyReadonlyArray2<f64>>() {
        return Ok(arr.as_array().to_owned());
    }
    if let Ok(obj) = raw.call_method("to_numpy", (false,), None) {
        if let Ok(frame) = obj.extract::<PyReadonlyArray2<f64>>() {
            return Ok(frame.as_array().to_owned());
        }
    }
    let column = extract_f64_column(py, raw)?;
    let n = column.len();
    column
        .into_shape_with_order((n, 1))
        .map_err(|e| PyTypeError::new_err(format!("covariates must be 1-D or 2-D float64: {e}")))
}

/// Assemble [`PanelData`] from Python columns.
#[cfg(feature = "python-bindings")]
pub fn build_panel_data<'py>(
    py: Python<'py>, y: &Bound<'py, PyAny>, id: &Bound<'py, PyAny>, group: &Bound<'py, PyAny>,
    period: &Bound<'py, PyAny>, x: Option<&Bound<'py, PyAny>>, cluster: Option<&Bound<'py, PyAny>>,
) -> PyResult<PanelData> {
    let mut data = PanelData::new(
        extract_f64_column(py, y)?,
        extract_i64_column(id)?,
        extract_f64_column(py, group)?,
        extract_f64_column(py, period)?,
    )?;
    if let Some(x) = x {
        data = data.with_covariates(extract_f64_matrix(py, x)?)?;
    }
    if let Some(cluster) = cluster {
        data = data.with_cluster(extract_i64_column(cluster)?)?;
    }
    Ok(data)
}

/// Validated [`PanelOptions`] from keyword arguments.
#[cfg(feature = "python-bindings")]
pub fn build_panel_options(pretreatment_periods: Option<Vec<f64>>, base_period: Option<f64>) -> PyResult<PanelOptions> {
    Ok(PanelOptions::new(pretreatment_periods, base_period)?)
}

/// `Some(threshold)` selects threshold mode, `None` search mode.
#[cfg(feature = "python-bindings")]
pub fn test_mode(threshold: Option<f64>) -> TestMode {
    threshold.map_or(TestMode::Search, TestMode::Threshold)
}
