//! equitrends — equivalence tests for pre-trends in difference-in-differences
//! panels, with optional Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the tests to Python via the `_equitrends` extension module. The
//! crate estimates placebo coefficients for pre-treatment periods in a
//! two-way fixed-effects regression and tests whether their maximum, mean,
//! or root mean square is smaller than an equivalence threshold.
//!
//! Key behaviors
//! -------------
//! - Re-export the core modules as the public crate surface:
//!   - `folded_normal`: CDF, quantile and minimum-threshold inversions;
//!   - `panel`: input columns, validation, structure, simulation;
//!   - `estimation`: double demeaning, placebo OLS, constrained fit;
//!   - `inference`: OLS / HC / cluster covariance estimators;
//!   - `statistical_tests`: max, mean and RMS tests;
//!   - `optimization`: the bracketed root finder the inversions rely on.
//! - Under `python-bindings`, define `#[pyclass]` wrappers for the three
//!   tests, `#[pyfunction]`s for the folded normal, and the `_equitrends`
//!   module initializer.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner modules; this file performs
//!   only FFI glue and error mapping.
//! - Every error type converts to `PyValueError` at the PyO3 boundary.
//!
//! Conventions
//! -----------
//! - Python-exposed classes live under `_equitrends.<submodule>` and are
//!   wrapped by a thin pure-Python facade.
//! - In the Python wrappers a missing threshold selects search mode.
//!
//! Downstream usage
//! ----------------
//! ```rust
//! use equitrends::panel::{PanelOptions, SimulationOptions, simulate_panel};
//! use equitrends::statistical_tests::prelude::*;
//!
//! let data = simulate_panel(&SimulationOptions { n: 60, ..Default::default() }).unwrap();
//! let opts = MaxTestOptions::new(MaxMethod::Iu, 0.05, TestMode::Search).unwrap();
//! let out = max_test(&data, &PanelOptions::default(), &opts).unwrap();
//! assert!(out.decision.min_threshold().unwrap() >= 0.0);
//! ```
//!
//! Testing notes
//! -------------
//! - Numerical behavior is covered by unit tests in the inner modules and
//!   by `tests/integration_equivalence_pipeline.rs`.

pub mod errors;
pub mod estimation;
pub mod folded_normal;
pub mod inference;
pub mod optimization;
pub mod panel;
pub mod statistical_tests;
pub mod utils;

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    inference::VceKind,
    statistical_tests::{
        CoefficientSummary, MaxMethod, MaxTestOptions, MaxTestOutcome, MeanTestOptions, MeanTestOutcome,
        RmsTestOptions, RmsTestOutcome, max_test, mean_test, rms_test,
    },
    utils::{build_panel_data, build_panel_options, extract_f64_array, test_mode},
};

#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArray1};

/// Column accessors shared by the Python test wrappers.
#[cfg(feature = "python-bindings")]
fn coefficient_columns(coefs: &[CoefficientSummary]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    (
        coefs.iter().map(|c| c.period).collect(),
        coefs.iter().map(|c| c.estimate).collect(),
        coefs.iter().map(|c| c.se).collect(),
    )
}

/// MaxEquivTest — Python-facing wrapper for the max equivalence test.
///
/// Constructed from Python via
/// `MaxEquivTest(y, id, group, period, x=None, cluster=None,
/// pretreatment_periods=None, base_period=None, method="iu", vce="cr1",
/// alpha=0.05, delta=None, replications=1000, seed=None)`.
/// `delta=None` runs the minimum-threshold search.
///
/// Native Rust code should call
/// [`max_test`](crate::statistical_tests::max_test) directly.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "equitrends.statistical_tests")]
pub struct MaxEquivTest {
    inner: MaxTestOutcome,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl MaxEquivTest {
    #[new]
    #[pyo3(
        signature = (
            y, id, group, period, x = None, cluster = None, pretreatment_periods = None,
            base_period = None, method = "iu", vce = "cr1", alpha = 0.05, delta = None,
            replications = 1000, seed = None,
        ),
        text_signature = "(y, id, group, period, /, x=None, cluster=None, pretreatment_periods=None, \
                          base_period=None, method='iu', vce='cr1', alpha=0.05, delta=None, \
                          replications=1000, seed=None)"
    )]
    pub fn new<'py>(
        py: Python<'py>, y: &Bound<'py, PyAny>, id: &Bound<'py, PyAny>, group: &Bound<'py, PyAny>,
        period: &Bound<'py, PyAny>, x: Option<&Bound<'py, PyAny>>, cluster: Option<&Bound<'py, PyAny>>,
        pretreatment_periods: Option<Vec<f64>>, base_period: Option<f64>, method: &str, vce: &str,
        alpha: f64, delta: Option<f64>, replications: usize, seed: Option<u64>,
    ) -> PyResult<Self> {
        let data = build_panel_data(py, y, id, group, period, x, cluster)?;
        let window = build_panel_options(pretreatment_periods, base_period)?;
        let opts = MaxTestOptions {
            method: method.parse::<MaxMethod>()?,
            vce: vce.parse::<VceKind>()?,
            alpha,
            mode: test_mode(delta),
            replications,
            seed,
            ..MaxTestOptions::default()
        };
        let inner = py.allow_threads(|| max_test(&data, &window, &opts))?;
        Ok(MaxEquivTest { inner })
    }

    #[getter]
    pub fn method(&self) -> &'static str {
        self.inner.method.as_str()
    }

    #[getter]
    pub fn max_abs_coef(&self) -> f64 {
        self.inner.max_abs_coef
    }

    #[getter]
    pub fn reject(&self) -> Option<bool> {
        self.inner.decision.reject()
    }

    #[getter]
    pub fn min_threshold(&self) -> Option<f64> {
        self.inner.decision.min_threshold()
    }

    /// Per-coefficient IU critical values (threshold mode).
    #[getter]
    pub fn critical_values(&self) -> Vec<Option<f64>> {
        self.inner.coefficients.iter().map(|c| c.critical_value).collect()
    }

    /// `(periods, estimates, standard_errors)`.
    #[getter]
    pub fn coefficients(&self) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        coefficient_columns(&self.inner.coefficients)
    }

    #[getter]
    pub fn seed(&self) -> Option<u64> {
        self.inner.bootstrap.map(|d| d.seed)
    }

    #[getter]
    pub fn note(&self) -> Option<&'static str> {
        self.inner.note
    }
}

/// MeanEquivTest — Python-facing wrapper for the mean equivalence test.
///
/// `tau=None` runs the minimum-threshold search.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "equitrends.statistical_tests")]
pub struct MeanEquivTest {
    inner: MeanTestOutcome,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl MeanEquivTest {
    #[new]
    #[pyo3(
        signature = (
            y, id, group, period, x = None, cluster = None, pretreatment_periods = None,
            base_period = None, vce = "cr1", alpha = 0.05, tau = None,
        ),
        text_signature = "(y, id, group, period, /, x=None, cluster=None, pretreatment_periods=None, \
                          base_period=None, vce='cr1', alpha=0.05, tau=None)"
    )]
    pub fn new<'py>(
        py: Python<'py>, y: &Bound<'py, PyAny>, id: &Bound<'py, PyAny>, group: &Bound<'py, PyAny>,
        period: &Bound<'py, PyAny>, x: Option<&Bound<'py, PyAny>>, cluster: Option<&Bound<'py, PyAny>>,
        pretreatment_periods: Option<Vec<f64>>, base_period: Option<f64>, vce: &str, alpha: f64,
        tau: Option<f64>,
    ) -> PyResult<Self> {
        let data = build_panel_data(py, y, id, group, period, x, cluster)?;
        let window = build_panel_options(pretreatment_periods, base_period)?;
        let opts = MeanTestOptions { vce: vce.parse::<VceKind>()?, alpha, mode: test_mode(tau) };
        let inner = mean_test(&data, &window, &opts)?;
        Ok(MeanEquivTest { inner })
    }

    #[getter]
    pub fn mean_coef(&self) -> f64 {
        self.inner.mean_coef
    }

    #[getter]
    pub fn se(&self) -> f64 {
        self.inner.se
    }

    #[getter]
    pub fn pvalue(&self) -> Option<f64> {
        self.inner.p_value
    }

    #[getter]
    pub fn reject(&self) -> Option<bool> {
        self.inner.decision.reject()
    }

    #[getter]
    pub fn min_threshold(&self) -> Option<f64> {
        self.inner.decision.min_threshold()
    }

    #[getter]
    pub fn coefficients(&self) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        coefficient_columns(&self.inner.coefficients)
    }
}

/// RmsEquivTest — Python-facing wrapper for the RMS equivalence test.
///
/// `zeta=None` runs the minimum-threshold search.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "equitrends.statistical_tests")]
pub struct RmsEquivTest {
    inner: RmsTestOutcome,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl RmsEquivTest {
    #[new]
    #[pyo3(
        signature = (
            y, id, group, period, x = None, cluster = None, pretreatment_periods = None,
            base_period = None, alpha = 0.05, zeta = None, subsamples = 5, seed = None,
        ),
        text_signature = "(y, id, group, period, /, x=None, cluster=None, pretreatment_periods=None, \
                          base_period=None, alpha=0.05, zeta=None, subsamples=5, seed=None)"
    )]
    pub fn new<'py>(
        py: Python<'py>, y: &Bound<'py, PyAny>, id: &Bound<'py, PyAny>, group: &Bound<'py, PyAny>,
        period: &Bound<'py, PyAny>, x: Option<&Bound<'py, PyAny>>, cluster: Option<&Bound<'py, PyAny>>,
        pretreatment_periods: Option<Vec<f64>>, base_period: Option<f64>, alpha: f64, zeta: Option<f64>,
        subsamples: usize, seed: Option<u64>,
    ) -> PyResult<Self> {
        let data = build_panel_data(py, y, id, group, period, x, cluster)?;
        let window = build_panel_options(pretreatment_periods, base_period)?;
        let opts = RmsTestOptions { alpha, mode: test_mode(zeta), subsamples, seed };
        let inner = rms_test(&data, &window, &opts)?;
        Ok(RmsEquivTest { inner })
    }

    #[getter]
    pub fn rms(&self) -> f64 {
        self.inner.rms
    }

    #[getter]
    pub fn v_hat(&self) -> f64 {
        self.inner.v_hat
    }

    #[getter]
    pub fn reject(&self) -> Option<bool> {
        self.inner.decision.reject()
    }

    #[getter]
    pub fn min_threshold(&self) -> Option<f64> {
        self.inner.decision.min_threshold()
    }

    /// `[(level, rms_lower, rms_upper), ...]`.
    #[getter]
    pub fn confidence_intervals(&self) -> Vec<(u32, f64, f64)> {
        self.inner.confidence_intervals.iter().map(|c| (c.level, c.rms_lower, c.rms_upper)).collect()
    }

    #[getter]
    pub fn seed(&self) -> u64 {
        self.inner.seed
    }

    #[getter]
    pub fn se_error(&self) -> Option<String> {
        self.inner.se_error.clone()
    }
}

/// Folded-normal CDF F(x; mean, sd).
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(signature = (x, mean = 0.0, sd = 1.0))]
fn pfoldnorm(x: f64, mean: f64, sd: f64) -> PyResult<f64> {
    Ok(folded_normal::cdf(x, mean, sd)?)
}

/// Folded-normal quantile Q(p; mean, sd).
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(signature = (p, mean = 0.0, sd = 1.0))]
fn qfoldnorm(p: f64, mean: f64, sd: f64) -> PyResult<f64> {
    Ok(folded_normal::quantile(p, mean, sd)?)
}

/// Element-wise folded-normal quantile over equal-length array-likes.
#[cfg(feature = "python-bindings")]
#[pyfunction]
fn qfoldnorm_vec<'py>(
    py: Python<'py>, p: &Bound<'py, PyAny>, mean: &Bound<'py, PyAny>, sd: &Bound<'py, PyAny>,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let (p, mean, sd) = (extract_f64_array(py, p)?, extract_f64_array(py, mean)?, extract_f64_array(py, sd)?);
    let out = folded_normal::quantile_vec(p.as_slice()?, mean.as_slice()?, sd.as_slice()?)?;
    Ok(out.into_pyarray(py))
}

/// Smallest δ at which the IU test rejects for one coefficient.
#[cfg(feature = "python-bindings")]
#[pyfunction]
fn find_min_threshold_iu(coef: f64, sd: f64, alpha: f64) -> PyResult<f64> {
    Ok(folded_normal::min_threshold_iu(coef, sd, alpha)?)
}

/// Smallest τ at which the mean test rejects.
#[cfg(feature = "python-bindings")]
#[pyfunction]
fn find_min_threshold_mean(coef: f64, sd: f64, alpha: f64) -> PyResult<f64> {
    Ok(folded_normal::min_threshold_mean(coef, sd, alpha)?)
}

/// _equitrends — PyO3 module initializer for the Python extension.
///
/// Creates the `statistical_tests` and `folded_normal` submodules, attaches
/// them to `_equitrends`, and registers them in `sys.modules` so dotted
/// imports work. Invoked by Python on import.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _equitrends<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let statistical_tests_mod = PyModule::new(_py, "statistical_tests")?;
    let folded_normal_mod = PyModule::new(_py, "folded_normal")?;
    statistical_tests(_py, m, &statistical_tests_mod)?;
    folded_normal(_py, m, &folded_normal_mod)?;

    // Manually add submodules into sys.modules to allow for dot notation.
    _py.import("sys")?
        .getattr("modules")?
        .set_item("equitrends.statistical_tests", statistical_tests_mod)?;

    _py.import("sys")?
        .getattr("modules")?
        .set_item("equitrends.folded_normal", folded_normal_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn statistical_tests<'py>(
    _py: Python, equitrends: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<MaxEquivTest>()?;
    m.add_class::<MeanEquivTest>()?;
    m.add_class::<RmsEquivTest>()?;
    equitrends.add_submodule(m)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn folded_normal<'py>(
    _py: Python, equitrends: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(pfoldnorm, m)?)?;
    m.add_function(wrap_pyfunction!(qfoldnorm, m)?)?;
    m.add_function(wrap_pyfunction!(qfoldnorm_vec, m)?)?;
    m.add_function(wrap_pyfunction!(find_min_threshold_iu, m)?)?;
    m.add_function(wrap_pyfunction!(find_min_threshold_mean, m)?)?;
    equitrends.add_submodule(m)?;
    Ok(())
}
