use chrono::NaiveDate;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;
use std::sync::Arc;
use tokio::runtime::Runtime;

use crate::config::{AiSettings, MatchOptions};
use crate::core::{Donation, GeoLocation, MatchResult, QualityLabel, ScoredCandidate, Unit};
use crate::directory::{NewNgo, SqliteDirectory};
use crate::error::MatchEngineError;
use crate::notifications::plan_notifications;
use crate::scoring::validate_radius;
use crate::MatchEngine as RustMatchEngine;

fn to_py_err(e: MatchEngineError) -> PyErr {
    match e {
        MatchEngineError::InvalidDonation(_) | MatchEngineError::InvalidLocation(_) => {
            PyValueError::new_err(e.to_string())
        }
        e => PyRuntimeError::new_err(e.to_string()),
    }
}

/// Python wrapper for MatchEngine
#[pyclass]
struct MatchEngine {
    engine: Arc<RustMatchEngine>,
    directory: Arc<SqliteDirectory>,
    runtime: Arc<Runtime>,
}

#[pymethods]
impl MatchEngine {
    /// Create new MatchEngine over a SQLite directory
    #[new]
    #[pyo3(signature = (db_path, max_distance_km=None, use_ai=true))]
    fn new(db_path: String, max_distance_km: Option<f64>, use_ai: bool) -> PyResult<Self> {
        let runtime = Arc::new(Runtime::new().map_err(|e| PyRuntimeError::new_err(e.to_string()))?);

        let directory = runtime
            .block_on(SqliteDirectory::new(&db_path))
            .map(Arc::new)
            .map_err(to_py_err)?;

        let mut options = MatchOptions {
            ai_enabled: use_ai,
            ..MatchOptions::default()
        };
        if let Some(max) = max_distance_km {
            options.max_distance_km = validate_radius(max).map_err(to_py_err)?;
        }
        let engine = RustMatchEngine::with_ai_settings(directory.clone(), options, &AiSettings::from_env());

        Ok(Self {
            engine: Arc::new(engine),
            directory,
            runtime,
        })
    }

    /// Match a donation; `expiry_date` is `YYYY-MM-DD`
    #[pyo3(signature = (food_name, quantity, unit, quality, expiry_date, latitude=None, longitude=None, max_distance_km=None))]
    #[allow(clippy::too_many_arguments)]
    fn match_donation(
        &self,
        food_name: String,
        quantity: u32,
        unit: String,
        quality: String,
        expiry_date: String,
        latitude: Option<f64>,
        longitude: Option<f64>,
        max_distance_km: Option<f64>,
    ) -> PyResult<PyObject> {
        let unit: Unit = unit.parse().map_err(to_py_err)?;
        let quality: QualityLabel = quality.parse().map_err(to_py_err)?;
        let expiry = NaiveDate::parse_from_str(&expiry_date, "%Y-%m-%d")
            .map_err(|e| PyValueError::new_err(format!("Invalid expiry_date: {}", e)))?;
        let donation = Donation::new(food_name, quantity, unit, quality, expiry).map_err(to_py_err)?;

        let donor = match (latitude, longitude) {
            (Some(lat), Some(lon)) => Some(GeoLocation::new(lat, lon).map_err(to_py_err)?),
            _ => None,
        };

        let request = self
            .engine
            .checked_request(donation, donor, max_distance_km)
            .map_err(to_py_err)?;
        let engine = self.engine.clone();
        let result = self.runtime.block_on(async { engine.match_donation(&request).await });
        let notified: Vec<i64> = plan_notifications(&request.donation, &result)
            .iter()
            .map(|n| n.ngo_id)
            .collect();

        Python::with_gil(|py| {
            let dict = match_result_to_py(py, &result)?;
            dict.set_item("notified_ngo_ids", notified)?;
            Ok(dict.into())
        })
    }

    /// Register an NGO, returns its id
    #[pyo3(signature = (name, capacity, organization=None, latitude=None, longitude=None, city=None))]
    fn register_ngo(
        &self,
        name: String,
        capacity: u32,
        organization: Option<String>,
        latitude: Option<f64>,
        longitude: Option<f64>,
        city: Option<String>,
    ) -> PyResult<i64> {
        let mut ngo = NewNgo::new(name, capacity);
        ngo.organization = organization.unwrap_or_default();
        if let (Some(lat), Some(lon)) = (latitude, longitude) {
            let location = GeoLocation::new(lat, lon).map_err(to_py_err)?;
            ngo = ngo.with_location(location.with_city(city.unwrap_or_default()));
        }

        let directory = self.directory.clone();
        self.runtime
            .block_on(async move { directory.register(&ngo).await })
            .map_err(to_py_err)
    }

    /// Get directory statistics
    fn stats(&self) -> PyResult<PyObject> {
        let directory = self.directory.clone();
        let stats = self
            .runtime
            .block_on(async move { directory.stats().await })
            .map_err(to_py_err)?;

        Python::with_gil(|py| {
            let dict = PyDict::new(py);
            dict.set_item("total_ngos", stats.total_ngos)?;
            dict.set_item("active_ngos", stats.active_ngos)?;
            dict.set_item("located_ngos", stats.located_ngos)?;
            dict.set_item("total_capacity", stats.total_capacity)?;
            Ok(dict.into())
        })
    }
}

/// Convert ScoredCandidate to Python dict
fn candidate_to_py(py: Python, candidate: &ScoredCandidate) -> PyResult<PyObject> {
    let dict = PyDict::new(py);
    dict.set_item("id", candidate.ngo.id)?;
    dict.set_item("name", &candidate.ngo.name)?;
    dict.set_item("organization", &candidate.ngo.organization)?;
    dict.set_item("capacity", candidate.ngo.capacity)?;
    dict.set_item("city", candidate.ngo.city())?;
    dict.set_item("score", candidate.score)?;
    dict.set_item("capacity_score", candidate.capacity_score)?;
    dict.set_item("proximity_score", candidate.proximity_score)?;
    dict.set_item("distance_km", candidate.distance_km)?;
    dict.set_item("match_reasons", &candidate.match_reasons)?;
    Ok(dict.into())
}

/// Convert MatchResult to Python dict
fn match_result_to_py<'py>(py: Python<'py>, result: &MatchResult) -> PyResult<&'py PyDict> {
    let dict = PyDict::new(py);
    let selected = result
        .selected
        .as_ref()
        .map(|candidate| candidate_to_py(py, candidate))
        .transpose()?;
    dict.set_item("selected", selected)?;

    let alternatives: PyResult<Vec<PyObject>> = result
        .alternatives
        .iter()
        .map(|alt| candidate_to_py(py, alt))
        .collect();
    dict.set_item("alternatives", alternatives?)?;

    dict.set_item("reasoning", &result.reasoning)?;
    dict.set_item("confidence", result.confidence)?;
    dict.set_item("method", result.method.as_str())?;
    dict.set_item("proximity_enabled", result.proximity_enabled)?;
    dict.set_item("total_nearby", result.total_nearby)?;
    Ok(dict)
}

/// Python module
#[pymodule]
fn foodbridge_match_engine(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<MatchEngine>()?;
    m.add("__version__", crate::VERSION)?;
    Ok(())
}
