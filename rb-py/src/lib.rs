//! Python bindings for the rb-core rigid-body engine.
//!
//! Provides a simple Python API:
//!
//! ```python
//! from rb_physics import Scene
//!
//! scene = Scene.harmonic_oscillator()
//!
//! for _ in range(100):
//!     scene.step()
//!     for name, (x, y) in scene.positions():
//!         print(f"{scene.time:.1f} {name} x={x:.2f}")
//! ```

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use rb_core::builder::{harmonic_oscillator_scene, ObjectRegistry};
use rb_core::config::{ConfigError, SceneConfig, SceneLoader};
use rb_core::scene::{Scene as CoreScene, SceneError};

fn scene_err(err: SceneError) -> PyErr {
    match err {
        SceneError::NotCompiled | SceneError::Body { .. } => PyRuntimeError::new_err(err.to_string()),
        _ => PyValueError::new_err(err.to_string()),
    }
}

fn config_err(err: ConfigError) -> PyErr {
    match err {
        ConfigError::Scene(err) => scene_err(err),
        other => PyValueError::new_err(other.to_string()),
    }
}

/// A compiled scene of rigid bodies.
///
/// Stepping advances every body by the scene timestep.
#[pyclass]
pub struct Scene {
    inner: CoreScene,
}

#[pymethods]
impl Scene {
    /// The two-spring demo scene.
    #[staticmethod]
    fn harmonic_oscillator() -> PyResult<Self> {
        let inner = harmonic_oscillator_scene(&ObjectRegistry::default()).map_err(scene_err)?;
        Ok(Self { inner })
    }

    /// Build a scene from YAML text.
    #[staticmethod]
    fn from_yaml(contents: &str) -> PyResult<Self> {
        let config = SceneConfig::from_yaml_str(contents).map_err(config_err)?;
        let inner = config.build(&ObjectRegistry::default()).map_err(scene_err)?;
        Ok(Self { inner })
    }

    /// Load `<base_path>/<name>.yaml`.
    #[staticmethod]
    fn load(base_path: &str, name: &str) -> PyResult<Self> {
        let inner = SceneLoader::new(base_path)
            .build_scene(name, &ObjectRegistry::default())
            .map_err(config_err)?;
        Ok(Self { inner })
    }

    /// Scene names available under `base_path`.
    #[staticmethod]
    fn list(base_path: &str) -> PyResult<Vec<String>> {
        SceneLoader::new(base_path).list_scenes().map_err(config_err)
    }

    /// Current simulation time in seconds.
    #[getter]
    fn time(&self) -> f64 {
        self.inner.time()
    }

    #[getter]
    fn timestep(&self) -> f64 {
        self.inner.timestep()
    }

    #[getter]
    fn object_count(&self) -> usize {
        self.inner.object_count()
    }

    /// Advance by one timestep.
    fn step(&mut self) -> PyResult<()> {
        self.inner.step().map_err(scene_err)
    }

    /// Run multiple steps at once (more efficient).
    fn step_n(&mut self, steps: usize) -> PyResult<()> {
        self.inner.run(steps).map_err(scene_err)
    }

    /// `(name, position)` for every object, position in the body frame.
    fn positions(&self) -> Vec<(String, Vec<f64>)> {
        self.inner
            .objects()
            .iter()
            .map(|o| (o.name.clone(), o.position().values().to_vec()))
            .collect()
    }

    /// `(name, (x, y, z), (w, h, d))` with the frame origin applied, for drawing.
    fn draw_list(&self) -> Vec<(String, (f64, f64, f64), (f64, f64, f64))> {
        self.inner
            .objects()
            .iter()
            .map(|o| {
                let [x, y, z] = o.scene_position();
                let [w, h, d] = o.dimensions;
                (o.name.clone(), (x, y, z), (w, h, d))
            })
            .collect()
    }

    /// Get current state as dict for easy inspection.
    fn state_dict<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let dict = PyDict::new(py);
        dict.set_item("time", self.inner.time())?;
        dict.set_item("steps", self.inner.step_count())?;
        for object in self.inner.objects() {
            let body = &object.body;
            let entry = PyDict::new(py);
            entry.set_item("position", body.position().values().to_vec())?;
            entry.set_item("orientation", body.orientation().to_array().to_vec())?;
            entry.set_item("linear_momentum", body.linear_momentum().values().to_vec())?;
            entry.set_item("angular_momentum", body.angular_momentum().values().to_vec())?;
            entry.set_item("linear_velocity", body.linear_velocity().values().to_vec())?;
            let energy = body
                .kinetic_energy()
                .map_err(|e| PyRuntimeError::new_err(e.to_string()))?;
            entry.set_item("kinetic_energy", energy)?;
            dict.set_item(object.name.as_str(), entry)?;
        }
        Ok(dict)
    }

    fn __repr__(&self) -> String {
        format!(
            "Scene(objects={}, time={:.3}, timestep={})",
            self.inner.object_count(),
            self.inner.time(),
            self.inner.timestep()
        )
    }
}

/// Python module definition.
#[pymodule]
fn rb_physics(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Scene>()?;
    Ok(())
}
