//! YAML scene configuration.
//!
//! Scenes are described in YAML so new setups can be tried without
//! recompiling. One file per scene, loaded by name:
//!
//! ```text
//! scenes/
//! ├── harmonic_oscillator.yaml
//! └── free_fall.yaml
//! ```
//!
//! A file lists a timestep and the objects to create:
//!
//! ```yaml
//! timestep: 0.2
//! objects:
//!   - name: spring-a
//!     kind: spring
//!     mass: 20.0
//!     stiffness: 50.0
//!     rest_length: 50.0
//!     position: [100.0, 0.0]
//!     dimensions: [40.0, 40.0, 0.0]
//!     origin: [50.0, 300.0, 0.0]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::builder::{ObjectKind, ObjectRegistry};
use crate::linalg::{Matrix, Quaternion, Vector};
use crate::scene::{Scene, SceneError, DEFAULT_TIMESTEP};

/// Error type for scene loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("scene not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// One object entry of a scene file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSpec {
    pub name: String,
    pub kind: ObjectKind,

    /// Mass in kg. Zero is rejected when the scene compiles.
    pub mass: f64,

    /// Spring constant in N/m (springs only)
    #[serde(default)]
    pub stiffness: f64,

    /// Spring length at rest (springs only)
    #[serde(default)]
    pub rest_length: f64,

    /// Initial position; its size sets the body's dimension.
    pub position: Vector,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linear_momentum: Option<Vector>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angular_momentum: Option<Vector>,

    /// `[w, x, y, z]`, identity when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Quaternion>,

    /// Rows of the inertia tensor. Point mass when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inertia: Option<Matrix>,

    /// Constant force (free bodies only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force: Option<Vector>,

    /// Width, height, depth for renderers
    #[serde(default)]
    pub dimensions: [f64; 3],

    /// Inertial frame offset in scene coordinates
    #[serde(default)]
    pub origin: [f64; 3],
}

impl ObjectSpec {
    fn new(name: impl Into<String>, kind: ObjectKind, mass: f64, position: Vector) -> Self {
        Self {
            name: name.into(),
            kind,
            mass,
            stiffness: 0.0,
            rest_length: 0.0,
            position,
            linear_momentum: None,
            angular_momentum: None,
            orientation: None,
            inertia: None,
            force: None,
            dimensions: [0.0; 3],
            origin: [0.0; 3],
        }
    }

    /// Spring object at rest at `position`.
    pub fn spring(
        name: impl Into<String>,
        mass: f64,
        stiffness: f64,
        rest_length: f64,
        position: Vector,
    ) -> Self {
        Self {
            stiffness,
            rest_length,
            ..Self::new(name, ObjectKind::Spring, mass, position)
        }
    }

    /// Free object at rest at `position`, no force.
    pub fn free(name: impl Into<String>, mass: f64, position: Vector) -> Self {
        Self::new(name, ObjectKind::Free, mass, position)
    }

    #[must_use]
    pub fn with_dimensions(mut self, dimensions: [f64; 3]) -> Self {
        self.dimensions = dimensions;
        self
    }

    #[must_use]
    pub fn with_origin(mut self, origin: [f64; 3]) -> Self {
        self.origin = origin;
        self
    }
}

fn default_timestep() -> f64 {
    DEFAULT_TIMESTEP
}

/// A complete scene file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Seconds advanced per step
    #[serde(default = "default_timestep")]
    pub timestep: f64,

    #[serde(default)]
    pub objects: Vec<ObjectSpec>,
}

impl SceneConfig {
    /// Parse a scene from YAML text.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Build every object with `registry` and compile the scene.
    pub fn build(&self, registry: &ObjectRegistry) -> Result<Scene, SceneError> {
        let mut scene = Scene::with_timestep(self.timestep)?;
        for spec in &self.objects {
            scene.add_object(registry.build(spec)?);
        }
        scene.compile()?;
        Ok(scene)
    }
}

/// Scene loader with configurable base directory.
pub struct SceneLoader {
    base_path: PathBuf,
}

impl SceneLoader {
    /// Create a loader reading `<base_path>/<name>.yaml`.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Load a scene by name (without .yaml extension).
    ///
    /// # Example
    /// ```ignore
    /// let loader = SceneLoader::new("scenes");
    /// let scene = loader.load_scene("harmonic_oscillator")?.build(&ObjectRegistry::default())?;
    /// ```
    pub fn load_scene(&self, name: &str) -> Result<SceneConfig, ConfigError> {
        let path = self.base_path.join(format!("{}.yaml", name));
        if !path.exists() {
            return Err(ConfigError::NotFound(name.to_string()));
        }
        let contents = fs::read_to_string(&path)?;
        SceneConfig::from_yaml_str(&contents)
    }

    /// Load and compile a scene in one go.
    pub fn build_scene(&self, name: &str, registry: &ObjectRegistry) -> Result<Scene, ConfigError> {
        Ok(self.load_scene(name)?.build(registry)?)
    }

    /// Names of every scene in the base directory, sorted.
    pub fn list_scenes(&self) -> Result<Vec<String>, ConfigError> {
        if !self.base_path.exists() {
            return Ok(vec![]);
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.base_path)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let name = file_name.to_string_lossy();
            if let Some(stem) = name.strip_suffix(".yaml") {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

// =============================================================================
// Tests
// =============================================================================
