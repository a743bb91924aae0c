//! A collection of rigid bodies advanced together on a fixed timestep.
//!
//! ```text
//! add_object ... ──► compile ──► step ──► step ──► ...
//!                    (initialize     (every body at t, then t += dt)
//!                     every body)
//! ```
//!
//! The scene never sleeps or paces itself. A real-time front end calls
//! `step` from its own frame loop and reads `positions` afterwards.

use thiserror::Error;
use tracing::debug;

use crate::body::{BodyError, RigidBody};
use crate::builder::ObjectKind;
use crate::linalg::Vector;

/// Playback timestep of the harmonic oscillator demo (s).
pub const DEFAULT_TIMESTEP: f64 = 0.2;

/// Errors raised while assembling, compiling or stepping a scene.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SceneError {
    /// An object failed to initialize during `compile`.
    #[error("scene compilation failed for object '{name}': {source}")]
    Compilation { name: String, source: BodyError },

    /// Object parameters rejected by its constructor.
    #[error("invalid object '{name}': {reason}")]
    InvalidObject { name: String, reason: String },

    #[error("scene must be compiled before stepping")]
    NotCompiled,

    /// No constructor registered for this object kind.
    #[error("no constructor registered for object kind {kind:?}")]
    UnknownKind { kind: ObjectKind },

    #[error("timestep must be positive, got {timestep}")]
    InvalidTimestep { timestep: f64 },

    /// A body failed while being configured or integrated.
    #[error("object '{name}': {source}")]
    Body { name: String, source: BodyError },
}

impl SceneError {
    pub fn invalid_object(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidObject {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn body(name: impl Into<String>, source: BodyError) -> Self {
        Self::Body {
            name: name.into(),
            source,
        }
    }
}

/// A named body plus the data a renderer needs to draw it.
#[derive(Debug)]
pub struct SceneObject {
    pub name: String,
    pub kind: ObjectKind,
    pub body: RigidBody,
    /// Width, height, depth of the drawn box.
    pub dimensions: [f64; 3],
    /// Offset of the body's inertial frame in scene coordinates.
    pub origin: [f64; 3],
}

impl SceneObject {
    pub fn new(name: impl Into<String>, kind: ObjectKind, body: RigidBody) -> Self {
        Self {
            name: name.into(),
            kind,
            body,
            dimensions: [0.0; 3],
            origin: [0.0; 3],
        }
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

    pub fn position(&self) -> &Vector {
        self.body.position()
    }

    /// Body position shifted by the frame origin, padded to 3D.
    pub fn scene_position(&self) -> [f64; 3] {
        let mut out = self.origin;
        for (o, p) in out.iter_mut().zip(self.body.position().values()) {
            *o += p;
        }
        out
    }
}

/// Bodies integrated in lockstep.
#[derive(Debug)]
pub struct Scene {
    objects: Vec<SceneObject>,
    timestep: f64,
    steps: u64,
    compiled: bool,
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            objects: Vec::new(),
            timestep: DEFAULT_TIMESTEP,
            steps: 0,
            compiled: false,
        }
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty scene with a custom timestep.
    pub fn with_timestep(timestep: f64) -> Result<Self, SceneError> {
        if timestep.is_nan() || timestep <= 0.0 {
            return Err(SceneError::InvalidTimestep { timestep });
        }
        Ok(Self {
            timestep,
            ..Self::default()
        })
    }

    /// Add an object. The scene must be compiled again before stepping.
    pub fn add_object(&mut self, object: SceneObject) {
        self.objects.push(object);
        self.compiled = false;
    }

    /// Initialize every body.
    ///
    /// Stops at the first failure and reports it with the object's name.
    pub fn compile(&mut self) -> Result<(), SceneError> {
        self.compiled = false;
        for object in &mut self.objects {
            object
                .body
                .initialize()
                .map_err(|source| SceneError::Compilation {
                    name: object.name.clone(),
                    source,
                })?;
        }
        self.compiled = true;
        debug!(
            objects = self.objects.len(),
            timestep = self.timestep,
            "scene compiled"
        );
        Ok(())
    }

    /// Integrate every body from the current time, then advance the clock.
    ///
    /// All bodies are integrated before any is written back, so a step that
    /// fails on one object leaves every body and the clock as they were.
    pub fn step(&mut self) -> Result<(), SceneError> {
        if !self.compiled {
            return Err(SceneError::NotCompiled);
        }
        let t = self.time();
        let results = self
            .objects
            .iter()
            .map(|object| {
                object
                    .body
                    .integrate(t, self.timestep)
                    .map_err(|source| SceneError::body(object.name.clone(), source))
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (object, result) in self.objects.iter_mut().zip(results) {
            object.body.commit(result);
        }
        self.steps += 1;
        Ok(())
    }

    /// Run `steps` consecutive steps.
    pub fn run(&mut self, steps: usize) -> Result<(), SceneError> {
        for _ in 0..steps {
            self.step()?;
        }
        debug!(steps, time = self.time(), "scene run finished");
        Ok(())
    }

    /// Current simulation time, `step_count * timestep`.
    pub fn time(&self) -> f64 {
        self.steps as f64 * self.timestep
    }

    pub fn timestep(&self) -> f64 {
        self.timestep
    }

    pub fn step_count(&self) -> u64 {
        self.steps
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn object(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.name == name)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Position of every body, in insertion order.
    pub fn positions(&self) -> Vec<&Vector> {
        self.objects.iter().map(SceneObject::position).collect()
    }
}

// =============================================================================
// Tests
// =============================================================================
