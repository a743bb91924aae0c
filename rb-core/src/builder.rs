//! Constructors for scene objects, keyed by object kind.
//!
//! An `ObjectRegistry` maps each `ObjectKind` to a plain constructor
//! function. The registry is an ordinary value owned by whoever assembles
//! the scene; `ObjectRegistry::default()` knows the stock kinds:
//!
//! - **spring**: mass on a Hooke spring along x, anchored at its start x
//! - **free**: body under an optional constant force, no torque

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::body::RigidBody;
use crate::config::ObjectSpec;
use crate::forces::{ConstantForce, SpringForce, ZeroForce};
use crate::linalg::Vector;
use crate::scene::{Scene, SceneError, SceneObject};

/// Kinds of object a scene file can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Spring,
    Free,
}

/// Builds a configured, not yet initialized, scene object.
pub type ObjectConstructor = fn(&ObjectSpec) -> Result<SceneObject, SceneError>;

/// Explicit mapping from object kind to constructor.
#[derive(Debug, Clone)]
pub struct ObjectRegistry {
    constructors: HashMap<ObjectKind, ObjectConstructor>,
}

impl Default for ObjectRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(ObjectKind::Spring, build_spring);
        registry.register(ObjectKind::Free, build_free);
        registry
    }
}

impl ObjectRegistry {
    /// Registry with no constructors.
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Register or replace the constructor for `kind`.
    pub fn register(&mut self, kind: ObjectKind, constructor: ObjectConstructor) {
        self.constructors.insert(kind, constructor);
    }

    pub fn contains(&self, kind: ObjectKind) -> bool {
        self.constructors.contains_key(&kind)
    }

    /// Build an object with the constructor registered for `spec.kind`.
    pub fn build(&self, spec: &ObjectSpec) -> Result<SceneObject, SceneError> {
        let constructor = self
            .constructors
            .get(&spec.kind)
            .ok_or(SceneError::UnknownKind { kind: spec.kind })?;
        constructor(spec)
    }
}

/// Body with mass, inertia and initial state taken from `spec`.
fn configure_body(spec: &ObjectSpec) -> Result<RigidBody, SceneError> {
    let dimension = spec.position.len();
    let zeros = Vector::zeros(dimension);

    let mut body = RigidBody::new(dimension).map_err(|e| SceneError::body(&spec.name, e))?;
    body.set_mass(spec.mass);
    if let Some(inertia) = &spec.inertia {
        body.set_inertia(inertia.clone())
            .map_err(|e| SceneError::body(&spec.name, e))?;
    }
    body.set_state(
        spec.position.clone(),
        spec.orientation.unwrap_or_default(),
        spec.linear_momentum.clone().unwrap_or_else(|| zeros.clone()),
        spec.angular_momentum.clone().unwrap_or(zeros),
    )
    .map_err(|e| SceneError::body(&spec.name, e))?;
    Ok(body)
}

fn into_object(spec: &ObjectSpec, body: RigidBody) -> SceneObject {
    SceneObject::new(spec.name.clone(), spec.kind, body)
        .with_dimensions(spec.dimensions)
        .with_origin(spec.origin)
}

/// Mass on a spring anchored at the object's initial x position.
///
/// Stiffness must be positive and the rest length non-zero.
pub fn build_spring(spec: &ObjectSpec) -> Result<SceneObject, SceneError> {
    if spec.stiffness <= 0.0 {
        return Err(SceneError::invalid_object(
            &spec.name,
            "spring stiffness must be more than zero",
        ));
    }
    if spec.rest_length == 0.0 {
        return Err(SceneError::invalid_object(
            &spec.name,
            "spring rest length must not be zero",
        ));
    }

    let anchor = spec.position.get(0).map_err(|e| SceneError::body(&spec.name, e.into()))?;
    let mut body = configure_body(spec)?;
    body.set_force_function(SpringForce::new(spec.stiffness, spec.rest_length, anchor));
    body.set_torque_function(ZeroForce);
    Ok(into_object(spec, body))
}

/// Body under a constant force (zero when none is given) and no torque.
pub fn build_free(spec: &ObjectSpec) -> Result<SceneObject, SceneError> {
    let mut body = configure_body(spec)?;
    match &spec.force {
        Some(force) if force.len() != body.dimension() => {
            return Err(SceneError::invalid_object(
                &spec.name,
                format!(
                    "force has size {}, body is {}D",
                    force.len(),
                    body.dimension()
                ),
            ));
        }
        Some(force) => body.set_force_function(ConstantForce(force.clone())),
        None => body.set_force_function(ZeroForce),
    }
    body.set_torque_function(ZeroForce);
    Ok(into_object(spec, body))
}

/// The two-spring demo scene, compiled and ready to step.
///
/// | object   | mass | k   | rest | x0  | origin     |
/// |----------|------|-----|------|-----|------------|
/// | spring-a | 20   | 50  | 50   | 100 | (50, 300)  |
/// | spring-b | 20   | 100 | 200  | 10  | (50, 150)  |
pub fn harmonic_oscillator_scene(registry: &ObjectRegistry) -> Result<Scene, SceneError> {
    let specs = [
        ObjectSpec::spring("spring-a", 20.0, 50.0, 50.0, Vector::new2(100.0, 0.0))
            .with_dimensions([40.0, 40.0, 0.0])
            .with_origin([50.0, 300.0, 0.0]),
        ObjectSpec::spring("spring-b", 20.0, 100.0, 200.0, Vector::new2(10.0, 0.0))
            .with_dimensions([40.0, 40.0, 0.0])
            .with_origin([50.0, 150.0, 0.0]),
    ];

    let mut scene = Scene::new();
    for spec in &specs {
        scene.add_object(registry.build(spec)?);
    }
    scene.compile()?;
    Ok(scene)
}

// =============================================================================
// Tests
// =============================================================================
