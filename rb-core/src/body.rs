//! Rigid-body state and lifecycle.
//!
//! A `RigidBody` is built in three phases:
//!
//! ```text
//! configure                     initialize              update(t, dt) ...
//! mass, inertia, state,  ───►  inverse mass and  ───►  RK4 step, writes the
//! force + torque functions      inverse inertia         new state in one place
//! ```
//!
//! `initialize` validates the configuration once. `update` is then called
//! repeatedly by the scene driver; it performs no I/O and keeps every RK4
//! stage buffer local to the call.

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::forces::ForceFunction;
use crate::integrator::{BodyModel, BodyState, Derived, IntegrationResult, RungeKutta4};
use crate::linalg::{MathError, Matrix, Quaternion, Vector};

/// Errors raised while configuring or integrating a body.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BodyError {
    /// The body cannot be initialized with its current configuration.
    #[error("initialization failed: {reason}")]
    Initialization { reason: String },

    /// `update` was called before `initialize` succeeded.
    #[error("rigid body used before initialization")]
    NotInitialized,

    /// State vectors of unsupported or mismatched dimension.
    #[error("invalid state: {reason}")]
    InvalidState { reason: String },

    #[error(transparent)]
    Math(#[from] MathError),
}

impl BodyError {
    pub fn initialization(reason: impl Into<String>) -> Self {
        Self::Initialization {
            reason: reason.into(),
        }
    }

    pub fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidState {
            reason: reason.into(),
        }
    }

    pub fn is_initialization(&self) -> bool {
        matches!(self, Self::Initialization { .. })
    }

    pub fn is_not_initialized(&self) -> bool {
        matches!(self, Self::NotInitialized)
    }
}

/// A rigid body integrated in momentum space.
pub struct RigidBody {
    dimension: usize,
    mass: f64,
    inverse_mass: f64,
    inertia: Option<Matrix>,
    inverse_inertia: Option<Matrix>,
    state: BodyState,
    derived: Derived,
    force: Option<Box<dyn ForceFunction>>,
    torque: Option<Box<dyn ForceFunction>>,
    initialized: bool,
}

impl RigidBody {
    /// Unconfigured body at rest in 2 or 3 dimensions.
    pub fn new(dimension: usize) -> Result<Self, BodyError> {
        if !(2..=3).contains(&dimension) {
            return Err(BodyError::invalid_state(format!(
                "bodies live in 2 or 3 dimensions, got {}",
                dimension
            )));
        }
        Ok(Self::at_dimension(dimension))
    }

    /// Unconfigured 2D body.
    pub fn planar() -> Self {
        Self::at_dimension(2)
    }

    /// Unconfigured 3D body.
    pub fn spatial() -> Self {
        Self::at_dimension(3)
    }

    fn at_dimension(dimension: usize) -> Self {
        Self {
            dimension,
            mass: 0.0,
            inverse_mass: 0.0,
            inertia: None,
            inverse_inertia: None,
            state: BodyState::at_rest(dimension),
            derived: Derived::at_rest(dimension),
            force: None,
            torque: None,
            initialized: false,
        }
    }

    // ========================================================================
    // Configuration
    // ========================================================================

    pub fn set_mass(&mut self, mass: f64) {
        self.mass = mass;
        self.initialized = false;
    }

    /// Set the inertia tensor. Must be square with the body's dimension.
    pub fn set_inertia(&mut self, inertia: Matrix) -> Result<(), BodyError> {
        if inertia.shape() != (self.dimension, self.dimension) {
            return Err(BodyError::invalid_state(format!(
                "inertia tensor of a {}D body must be {}x{}, got {}x{}",
                self.dimension,
                self.dimension,
                self.dimension,
                inertia.rows(),
                inertia.cols()
            )));
        }
        self.inertia = Some(inertia);
        self.initialized = false;
        Ok(())
    }

    pub fn set_force_function(&mut self, force: impl ForceFunction + 'static) {
        self.force = Some(Box::new(force));
    }

    pub fn set_torque_function(&mut self, torque: impl ForceFunction + 'static) {
        self.torque = Some(Box::new(torque));
    }

    /// Replace the integrated state.
    ///
    /// Vectors must match the body's dimension. On an initialized body the
    /// derived quantities are recomputed immediately.
    pub fn set_state(
        &mut self,
        position: Vector,
        orientation: Quaternion,
        linear_momentum: Vector,
        angular_momentum: Vector,
    ) -> Result<(), BodyError> {
        for (name, v) in [
            ("position", &position),
            ("linear momentum", &linear_momentum),
            ("angular momentum", &angular_momentum),
        ] {
            if v.len() != self.dimension {
                return Err(BodyError::invalid_state(format!(
                    "{} has size {}, body is {}D",
                    name,
                    v.len(),
                    self.dimension
                )));
            }
        }

        let state = BodyState {
            position,
            orientation,
            linear_momentum,
            angular_momentum,
        };
        if self.initialized {
            self.derived = self.model()?.derive(&state)?;
        }
        self.state = state;
        Ok(())
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Validate the configuration and compute inverse mass and inertia.
    ///
    /// Fails when the mass is exactly zero or when either the force or the
    /// torque function is missing. The inertia tensor is optional; without
    /// one the body is a point mass and never spins.
    pub fn initialize(&mut self) -> Result<(), BodyError> {
        if self.mass == 0.0 {
            return Err(BodyError::initialization("mass is zero"));
        }
        let Some(force) = self.force.as_deref() else {
            return Err(BodyError::initialization("force function not set"));
        };
        let Some(torque) = self.torque.as_deref() else {
            return Err(BodyError::initialization("torque function not set"));
        };

        let inverse_mass = 1.0 / self.mass;
        let inverse_inertia = self.inertia.as_ref().map(|inertia| {
            if !inertia.is_diagonal() {
                warn!(
                    "inertia tensor has off-diagonal terms; element-wise inversion is only exact for diagonal tensors"
                );
            }
            inertia.reciprocal()
        });

        // nothing is stored until the initial state derives cleanly
        let model = BodyModel {
            inverse_mass,
            inverse_inertia: inverse_inertia.as_ref(),
            force,
            torque,
        };
        let derived = model.derive(&self.state).map_err(|e| {
            BodyError::initialization(format!("cannot derive initial velocities: {}", e))
        })?;

        self.inverse_mass = inverse_mass;
        self.inverse_inertia = inverse_inertia;
        self.derived = derived;
        self.initialized = true;

        debug!(
            mass = self.mass,
            inverse_mass = self.inverse_mass,
            has_inertia = self.inertia.is_some(),
            dimension = self.dimension,
            "rigid body initialized"
        );
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Advance the body from time `t` by `dt` with one RK4 step.
    pub fn update(&mut self, t: f64, dt: f64) -> Result<(), BodyError> {
        let result = self.integrate(t, dt)?;
        self.commit(result);
        Ok(())
    }

    /// Compute one RK4 step from time `t` without touching the body.
    ///
    /// Lets a caller integrate several bodies and store the results only
    /// once every body has succeeded.
    pub fn integrate(&self, t: f64, dt: f64) -> Result<IntegrationResult, BodyError> {
        if !self.initialized {
            return Err(BodyError::NotInitialized);
        }
        trace!(t, dt, "rigid body step");
        Ok(RungeKutta4::step(&self.model()?, &self.state, &self.derived, t, dt)?)
    }

    /// Store a result produced by `integrate` on this body.
    pub(crate) fn commit(&mut self, result: IntegrationResult) {
        self.state = result.state;
        self.derived = result.derived;
    }

    /// Rescale the orientation to unit length.
    ///
    /// Integration never does this on its own. Fails on a zero quaternion.
    pub fn normalize_orientation(&mut self) -> Result<(), BodyError> {
        self.state.orientation = self.state.orientation.unit()?;
        if self.initialized {
            self.derived = self.model()?.derive(&self.state)?;
        }
        Ok(())
    }

    fn model(&self) -> Result<BodyModel<'_>, BodyError> {
        match (&self.force, &self.torque) {
            (Some(force), Some(torque)) => Ok(BodyModel {
                inverse_mass: self.inverse_mass,
                inverse_inertia: self.inverse_inertia.as_ref(),
                force: force.as_ref(),
                torque: torque.as_ref(),
            }),
            _ => Err(BodyError::initialization(
                "force and torque functions must be set",
            )),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// `1 / mass`, zero before initialization.
    pub fn inverse_mass(&self) -> f64 {
        self.inverse_mass
    }

    pub fn inertia(&self) -> Option<&Matrix> {
        self.inertia.as_ref()
    }

    pub fn inverse_inertia(&self) -> Option<&Matrix> {
        self.inverse_inertia.as_ref()
    }

    pub fn state(&self) -> &BodyState {
        &self.state
    }

    pub fn position(&self) -> &Vector {
        &self.state.position
    }

    pub fn orientation(&self) -> Quaternion {
        self.state.orientation
    }

    pub fn linear_momentum(&self) -> &Vector {
        &self.state.linear_momentum
    }

    pub fn angular_momentum(&self) -> &Vector {
        &self.state.angular_momentum
    }

    pub fn rotation_matrix(&self) -> &Matrix {
        &self.derived.rotation
    }

    pub fn linear_velocity(&self) -> &Vector {
        &self.derived.linear_velocity
    }

    pub fn angular_velocity(&self) -> &Vector {
        &self.derived.angular_velocity
    }

    /// Translational plus rotational kinetic energy (J).
    ///
    /// `|P|² / 2m + L·W / 2`, using the current derived velocities.
    pub fn kinetic_energy(&self) -> Result<f64, BodyError> {
        let translational = 0.5 * self.inverse_mass * self.state.linear_momentum.squared_length();
        let rotational = 0.5
            * self
                .state
                .angular_momentum
                .dot(&self.derived.angular_velocity)?;
        Ok(translational + rotational)
    }
}

impl std::fmt::Debug for RigidBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RigidBody")
            .field("dimension", &self.dimension)
            .field("mass", &self.mass)
            .field("inertia", &self.inertia)
            .field("state", &self.state)
            .field("derived", &self.derived)
            .field("has_force", &self.force.is_some())
            .field("has_torque", &self.torque.is_some())
            .field("initialized", &self.initialized)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forces::{ConstantForce, ZeroForce};
    use approx::assert_relative_eq;

    fn free_planar(mass: f64) -> RigidBody {
        let mut body = RigidBody::planar();
        body.set_mass(mass);
        body.set_force_function(ZeroForce);
        body.set_torque_function(ZeroForce);
        body
    }

    #[test]
    fn test_new_rejects_unsupported_dimension() {
        assert!(RigidBody::new(2).is_ok());
        assert!(RigidBody::new(3).is_ok());
        assert!(matches!(RigidBody::new(4), Err(BodyError::InvalidState { .. })));
        assert!(RigidBody::new(1).is_err());
    }

    #[test]
    fn test_zero_mass_fails_initialization() {
        let mut body = free_planar(0.0);
        body.set_inertia(Matrix::identity(2)).unwrap();
        let err = body.initialize().unwrap_err();
        assert!(err.is_initialization(), "Expected initialization error, got {:?}", err);
        assert!(!body.is_initialized());
    }

    #[test]
    fn test_missing_functions_fail_initialization() {
        let mut body = RigidBody::planar();
        body.set_mass(1.0);
        assert!(body.initialize().unwrap_err().is_initialization());

        body.set_force_function(ZeroForce);
        assert!(body.initialize().unwrap_err().is_initialization());

        body.set_torque_function(ZeroForce);
        assert!(body.initialize().is_ok());
    }

    #[test]
    fn test_failed_initialize_leaves_inverses_untouched() {
        let mut body = RigidBody::spatial();
        body.set_mass(2.0);
        body.set_inertia(Matrix::identity(3)).unwrap();
        body.set_force_function(ZeroForce);
        body.set_torque_function(ZeroForce);
        body.set_state(Vector::zeros(3), Quaternion::ZERO, Vector::zeros(3), Vector::zeros(3))
            .unwrap();

        let err = body.initialize().unwrap_err();
        assert!(err.is_initialization(), "Expected initialization error, got {:?}", err);
        assert!(!body.is_initialized());
        assert_eq!(body.inverse_mass(), 0.0, "inverse mass must not be stored");
        assert!(body.inverse_inertia().is_none(), "inverse inertia must not be stored");
    }

    #[test]
    fn test_failed_reinitialize_keeps_previous_inverses() {
        let mut body = RigidBody::spatial();
        body.set_mass(4.0);
        body.set_inertia(Matrix::from_diagonal(&[2.0, 2.0, 2.0])).unwrap();
        body.set_force_function(ZeroForce);
        body.set_torque_function(ZeroForce);
        body.initialize().unwrap();

        body.set_mass(8.0);
        body.set_state(Vector::zeros(3), Quaternion::ZERO, Vector::zeros(3), Vector::zeros(3))
            .unwrap();
        assert!(body.initialize().unwrap_err().is_initialization());
        assert_eq!(body.inverse_mass(), 0.25);
        assert_eq!(body.inverse_inertia(), Some(&Matrix::from_diagonal(&[0.5, 0.5, 0.5])));
    }

    #[test]
    fn test_update_before_initialize() {
        let mut body = free_planar(1.0);
        assert!(body.update(0.0, 0.1).unwrap_err().is_not_initialized());
    }

    #[test]
    fn test_initialize_computes_inverses() {
        let mut body = free_planar(4.0);
        body.set_inertia(Matrix::from_diagonal(&[2.0, 8.0])).unwrap();
        body.initialize().unwrap();

        assert_eq!(body.inverse_mass(), 0.25);
        assert_eq!(body.inverse_inertia(), Some(&Matrix::from_diagonal(&[0.5, 0.125])));
    }

    #[test]
    fn test_point_mass_has_no_inverse_inertia() {
        let mut body = free_planar(1.0);
        body.initialize().unwrap();
        assert!(body.inverse_inertia().is_none());
        assert_eq!(body.angular_velocity(), &Vector::zeros(2));
    }

    #[test]
    fn test_set_inertia_checks_shape() {
        let mut body = RigidBody::spatial();
        assert!(body.set_inertia(Matrix::identity(2)).is_err());
        assert!(body.set_inertia(Matrix::zeros(3, 2)).is_err());
        assert!(body.set_inertia(Matrix::identity(3)).is_ok());
    }

    #[test]
    fn test_set_state_checks_dimensions() {
        let mut body = free_planar(1.0);
        let err = body
            .set_state(
                Vector::new3(0.0, 0.0, 0.0),
                Quaternion::IDENTITY,
                Vector::zeros(2),
                Vector::zeros(2),
            )
            .unwrap_err();
        assert!(matches!(err, BodyError::InvalidState { .. }));
        assert_eq!(body.position(), &Vector::zeros(2), "State must be untouched on error");
    }

    #[test]
    fn test_set_state_refreshes_velocity_after_initialize() {
        let mut body = free_planar(2.0);
        body.initialize().unwrap();
        body.set_state(
            Vector::new2(1.0, 1.0),
            Quaternion::IDENTITY,
            Vector::new2(4.0, 0.0),
            Vector::zeros(2),
        )
        .unwrap();
        assert_eq!(body.linear_velocity(), &Vector::new2(2.0, 0.0));
        assert_relative_eq!(body.kinetic_energy().unwrap(), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_kinetic_energy_includes_rotation() {
        let mut body = RigidBody::spatial();
        body.set_mass(1.0);
        body.set_inertia(Matrix::identity(3)).unwrap();
        body.set_force_function(ZeroForce);
        body.set_torque_function(ZeroForce);
        body.set_state(
            Vector::zeros(3),
            Quaternion::IDENTITY,
            Vector::new3(1.0, 0.0, 0.0),
            Vector::new3(0.0, 0.0, 2.0),
        )
        .unwrap();
        body.initialize().unwrap();

        // |P|²/2m = 0.5, L·W/2 = 2
        assert_relative_eq!(body.kinetic_energy().unwrap(), 2.5, epsilon = 1e-12);
    }

    #[test]
    fn test_velocity_derived_from_state_set_before_initialize() {
        let mut body = free_planar(2.0);
        body.set_state(
            Vector::zeros(2),
            Quaternion::IDENTITY,
            Vector::new2(0.0, -6.0),
            Vector::zeros(2),
        )
        .unwrap();
        assert_eq!(body.linear_velocity(), &Vector::zeros(2));
        body.initialize().unwrap();
        assert_eq!(body.linear_velocity(), &Vector::new2(0.0, -3.0));
    }

    #[test]
    fn test_update_moves_body() {
        let mut body = RigidBody::planar();
        body.set_mass(2.0);
        body.set_force_function(ConstantForce(Vector::new2(4.0, 0.0)));
        body.set_torque_function(ZeroForce);
        body.initialize().unwrap();

        body.update(0.0, 1.0).unwrap();
        // a = 2, x = 0.5 * a * t²
        assert_relative_eq!(body.position().get(0).unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(body.linear_momentum().get(0).unwrap(), 4.0, epsilon = 1e-12);
        assert_relative_eq!(body.linear_velocity().get(0).unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_force_of_wrong_size_surfaces_as_math_error() {
        let mut body = RigidBody::planar();
        body.set_mass(1.0);
        body.set_force_function(ConstantForce(Vector::zeros(3)));
        body.set_torque_function(ZeroForce);
        body.initialize().unwrap();
        assert!(matches!(body.update(0.0, 0.1), Err(BodyError::Math(_))));
    }

    #[test]
    fn test_normalize_orientation() {
        let mut body = RigidBody::spatial();
        body.set_state(
            Vector::zeros(3),
            Quaternion::new(2.0, 0.0, 0.0, 0.0),
            Vector::zeros(3),
            Vector::zeros(3),
        )
        .unwrap();
        body.normalize_orientation().unwrap();
        assert_eq!(body.orientation(), Quaternion::IDENTITY);

        body.set_state(Vector::zeros(3), Quaternion::ZERO, Vector::zeros(3), Vector::zeros(3))
            .unwrap();
        assert!(matches!(body.normalize_orientation(), Err(BodyError::Math(_))));
    }

    #[test]
    fn test_reconfiguring_mass_requires_initialize() {
        let mut body = free_planar(1.0);
        body.initialize().unwrap();
        body.set_mass(3.0);
        assert!(body.update(0.0, 0.1).unwrap_err().is_not_initialized());
        body.initialize().unwrap();
        assert!(body.update(0.0, 0.1).is_ok());
    }
}
