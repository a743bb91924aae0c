//! Fourth-order Runge-Kutta integration of rigid-body state.
//!
//! The integrated state is momentum-space: position `X`, orientation `Q`,
//! linear momentum `P` and angular momentum `L`. Velocities are never
//! integrated directly; they are derived from momentum at every stage.
//!
//! ## Equations of motion
//!
//! ```text
//! dX/dt = V               V = P / m
//! dQ/dt = 0.5 * Q ⊗ W     W = R * I⁻¹ * Rᵀ * L   (W as a pure quaternion)
//! dP/dt = F(t, S)
//! dL/dt = τ(t, S)
//! ```
//!
//! ## Algorithm
//!
//! ```text
//! k1 = f(t,        S0)
//! k2 = f(t + h/2,  S0 + h/2 * k1)
//! k3 = f(t + h/2,  S0 + h/2 * k2)
//! k4 = f(t + h,    S0 + h   * k3)
//! S1 = S0 + h/6 * (k1 + 2*k2 + 2*k3 + k4)
//! ```
//!
//! Every intermediate state gets its own rotation matrix and velocities
//! before the force and torque functions see it. All stage buffers are
//! local to the step; the body is only written once, with `S1`.
//!
//! The orientation is integrated without renormalization, so `|Q|` drifts by
//! the truncation error of the scheme.

use crate::forces::{BodySnapshot, ForceFunction};
use crate::linalg::{MathError, Matrix, Quaternion, Vector};

/// The integrated part of a rigid body's state.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyState {
    pub position: Vector,
    pub orientation: Quaternion,
    pub linear_momentum: Vector,
    pub angular_momentum: Vector,
}

impl BodyState {
    /// Body at rest at the origin with identity orientation.
    pub fn at_rest(dimension: usize) -> Self {
        Self {
            position: Vector::zeros(dimension),
            orientation: Quaternion::IDENTITY,
            linear_momentum: Vector::zeros(dimension),
            angular_momentum: Vector::zeros(dimension),
        }
    }

    /// `self + h * rate`, component by component.
    fn advance(&self, rate: &Derivative, h: f64) -> Result<Self, MathError> {
        Ok(Self {
            position: self.position.add(&rate.velocity.multiply(h))?,
            orientation: self.orientation + rate.spin * h,
            linear_momentum: self.linear_momentum.add(&rate.force.multiply(h))?,
            angular_momentum: self.angular_momentum.add(&rate.torque.multiply(h))?,
        })
    }
}

/// Quantities recomputed from a `BodyState`, never integrated on their own.
#[derive(Debug, Clone, PartialEq)]
pub struct Derived {
    pub rotation: Matrix,
    pub linear_velocity: Vector,
    pub angular_velocity: Vector,
}

impl Derived {
    /// Identity rotation and zero velocities.
    pub fn at_rest(dimension: usize) -> Self {
        Self {
            rotation: Matrix::identity(dimension),
            linear_velocity: Vector::zeros(dimension),
            angular_velocity: Vector::zeros(dimension),
        }
    }
}

/// Rate of change of every component of a `BodyState`.
#[derive(Debug, Clone)]
struct Derivative {
    velocity: Vector,
    spin: Quaternion,
    force: Vector,
    torque: Vector,
}

impl Derivative {
    /// `(k1 + 2*k2 + 2*k3 + k4) / 6`
    fn weighted(k1: &Self, k2: &Self, k3: &Self, k4: &Self) -> Result<Self, MathError> {
        let blend = |a: &Vector, b: &Vector, c: &Vector, d: &Vector| -> Result<Vector, MathError> {
            Ok(b.add(c)?.multiply(2.0).add(a)?.add(d)?.multiply(1.0 / 6.0))
        };
        Ok(Self {
            velocity: blend(&k1.velocity, &k2.velocity, &k3.velocity, &k4.velocity)?,
            spin: ((k2.spin + k3.spin) * 2.0 + k1.spin + k4.spin) * (1.0 / 6.0),
            force: blend(&k1.force, &k2.force, &k3.force, &k4.force)?,
            torque: blend(&k1.torque, &k2.torque, &k3.torque, &k4.torque)?,
        })
    }
}

/// Compute the rotation matrix and velocities of `state`.
///
/// - 3D: `R` from the (normalized) orientation, `W = R * I⁻¹ * Rᵀ * L`
/// - 2D: `R` is the 2x2 identity, so `W = I⁻¹ * L`
/// - no inertia tensor (point mass): `W = 0`
///
/// `V = P * inverse_mass` in every case.
pub fn derive_rotation_velocity(
    state: &BodyState,
    inverse_mass: f64,
    inverse_inertia: Option<&Matrix>,
) -> Result<Derived, MathError> {
    let dimension = state.position.len();
    let rotation = if dimension == 3 {
        state.orientation.to_rotation_matrix()?
    } else {
        Matrix::identity(dimension)
    };

    let linear_velocity = state.linear_momentum.multiply(inverse_mass);

    let angular_velocity = match inverse_inertia {
        Some(inverse_inertia) => rotation
            .multiply_matrix(inverse_inertia)?
            .multiply_matrix(&rotation.transpose())?
            .multiply_vector(&state.angular_momentum)?,
        None => Vector::zeros(state.angular_momentum.len()),
    };

    Ok(Derived {
        rotation,
        linear_velocity,
        angular_velocity,
    })
}

/// Mass properties and force laws of the body being integrated.
#[derive(Clone, Copy)]
pub struct BodyModel<'a> {
    pub inverse_mass: f64,
    pub inverse_inertia: Option<&'a Matrix>,
    pub force: &'a dyn ForceFunction,
    pub torque: &'a dyn ForceFunction,
}

impl BodyModel<'_> {
    pub fn derive(&self, state: &BodyState) -> Result<Derived, MathError> {
        derive_rotation_velocity(state, self.inverse_mass, self.inverse_inertia)
    }

    fn evaluate(&self, time: f64, state: &BodyState, derived: &Derived) -> Result<Derivative, MathError> {
        let snapshot = BodySnapshot {
            time,
            position: &state.position,
            orientation: &state.orientation,
            linear_momentum: &state.linear_momentum,
            angular_momentum: &state.angular_momentum,
            rotation: &derived.rotation,
            linear_velocity: &derived.linear_velocity,
            angular_velocity: &derived.angular_velocity,
        };
        Ok(Derivative {
            velocity: derived.linear_velocity.clone(),
            spin: state
                .orientation
                .multiply_vector(&derived.angular_velocity)?
                * 0.5,
            force: self.force.apply(&snapshot),
            torque: self.torque.apply(&snapshot),
        })
    }
}

/// New state and its derived quantities after one step.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrationResult {
    pub state: BodyState,
    pub derived: Derived,
}

/// Classical fixed-step fourth-order Runge-Kutta.
pub struct RungeKutta4;

impl RungeKutta4 {
    /// Advance `state` from time `t` by `dt`.
    ///
    /// `derived` must belong to `state`; it seeds the first stage.
    pub fn step(
        model: &BodyModel<'_>,
        state: &BodyState,
        derived: &Derived,
        t: f64,
        dt: f64,
    ) -> Result<IntegrationResult, MathError> {
        let half_dt = 0.5 * dt;

        // Stage 1: slope at the start
        let k1 = model.evaluate(t, state, derived)?;

        // Stage 2: midpoint using k1
        let s2 = state.advance(&k1, half_dt)?;
        let k2 = model.evaluate(t + half_dt, &s2, &model.derive(&s2)?)?;

        // Stage 3: midpoint using k2
        let s3 = state.advance(&k2, half_dt)?;
        let k3 = model.evaluate(t + half_dt, &s3, &model.derive(&s3)?)?;

        // Stage 4: endpoint using k3
        let s4 = state.advance(&k3, dt)?;
        let k4 = model.evaluate(t + dt, &s4, &model.derive(&s4)?)?;

        let next = state.advance(&Derivative::weighted(&k1, &k2, &k3, &k4)?, dt)?;
        let next_derived = model.derive(&next)?;

        Ok(IntegrationResult {
            state: next,
            derived: next_derived,
        })
    }

    /// Advance by `substeps` steps of `dt`, starting at time `t`.
    pub fn step_n(
        model: &BodyModel<'_>,
        state: &BodyState,
        derived: &Derived,
        t: f64,
        dt: f64,
        substeps: usize,
    ) -> Result<IntegrationResult, MathError> {
        let mut current = IntegrationResult {
            state: state.clone(),
            derived: derived.clone(),
        };
        for i in 0..substeps {
            current = Self::step(model, &current.state, &current.derived, t + i as f64 * dt, dt)?;
        }
        Ok(current)
    }
}

// =============================================================================
// Tests
// =============================================================================
