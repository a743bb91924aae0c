//! Force and torque functions driving a rigid body.
//!
//! A body carries one function for force (rate of change of linear momentum)
//! and one for torque (rate of change of angular momentum). The integrator
//! evaluates both four times per step, each time with a different RK4 stage
//! state and the rotation matrix and velocities derived from that stage.
//!
//! ## Stock functions
//!
//! - **ZeroForce**: free body, returns a zero vector of the stage dimension
//! - **ConstantForce**: fixed vector, e.g. uniform gravity `m * g`
//! - **SpringForce**: Hooke spring along x anchored at a point
//! - **LinearDamping**: viscous drag `-c * v` using the stage velocity
//! - **ForceSum**: sum of several functions
//!
//! Any closure `Fn(&BodySnapshot) -> Vector` is also a force function;
//! `force_fn` pins the closure signature:
//!
//! ```
//! use rb_core::forces::{force_fn, ForceFunction};
//! use rb_core::linalg::Vector;
//!
//! // 10 N along x for the first second, then nothing
//! let pulse = force_fn(|s| {
//!     if s.time < 1.0 {
//!         Vector::new2(10.0, 0.0)
//!     } else {
//!         Vector::zeros(s.dimension())
//!     }
//! });
//! # fn takes(_: impl ForceFunction) {}
//! # takes(pulse);
//! ```

use crate::linalg::{Matrix, Quaternion, Vector};

/// Instantaneous state handed to a force or torque function.
///
/// During a step these are the intermediate RK4 stage values, never the
/// body's persistent state.
#[derive(Debug, Clone, Copy)]
pub struct BodySnapshot<'a> {
    pub time: f64,
    pub position: &'a Vector,
    pub orientation: &'a Quaternion,
    pub linear_momentum: &'a Vector,
    pub angular_momentum: &'a Vector,
    pub rotation: &'a Matrix,
    pub linear_velocity: &'a Vector,
    pub angular_velocity: &'a Vector,
}

impl BodySnapshot<'_> {
    /// Dimension of the body (2 or 3).
    pub fn dimension(&self) -> usize {
        self.position.len()
    }
}

/// A force or torque law.
///
/// Must return a vector with the same size as `snapshot.position`; the
/// integrator reports any other size as an invalid argument.
pub trait ForceFunction: Send + Sync {
    fn apply(&self, snapshot: &BodySnapshot<'_>) -> Vector;
}

impl<F> ForceFunction for F
where
    F: Fn(&BodySnapshot<'_>) -> Vector + Send + Sync,
{
    fn apply(&self, snapshot: &BodySnapshot<'_>) -> Vector {
        self(snapshot)
    }
}

/// Identity helper giving a closure the higher-ranked signature expected
/// by `ForceFunction`.
pub fn force_fn<F>(f: F) -> F
where
    F: Fn(&BodySnapshot<'_>) -> Vector + Send + Sync,
{
    f
}

/// No force at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroForce;

impl ForceFunction for ZeroForce {
    fn apply(&self, snapshot: &BodySnapshot<'_>) -> Vector {
        Vector::zeros(snapshot.dimension())
    }
}

/// The same vector at every instant.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantForce(pub Vector);

impl ForceFunction for ConstantForce {
    fn apply(&self, _snapshot: &BodySnapshot<'_>) -> Vector {
        self.0.clone()
    }
}

/// Linear spring acting along the x axis.
///
/// `F_x = -k * (x - anchor - rest_length)`, other components zero. The spring
/// cannot be compressed past its anchor: a stage position below the anchor
/// is evaluated as the anchor itself. The snapshot is never modified.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringForce {
    /// Spring constant k in N/m.
    pub stiffness: f64,
    pub rest_length: f64,
    /// x coordinate of the fixed end.
    pub anchor: f64,
}

impl SpringForce {
    pub fn new(stiffness: f64, rest_length: f64, anchor: f64) -> Self {
        Self {
            stiffness,
            rest_length,
            anchor,
        }
    }

    /// Angular frequency `sqrt(k / m)` of the undamped oscillation.
    pub fn angular_frequency(&self, mass: f64) -> f64 {
        (self.stiffness / mass).sqrt()
    }

    /// Position where the spring exerts no force.
    pub fn equilibrium(&self) -> f64 {
        self.anchor + self.rest_length
    }
}

impl ForceFunction for SpringForce {
    fn apply(&self, snapshot: &BodySnapshot<'_>) -> Vector {
        let mut values = vec![0.0; snapshot.dimension()];
        if let (Some(fx), Some(&x)) = (values.first_mut(), snapshot.position.values().first()) {
            *fx = -self.stiffness * (x.max(self.anchor) - self.equilibrium());
        }
        Vector::from_values(values)
    }
}

/// Viscous damping opposing the stage's linear velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearDamping {
    /// Damping coefficient c in N·s/m.
    pub coefficient: f64,
}

impl ForceFunction for LinearDamping {
    fn apply(&self, snapshot: &BodySnapshot<'_>) -> Vector {
        snapshot.linear_velocity.multiply(-self.coefficient)
    }
}

/// Sum of several force functions.
///
/// A term returning a vector of the wrong size is not dropped: the sum
/// returns that term's vector as-is, so the integrator rejects it.
#[derive(Default)]
pub struct ForceSum {
    terms: Vec<Box<dyn ForceFunction>>,
}

impl ForceSum {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a term (builder style).
    #[must_use]
    pub fn with(mut self, term: impl ForceFunction + 'static) -> Self {
        self.terms.push(Box::new(term));
        self
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

impl ForceFunction for ForceSum {
    fn apply(&self, snapshot: &BodySnapshot<'_>) -> Vector {
        let mut total = Vector::zeros(snapshot.dimension());
        for term in &self.terms {
            let value = term.apply(snapshot);
            match total.add(&value) {
                Ok(sum) => total = sum,
                Err(_) => return value,
            }
        }
        total
    }
}

impl std::fmt::Debug for ForceSum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForceSum")
            .field("terms", &self.terms.len())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
