//! Orientation quaternions.
//!
//! Stored as `[w, x, y, z]` with `w` the scalar part. Arithmetic never
//! renormalizes: the integrator accumulates an un-normalized quaternion
//! derivative, and callers that need a unit orientation call `unit()`.
//!
//! ## Rotation matrix convention
//!
//! Right-handed, column vectors, for a unit quaternion:
//!
//! ```text
//! | 1-2(y²+z²)   2(xy-zw)     2(xz+yw)   |
//! | 2(xy+zw)     1-2(x²+z²)   2(yz-xw)   |
//! | 2(xz-yw)     2(yz+xw)     1-2(x²+y²) |
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

use super::{MathError, Matrix, Vector};

/// A quaternion `w + xi + yj + zk`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quaternion {
    pub const IDENTITY: Quaternion = Quaternion {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const ZERO: Quaternion = Quaternion {
        w: 0.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// Pure quaternion `[0, v]` from a 2D or 3D vector.
    ///
    /// A 2D vector lands in the x/y components with z = 0.
    pub fn from_pure(v: &Vector) -> Result<Self, MathError> {
        match v.values() {
            [x, y] => Ok(Self::new(0.0, *x, *y, 0.0)),
            [x, y, z] => Ok(Self::new(0.0, *x, *y, *z)),
            _ => Err(MathError::invalid(format!(
                "pure quaternion needs a 2D or 3D vector, got size {}",
                v.len()
            ))),
        }
    }

    /// Components as `[w, x, y, z]`.
    pub fn to_array(self) -> [f64; 4] {
        [self.w, self.x, self.y, self.z]
    }

    /// The underlying 4-vector `[w, x, y, z]`.
    pub fn as_vector(&self) -> Vector {
        Vector::from(self.to_array())
    }

    pub fn length(&self) -> f64 {
        self.as_vector().length()
    }

    /// Unit quaternion, delegating to vector normalization.
    ///
    /// Fails with `InvalidArgument` on the zero quaternion.
    pub fn unit(&self) -> Result<Self, MathError> {
        Self::try_from(self.as_vector().unit()?)
    }

    /// Hamilton product `self ⊗ other`.
    pub fn multiply(&self, other: &Self) -> Self {
        let (w0, x0, y0, z0) = (self.w, self.x, self.y, self.z);
        let (w1, x1, y1, z1) = (other.w, other.x, other.y, other.z);
        Self {
            w: w0 * w1 - x0 * x1 - y0 * y1 - z0 * z1,
            x: w0 * x1 + x0 * w1 + y0 * z1 - z0 * y1,
            y: w0 * y1 + y0 * w1 + z0 * x1 - x0 * z1,
            z: w0 * z1 + z0 * w1 + x0 * y1 - y0 * x1,
        }
    }

    /// Multiply by a vector promoted to a quaternion.
    ///
    /// A 4-vector is read as `[w, x, y, z]`; 2D and 3D vectors become pure
    /// quaternions (see `from_pure`). Any other size is rejected.
    pub fn multiply_vector(&self, v: &Vector) -> Result<Self, MathError> {
        let other = match v.len() {
            4 => Self::try_from(v.clone())?,
            _ => Self::from_pure(v)?,
        };
        Ok(self.multiply(&other))
    }

    pub fn multiply_scalar(&self, scalar: f64) -> Self {
        Self {
            w: self.w * scalar,
            x: self.x * scalar,
            y: self.y * scalar,
            z: self.z * scalar,
        }
    }

    /// Rotation matrix of the normalized quaternion.
    pub fn to_rotation_matrix(&self) -> Result<Matrix, MathError> {
        let mut r = Matrix::zeros(3, 3);
        self.write_rotation_matrix(&mut r)?;
        Ok(r)
    }

    /// Fill a pre-sized 3x3 `target` with the rotation matrix.
    ///
    /// The quaternion is normalized first, so an accumulated orientation
    /// still yields an orthonormal matrix. Fails with `InvalidArgument` when
    /// `target` is not 3x3 or the quaternion is zero.
    pub fn write_rotation_matrix(&self, target: &mut Matrix) -> Result<(), MathError> {
        if target.shape() != (3, 3) {
            return Err(MathError::invalid(format!(
                "rotation matrix target must be 3x3, got {}x{}",
                target.rows(),
                target.cols()
            )));
        }
        let Quaternion { w, x, y, z } = self.unit()?;

        let entries = [
            [
                1.0 - 2.0 * y * y - 2.0 * z * z,
                2.0 * x * y - 2.0 * z * w,
                2.0 * x * z + 2.0 * y * w,
            ],
            [
                2.0 * x * y + 2.0 * z * w,
                1.0 - 2.0 * x * x - 2.0 * z * z,
                2.0 * y * z - 2.0 * x * w,
            ],
            [
                2.0 * x * z - 2.0 * y * w,
                2.0 * y * z + 2.0 * x * w,
                1.0 - 2.0 * x * x - 2.0 * y * y,
            ],
        ];
        for (i, row) in entries.iter().enumerate() {
            for (j, value) in row.iter().enumerate() {
                target.set(i, j, *value)?;
            }
        }
        Ok(())
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<[f64; 4]> for Quaternion {
    fn from([w, x, y, z]: [f64; 4]) -> Self {
        Self { w, x, y, z }
    }
}

impl From<Quaternion> for [f64; 4] {
    fn from(q: Quaternion) -> Self {
        q.to_array()
    }
}

impl TryFrom<Vector> for Quaternion {
    type Error = MathError;

    fn try_from(v: Vector) -> Result<Self, Self::Error> {
        match v.values() {
            [w, x, y, z] => Ok(Self::new(*w, *x, *y, *z)),
            _ => Err(MathError::invalid(format!(
                "quaternion needs exactly 4 components, got {}",
                v.len()
            ))),
        }
    }
}

impl Quaternion {
    /// Combine matching `[w, x, y, z]` components, as on the underlying 4-vector.
    fn zip_with(self, other: Self, op: impl Fn(f64, f64) -> f64) -> Self {
        let (a, b) = (self.to_array(), other.to_array());
        Self::from(std::array::from_fn::<f64, 4, _>(|i| op(a[i], b[i])))
    }
}

impl Add for Quaternion {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        self.zip_with(other, |a, b| a + b)
    }
}

impl Sub for Quaternion {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        self.zip_with(other, |a, b| a - b)
    }
}

impl Mul for Quaternion {
    type Output = Self;
    fn mul(self, other: Self) -> Self {
        self.multiply(&other)
    }
}

impl Mul<f64> for Quaternion {
    type Output = Self;
    fn mul(self, scalar: f64) -> Self {
        self.multiply_scalar(scalar)
    }
}
