//! Fixed-size real vectors.
//!
//! The size is chosen at construction and never changes. Binary operations
//! require both operands to have the same size and report a mismatch as
//! `MathError::InvalidArgument`.

use serde::{Deserialize, Serialize};
use std::ops::{Mul, Neg};

use super::MathError;

// =============================================================================
// Vector
// =============================================================================

/// An ordered tuple of real numbers used for positions, momenta and velocities.
///
/// Index 0 is the x axis, 1 the y axis and so on. Two vectors are equal when
/// they have the same size and identical components.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vector {
    values: Vec<f64>,
}

impl Vector {
    /// A vector of `size` zeros.
    pub fn zeros(size: usize) -> Self {
        Self {
            values: vec![0.0; size],
        }
    }

    /// Build a vector from its components.
    pub fn from_values(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
        }
    }

    pub fn new2(x: f64, y: f64) -> Self {
        Self::from_values([x, y])
    }

    pub fn new3(x: f64, y: f64, z: f64) -> Self {
        Self::from_values([x, y, z])
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All components, x first.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Component at `index`.
    pub fn get(&self, index: usize) -> Result<f64, MathError> {
        self.values.get(index).copied().ok_or_else(|| {
            MathError::invalid(format!(
                "index {} out of range for vector of size {}",
                index,
                self.len()
            ))
        })
    }

    /// Overwrite the component at `index`.
    pub fn set(&mut self, index: usize, value: f64) -> Result<(), MathError> {
        let size = self.len();
        match self.values.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(MathError::invalid(format!(
                "index {} out of range for vector of size {}",
                index, size
            ))),
        }
    }

    /// Overwrite every component. `values` must have the same size.
    pub fn set_values(&mut self, values: &[f64]) -> Result<(), MathError> {
        if values.len() != self.len() {
            return Err(MathError::invalid(format!(
                "cannot assign {} values to vector of size {}",
                values.len(),
                self.len()
            )));
        }
        self.values.copy_from_slice(values);
        Ok(())
    }

    fn check_same_size(&self, other: &Self) -> Result<(), MathError> {
        if self.len() == other.len() {
            Ok(())
        } else {
            Err(MathError::invalid(format!(
                "vector size mismatch: {} vs {}",
                self.len(),
                other.len()
            )))
        }
    }

    fn zip_with(&self, other: &Self, op: impl Fn(f64, f64) -> f64) -> Result<Self, MathError> {
        self.check_same_size(other)?;
        Ok(Self {
            values: self
                .values
                .iter()
                .zip(&other.values)
                .map(|(a, b)| op(*a, *b))
                .collect(),
        })
    }

    fn map(&self, op: impl Fn(f64) -> f64) -> Self {
        Self {
            values: self.values.iter().map(|v| op(*v)).collect(),
        }
    }

    /// Component-wise sum.
    pub fn add(&self, other: &Self) -> Result<Self, MathError> {
        self.zip_with(other, |a, b| a + b)
    }

    /// Component-wise difference `self - other`.
    pub fn subtract(&self, other: &Self) -> Result<Self, MathError> {
        self.zip_with(other, |a, b| a - b)
    }

    /// Scale every component.
    pub fn multiply(&self, scalar: f64) -> Self {
        self.map(|v| v * scalar)
    }

    /// Divide every component by `scalar`.
    ///
    /// Only strictly positive divisors are accepted: zero and negative
    /// scalars both fail with `DivideByZero`.
    pub fn divide(&self, scalar: f64) -> Result<Self, MathError> {
        if scalar > 0.0 {
            Ok(self.map(|v| v / scalar))
        } else {
            Err(MathError::DivideByZero { divisor: scalar })
        }
    }

    /// Dot product
    pub fn dot(&self, other: &Self) -> Result<f64, MathError> {
        self.check_same_size(other)?;
        Ok(self.values.iter().zip(&other.values).map(|(a, b)| a * b).sum())
    }

    /// Cross product of two 2D or two 3D vectors.
    ///
    /// The 2D form embeds both operands in the z = 0 plane and returns the
    /// 3-vector `[0, 0, x*y' - y*x']`.
    pub fn cross(&self, other: &Self) -> Result<Self, MathError> {
        self.check_same_size(other)?;
        let a = &self.values;
        let b = &other.values;
        match self.len() {
            3 => Ok(Self::new3(
                a[1] * b[2] - a[2] * b[1],
                a[2] * b[0] - a[0] * b[2],
                a[0] * b[1] - a[1] * b[0],
            )),
            2 => Ok(Self::new3(0.0, 0.0, a[0] * b[1] - a[1] * b[0])),
            n => Err(MathError::invalid(format!(
                "cross product needs 2D or 3D vectors, got size {}",
                n
            ))),
        }
    }

    /// Unit vector along the cross product.
    pub fn unit_cross(&self, other: &Self) -> Result<Self, MathError> {
        self.cross(other)?.unit()
    }

    /// Squared length (avoids sqrt for comparisons)
    pub fn squared_length(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum()
    }

    pub fn length(&self) -> f64 {
        self.squared_length().sqrt()
    }

    /// Vector of length one in the same direction.
    ///
    /// Fails with `InvalidArgument` when the length is exactly zero. There is
    /// no tolerance: tiny non-zero vectors are still normalized.
    pub fn unit(&self) -> Result<Self, MathError> {
        let length = self.length();
        if length == 0.0 {
            return Err(MathError::invalid("cannot normalize a zero-length vector"));
        }
        Ok(self.map(|v| v / length))
    }

    /// 2D perpendicular: `(x, y) -> (y, -x)`, a quarter turn clockwise.
    pub fn perpendicular(&self) -> Result<Self, MathError> {
        match self.values.as_slice() {
            [x, y] => Ok(Self::new2(*y, -*x)),
            _ => Err(MathError::invalid(format!(
                "perpendicular needs a 2D vector, got size {}",
                self.len()
            ))),
        }
    }

    pub fn unit_perpendicular(&self) -> Result<Self, MathError> {
        self.perpendicular()?.unit()
    }

    /// 3D perpendicular to both `self` and `other`, which is their cross product.
    pub fn perpendicular_to(&self, other: &Self) -> Result<Self, MathError> {
        if self.len() != 3 {
            return Err(MathError::invalid(format!(
                "perpendicular_to needs 3D vectors, got size {}",
                self.len()
            )));
        }
        self.cross(other)
    }

    pub fn unit_perpendicular_to(&self, other: &Self) -> Result<Self, MathError> {
        self.perpendicular_to(other)?.unit()
    }

    /// Gram-Schmidt on two non-parallel 2D vectors.
    ///
    /// Returns `[u0, u1]` where `u0` is `v0` normalized and `u1` is the unit
    /// component of `v1` orthogonal to `u0`.
    pub fn orthonormalize(v0: &Self, v1: &Self) -> Result<[Self; 2], MathError> {
        if v0.len() != v1.len() || v0.len() != 2 {
            return Err(MathError::invalid(format!(
                "orthonormalize needs two 2D vectors, got sizes {} and {}",
                v0.len(),
                v1.len()
            )));
        }
        let u0 = v0.unit()?;
        let u1 = v1.subtract(&u0.multiply(u0.dot(v1)?))?.unit()?;
        Ok([u0, u1])
    }
}

impl From<Vec<f64>> for Vector {
    fn from(values: Vec<f64>) -> Self {
        Self { values }
    }
}

impl<const N: usize> From<[f64; N]> for Vector {
    fn from(values: [f64; N]) -> Self {
        Self {
            values: values.to_vec(),
        }
    }
}

impl Mul<f64> for &Vector {
    type Output = Vector;
    fn mul(self, scalar: f64) -> Vector {
        self.multiply(scalar)
    }
}

impl Neg for &Vector {
    type Output = Vector;
    fn neg(self) -> Vector {
        self.map(|v| -v)
    }
}

// =============================================================================
// Tests
// =============================================================================
