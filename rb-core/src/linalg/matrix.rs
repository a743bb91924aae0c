//! Dense real matrices with runtime dimensions.

use serde::{Deserialize, Serialize};
use std::ops::Mul;

use super::{MathError, Vector};

/// A dense `rows x cols` grid stored row-major.
///
/// Dimensions are fixed at construction. Products check conformance and fail
/// with `MathError::InvalidArgument` instead of truncating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// A `rows x cols` matrix of zeros.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// The `n x n` identity.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.data[i * n + i] = 1.0;
        }
        m
    }

    /// Square matrix with `diagonal` on its diagonal and zeros elsewhere.
    pub fn from_diagonal(diagonal: &[f64]) -> Self {
        let n = diagonal.len();
        let mut m = Self::zeros(n, n);
        for (i, d) in diagonal.iter().enumerate() {
            m.data[i * n + i] = *d;
        }
        m
    }

    /// Build from rows. Every row must have the same length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, MathError> {
        let cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != cols) {
            return Err(MathError::invalid("matrix rows have different lengths"));
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data: rows.iter().flatten().copied().collect(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Copy of every row, top to bottom.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.rows)
            .map(|i| self.data[i * self.cols..(i + 1) * self.cols].to_vec())
            .collect()
    }

    fn offset(&self, row: usize, col: usize) -> Result<usize, MathError> {
        if row < self.rows && col < self.cols {
            Ok(row * self.cols + col)
        } else {
            Err(MathError::invalid(format!(
                "element ({}, {}) out of range for {}x{} matrix",
                row, col, self.rows, self.cols
            )))
        }
    }

    /// Element at (`row`, `col`).
    pub fn get(&self, row: usize, col: usize) -> Result<f64, MathError> {
        Ok(self.data[self.offset(row, col)?])
    }

    /// Overwrite the element at (`row`, `col`).
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<(), MathError> {
        let index = self.offset(row, col)?;
        self.data[index] = value;
        Ok(())
    }

    /// Same-shape matrix filled with 1.0.
    pub fn ones(&self) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: vec![1.0; self.data.len()],
        }
    }

    fn map(&self, op: impl Fn(f64) -> f64) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|v| op(*v)).collect(),
        }
    }

    /// Scale every element.
    pub fn multiply_scalar(&self, scalar: f64) -> Self {
        self.map(|v| v * scalar)
    }

    /// Divide every element. Zero and negative divisors fail, as for `Vector::divide`.
    pub fn divide(&self, scalar: f64) -> Result<Self, MathError> {
        if scalar > 0.0 {
            Ok(self.map(|v| v / scalar))
        } else {
            Err(MathError::DivideByZero { divisor: scalar })
        }
    }

    /// Element-wise reciprocal.
    ///
    /// Zero entries stay zero, so a diagonal matrix maps to its true inverse.
    /// Off-diagonal entries of a general matrix are inverted one by one,
    /// which is NOT the matrix inverse.
    pub fn reciprocal(&self) -> Self {
        self.map(|v| if v == 0.0 { 0.0 } else { 1.0 / v })
    }

    /// True when every off-diagonal element is zero.
    pub fn is_diagonal(&self) -> bool {
        (0..self.rows).all(|i| {
            (0..self.cols).all(|j| i == j || self.data[i * self.cols + j] == 0.0)
        })
    }

    /// Matrix-vector product. Requires `cols == vector.len()`.
    pub fn multiply_vector(&self, vector: &Vector) -> Result<Vector, MathError> {
        if vector.len() != self.cols {
            return Err(MathError::invalid(format!(
                "cannot multiply {}x{} matrix by vector of size {}",
                self.rows,
                self.cols,
                vector.len()
            )));
        }
        let v = vector.values();
        let values: Vec<f64> = (0..self.rows)
            .map(|i| {
                (0..self.cols)
                    .map(|j| self.data[i * self.cols + j] * v[j])
                    .sum()
            })
            .collect();
        Ok(Vector::from_values(values))
    }

    /// Matrix product `self * other`. Requires `self.cols == other.rows`.
    pub fn multiply_matrix(&self, other: &Self) -> Result<Self, MathError> {
        if self.cols != other.rows {
            return Err(MathError::invalid(format!(
                "cannot multiply {}x{} matrix by {}x{} matrix",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        let mut result = Self::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            for j in 0..other.cols {
                let mut sum = 0.0;
                for k in 0..self.cols {
                    sum += self.data[i * self.cols + k] * other.data[k * other.cols + j];
                }
                result.data[i * other.cols + j] = sum;
            }
        }
        Ok(result)
    }

    pub fn transpose(&self) -> Self {
        let mut result = Self::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                result.data[j * self.rows + i] = self.data[i * self.cols + j];
            }
        }
        result
    }
}

impl TryFrom<Vec<Vec<f64>>> for Matrix {
    type Error = MathError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Self::from_rows(&rows)
    }
}

impl From<Matrix> for Vec<Vec<f64>> {
    fn from(matrix: Matrix) -> Self {
        matrix.to_rows()
    }
}

impl Mul<f64> for &Matrix {
    type Output = Matrix;
    fn mul(self, scalar: f64) -> Matrix {
        self.multiply_scalar(scalar)
    }
}
