//! Matrix type for 2D numeric data.

use super::Vector;
use serde::{Deserialize, Serialize};

/// A 2D matrix of floating-point values (row-major storage).
///
/// Backs the user×item interaction table and the per-item term-vector
/// rows. Unlike a general linear-algebra matrix it supports in-place
/// structural growth (`append_row`, `append_col`) so the collaborative
/// filter can absorb new users and items without a rebuild.
///
/// # Examples
///
/// ```
/// use recomendar::primitives::Matrix;
///
/// let m = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).expect("2*3 elements");
/// assert_eq!(m.shape(), (2, 3));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Matrix<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T: Copy> Matrix<T> {
    /// Creates a new matrix from a vector of data.
    ///
    /// # Errors
    ///
    /// Returns an error if data length doesn't match rows * cols.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Result<Self, &'static str> {
        if data.len() != rows * cols {
            return Err("data length must equal rows * cols");
        }
        Ok(Self { data, rows, cols })
    }

    /// Returns the shape as (rows, cols).
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.cols
    }

    /// Gets element at (row, col).
    ///
    /// # Panics
    ///
    /// Panics if indices are out of bounds.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> T {
        assert!(row < self.rows && col < self.cols, "index out of bounds");
        self.data[row * self.cols + col]
    }

    /// Sets element at (row, col).
    ///
    /// # Panics
    ///
    /// Panics if indices are out of bounds.
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        assert!(row < self.rows && col < self.cols, "index out of bounds");
        self.data[row * self.cols + col] = value;
    }

    /// Returns a row as a slice (contiguous in row-major storage).
    #[must_use]
    pub fn row_slice(&self, row_idx: usize) -> &[T] {
        let start = row_idx * self.cols;
        &self.data[start..start + self.cols]
    }

    /// Returns a row as a Vector.
    #[must_use]
    pub fn row(&self, row_idx: usize) -> Vector<T> {
        Vector::from_slice(self.row_slice(row_idx))
    }

    /// Returns the underlying data as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl Matrix<f32> {
    /// Creates a matrix of zeros.
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![0.0; rows * cols],
            rows,
            cols,
        }
    }

    /// Appends a zero row, returning its index.
    pub fn append_row(&mut self) -> usize {
        self.data.extend(std::iter::repeat(0.0).take(self.cols));
        self.rows += 1;
        self.rows - 1
    }

    /// Appends a zero column, returning its index.
    ///
    /// Row-major storage means every row shifts; cost is O(rows * cols).
    pub fn append_col(&mut self) -> usize {
        let new_cols = self.cols + 1;
        let mut data = Vec::with_capacity(self.rows * new_cols);
        for row in 0..self.rows {
            data.extend_from_slice(&self.data[row * self.cols..(row + 1) * self.cols]);
            data.push(0.0);
        }
        self.data = data;
        self.cols = new_cols;
        self.cols - 1
    }

    /// Fraction of zero cells. 1.0 for an empty matrix.
    #[must_use]
    pub fn sparsity(&self) -> f32 {
        if self.data.is_empty() {
            return 1.0;
        }
        let zeros = self.data.iter().filter(|v| **v == 0.0).count();
        zeros as f32 / self.data.len() as f32
    }
}
