// matrix.rs — Runtime-sized host matrix of i32, row-major.
//
// Memory layout: a flat Vec<i32> of length rows * cols, row-major, no
// padding. Element (r, c) lives at index r * cols + c. The same flat
// layout is what gets uploaded to the GPU, so the "flat index" reported
// by the verifier on a mismatch is meaningful on both sides.
//
// The element type is fixed to i32: the kernel does integer arithmetic
// with native wrap-around semantics, and the verifier compares with exact
// equality (no epsilon). A float variant would need a tolerance-based
// comparison and is a different harness.

use std::fmt;

/// A 2D matrix of `i32` with runtime dimensions, stored row-major.
#[derive(Debug)]
pub struct Matrix {
    /// Element data, length = rows * cols.
    data: Vec<i32>,
    rows: usize,
    cols: usize,
}

// Clone is a deep copy of the heap data; implemented manually to say so.
impl Clone for Matrix {
    fn clone(&self) -> Self {
        Matrix {
            data: self.data.clone(),
            rows: self.rows,
            cols: self.cols,
        }
    }
}

impl Matrix {
    // --- Constructors ---

    /// Create a zero-filled matrix with the given dimensions.
    pub fn new(rows: usize, cols: usize) -> Self {
        Matrix {
            data: vec![0; rows * cols],
            rows,
            cols,
        }
    }

    /// Create a matrix from an existing flat row-major vector.
    ///
    /// # Panics
    /// Panics if `data.len() != rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<i32>) -> Self {
        assert_eq!(
            data.len(),
            rows * cols,
            "data length ({}) must equal rows * cols ({})",
            data.len(),
            rows * cols,
        );
        Matrix { data, rows, cols }
    }

    /// Deterministic ascending fill: element at flat index i holds `1 + i`.
    ///
    ///   1  2  3
    ///   4  5  6
    pub fn sequential_up(rows: usize, cols: usize) -> Self {
        let data = (0..rows * cols).map(|i| 1 + i as i32).collect();
        Matrix { data, rows, cols }
    }

    /// Deterministic descending fill: element at flat index i holds
    /// `start - i`. With `start` equal to the matrix dimension this is the
    /// harness's canonical B pattern (values run down through zero into
    /// negatives for any matrix larger than start elements).
    pub fn sequential_down(rows: usize, cols: usize, start: i32) -> Self {
        let data = (0..rows * cols).map(|i| start - i as i32).collect();
        Matrix { data, rows, cols }
    }

    // --- Accessors ---

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total element count (rows * cols).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Size of the element data in bytes. A device buffer holding this
    /// matrix must be exactly this many bytes.
    pub fn byte_size(&self) -> usize {
        self.data.len() * std::mem::size_of::<i32>()
    }

    /// Read element (r, c).
    ///
    /// # Panics
    /// Panics (via slice indexing) if out of bounds.
    #[inline]
    pub fn get(&self, r: usize, c: usize) -> i32 {
        debug_assert!(r < self.rows && c < self.cols,
            "index ({r}, {c}) out of bounds for {} x {}", self.rows, self.cols);
        self.data[r * self.cols + c]
    }

    /// Write element (r, c).
    #[inline]
    pub fn set(&mut self, r: usize, c: usize, v: i32) {
        debug_assert!(r < self.rows && c < self.cols,
            "index ({r}, {c}) out of bounds for {} x {}", self.rows, self.cols);
        self.data[r * self.cols + c] = v;
    }

    /// The flat row-major element slice. This is the exact byte image
    /// uploaded to (and read back from) the GPU.
    pub fn as_slice(&self) -> &[i32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [i32] {
        &mut self.data
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {}", self.rows, self.cols)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
