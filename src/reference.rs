// reference.rs — CPU gold computation and element-wise verification.
//
// The triple-loop multiply here is the correctness oracle for the GPU
// kernel. It is deliberately sequential and unoptimized: no blocking, no
// threads, no SIMD. Any cleverness added here would have to be validated
// against something else.
//
// Arithmetic uses wrapping_mul / wrapping_add. WGSL i32 arithmetic wraps
// natively, and so does release-mode Rust, but debug-mode Rust panics on
// overflow — the wrapping ops pin identical semantics in every build so
// the comparison never diverges on large inputs.

use std::fmt;

use crate::matrix::Matrix;

/// Multiply `a` (m x k) by `b` (k x n) on the CPU, returning the m x n
/// gold matrix.
///
/// # Panics
/// Panics if the contraction dimensions disagree (`a.cols() != b.rows()`).
pub fn multiply(a: &Matrix, b: &Matrix) -> Matrix {
    assert_eq!(
        a.cols(),
        b.rows(),
        "contraction dimension mismatch: A is {} x {}, B is {} x {}",
        a.rows(), a.cols(), b.rows(), b.cols(),
    );

    let m = a.rows();
    let k = a.cols();
    let n = b.cols();

    let a_data = a.as_slice();
    let b_data = b.as_slice();
    let mut out = vec![0i32; m * n];

    for i in 0..m {
        for j in 0..n {
            let mut value = 0i32;
            for kk in 0..k {
                value = value.wrapping_add(
                    a_data[i * k + kk].wrapping_mul(b_data[kk * n + j]),
                );
            }
            out[i * n + j] = value;
        }
    }

    Matrix::from_vec(m, n, out)
}

/// Outcome of comparing the GPU result against the gold matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Every element matched exactly.
    Accurate,
    /// First differing element, in flat row-major index order.
    Mismatch {
        index: usize,
        expected: i32,
        actual: i32,
    },
}

impl Verdict {
    pub fn is_accurate(&self) -> bool {
        matches!(self, Verdict::Accurate)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Accurate => write!(
                f,
                "Comparison of CPU and GPU matrix multiplication is accurate."
            ),
            Verdict::Mismatch { index, expected, actual } => write!(
                f,
                "Comparison of CPU and GPU matrix multiplication is not accurate \
                 at array index {index} (expected {expected}, got {actual})"
            ),
        }
    }
}

/// Compare the GPU result against the gold matrix, element by element in
/// flat row-major order. Exact integer equality; stops at the first
/// mismatch.
///
/// # Panics
/// Panics if the two matrices have different dimensions — that is a
/// harness bug, not a kernel inaccuracy.
pub fn compare(gold: &Matrix, actual: &Matrix) -> Verdict {
    assert_eq!(gold.rows(), actual.rows(), "gold/actual row count differs");
    assert_eq!(gold.cols(), actual.cols(), "gold/actual column count differs");

    for (i, (&g, &a)) in gold.as_slice().iter().zip(actual.as_slice()).enumerate() {
        if g != a {
            return Verdict::Mismatch {
                index: i,
                expected: g,
                actual: a,
            };
        }
    }
    Verdict::Accurate
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_multiply() {
        // I * M = M for the 2x2 identity.
        let ident = Matrix::from_vec(2, 2, vec![1, 0, 0, 1]);
        let m = Matrix::from_vec(2, 2, vec![7, -3, 2, 9]);
        let product = multiply(&ident, &m);
        assert_eq!(product.as_slice(), m.as_slice());
    }

    #[test]
    fn test_known_2x2_product() {
        // The canonical fill patterns at dimension 2:
        //   A = [[1, 2], [3, 4]]   (sequential_up)
        //   B = [[2, 1], [0, -1]]  (sequential_down, start = 2)
        //   A * B = [[2, -1], [6, -1]]
        let a = Matrix::sequential_up(2, 2);
        let b = Matrix::sequential_down(2, 2, 2);
        let c = multiply(&a, &b);
        assert_eq!(c.as_slice(), &[2, -1, 6, -1]);
    }

    #[test]
    fn test_rectangular_product() {
        // (2x3) * (3x2) = 2x2.
        let a = Matrix::from_vec(2, 3, vec![1, 2, 3, 4, 5, 6]);
        let b = Matrix::from_vec(3, 2, vec![7, 8, 9, 10, 11, 12]);
        let c = multiply(&a, &b);
        assert_eq!(c.rows(), 2);
        assert_eq!(c.cols(), 2);
        assert_eq!(c.as_slice(), &[58, 64, 139, 154]);
    }

    #[test]
    #[should_panic(expected = "contraction dimension mismatch")]
    fn test_contraction_mismatch_panics() {
        let a = Matrix::new(2, 3);
        let b = Matrix::new(2, 2);
        let _ = multiply(&a, &b);
    }

    #[test]
    fn test_multiply_wraps_on_overflow() {
        // i32::MAX * 2 wraps to -2 under two's complement; both factors of
        // the single inner product term.
        let a = Matrix::from_vec(1, 1, vec![i32::MAX]);
        let b = Matrix::from_vec(1, 1, vec![2]);
        let c = multiply(&a, &b);
        assert_eq!(c.as_slice(), &[i32::MAX.wrapping_mul(2)]);
    }

    #[test]
    fn test_compare_accurate() {
        let gold = Matrix::sequential_up(4, 4);
        let actual = gold.clone();
        assert_eq!(compare(&gold, &actual), Verdict::Accurate);
    }

    #[test]
    fn test_compare_reports_first_mismatch() {
        let gold = Matrix::sequential_up(3, 3);
        let mut actual = gold.clone();
        // Perturb flat indices 4 and 7; only the first must be reported.
        actual.set(1, 1, -999);
        actual.set(2, 1, -999);
        match compare(&gold, &actual) {
            Verdict::Mismatch { index, expected, actual } => {
                assert_eq!(index, 4);
                assert_eq!(expected, 5);
                assert_eq!(actual, -999);
            }
            Verdict::Accurate => panic!("perturbed matrix compared accurate"),
        }
    }

    #[test]
    fn test_verdict_display() {
        assert!(Verdict::Accurate.to_string().ends_with("is accurate."));
        let v = Verdict::Mismatch { index: 17, expected: 3, actual: 4 };
        let s = v.to_string();
        assert!(s.contains("not accurate at array index 17"), "got: {s}");
    }
}
