// tests/test_matrix.rs — Integration tests for the Matrix container.
//
// These run with `cargo test --test test_matrix` and only touch the
// crate's public API.

use gemmcheck::matrix::Matrix;

// ===== Construction & layout =====

#[test]
fn matrix_new_zero_initialized() {
    let m = Matrix::new(10, 7);
    assert_eq!(m.rows(), 10);
    assert_eq!(m.cols(), 7);
    assert_eq!(m.len(), 70);
    assert_eq!(m.get(0, 0), 0);
    assert_eq!(m.get(9, 6), 0);
}

#[test]
fn matrix_set_get_consistency() {
    let mut m = Matrix::new(5, 5);
    for r in 0..5 {
        for c in 0..5 {
            m.set(r, c, (r * 10 + c) as i32);
        }
    }
    for r in 0..5 {
        for c in 0..5 {
            assert_eq!(m.get(r, c), (r * 10 + c) as i32, "mismatch at ({r}, {c})");
        }
    }
}

#[test]
fn matrix_from_vec_row_major() {
    // 2 x 3:
    //   1 2 3
    //   4 5 6
    let m = Matrix::from_vec(2, 3, vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(m.get(0, 0), 1);
    assert_eq!(m.get(0, 2), 3);
    assert_eq!(m.get(1, 0), 4);
    assert_eq!(m.get(1, 2), 6);
    // Flat slice preserves the input ordering.
    assert_eq!(m.as_slice(), &[1, 2, 3, 4, 5, 6]);
}

#[test]
fn matrix_clone_is_deep() {
    let mut m = Matrix::sequential_up(3, 3);
    let snapshot = m.clone();
    m.set(1, 1, 0);
    assert_eq!(snapshot.get(1, 1), 5);
    assert_eq!(m.get(1, 1), 0);
}

#[test]
fn matrix_byte_size_matches_device_buffer_contract() {
    // 4 bytes per element, rows * cols elements: the exact size every
    // device buffer derived from this matrix must have.
    let m = Matrix::new(64, 64);
    assert_eq!(m.byte_size(), 64 * 64 * 4);
    let m = Matrix::new(3, 7);
    assert_eq!(m.byte_size(), 3 * 7 * 4);
}

#[test]
fn matrix_display_reports_dimensions() {
    let m = Matrix::new(64, 64);
    assert_eq!(m.to_string(), "64 x 64");
}

// ===== Deterministic fill patterns =====

#[test]
fn sequential_up_starts_at_one() {
    let m = Matrix::sequential_up(3, 4);
    assert_eq!(m.get(0, 0), 1);
    assert_eq!(m.get(0, 3), 4);
    assert_eq!(m.get(2, 3), 12);
}

#[test]
fn sequential_down_crosses_zero() {
    // start = 4 on a 3x4 matrix: 4, 3, ..., -6, -7.
    let m = Matrix::sequential_down(3, 4, 4);
    assert_eq!(m.get(0, 0), 4);
    assert_eq!(m.get(1, 0), 0);
    assert_eq!(m.get(2, 3), -7);
}

#[test]
fn fill_patterns_at_default_dimension() {
    // Spot-check the 64x64 default configuration.
    let a = Matrix::sequential_up(64, 64);
    let b = Matrix::sequential_down(64, 64, 64);
    assert_eq!(a.get(0, 0), 1);
    assert_eq!(a.get(63, 63), 64 * 64);
    assert_eq!(b.get(0, 0), 64);
    assert_eq!(b.get(63, 63), 64 - (64 * 64 - 1));
}
