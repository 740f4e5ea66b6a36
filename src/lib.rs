// gemmcheck: GPU matrix-multiplication correctness harness.
//
// The GPU computes C = A * B with a wgpu compute shader; the CPU computes
// the same product with a sequential triple loop ("gold"). The two results
// are compared element-for-element. The CPU implementation is the
// authoritative reference; the GPU path is the thing under test.

pub mod matrix;
pub mod reference;

pub mod gpu;
