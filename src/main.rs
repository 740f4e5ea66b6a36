// main.rs — the verification harness.
//
// Fixed 64x64 configuration: fill A and B with deterministic patterns,
// multiply on the GPU, multiply sequentially on the CPU, compare, print
// one verdict line.
//
// Exit status: 0 when the run completes, whether or not the comparison
// was accurate (the verdict is reported on stdout, not through the exit
// code); 1 on any GPU pipeline failure.

use gemmcheck::gpu::device::{GpuDevice, GpuError};
use gemmcheck::gpu::matmul::GpuMatmul;
use gemmcheck::matrix::Matrix;
use gemmcheck::reference;

/// Side length of all four matrices (A, B, C, gold are square and equal).
const BLOCK_WIDTH: usize = 64;

fn main() {
    if let Err(e) = run() {
        eprintln!("[gemmcheck] fatal: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), GpuError> {
    let n = BLOCK_WIDTH;

    let a = Matrix::sequential_up(n, n);
    let b = Matrix::sequential_down(n, n, n as i32);

    println!("The dimensions of matrix 'A' are : {a}");
    println!("The dimensions of matrix 'B' are : {b}");
    println!("The dimensions of matrix 'C' are : {n} x {n}");
    println!("The dimensions of matrix 'gold' are : {n} x {n}");

    let gpu = GpuDevice::new()?;
    eprintln!("[gemmcheck] using {}", gpu.adapter_info);

    let kernel = GpuMatmul::new(&gpu)?;
    let c = kernel.multiply(&gpu, &a, &b)?;

    let gold = reference::multiply(&a, &b);
    let verdict = reference::compare(&gold, &c);
    println!("{verdict}");

    Ok(())
}
