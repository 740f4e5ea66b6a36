// gpu/mod.rs — wgpu-based device offload pipeline.
//
// Execution order for one verification run:
//
//   GpuDevice::new()          adapter discovery, device + queue
//   GpuMatmul::new()          WGSL compile, bind group layout, pipeline
//   GpuMatmul::multiply()     buffer staging → 2D dispatch → readback
//
// Every step returns Result; the first failure aborts the run and RAII
// drop releases everything acquired so far. There is no retry and no
// partial-success mode anywhere in this pipeline.

pub mod device;
pub mod matmul;
