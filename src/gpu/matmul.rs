// gpu/matmul.rs — the matrix-multiplication offload pipeline.
//
// STAGE ORDER (one `multiply` call):
//   1. dimension check            a.cols == b.rows
//   2. buffer staging             A, B uploaded at creation; C and the
//                                 readback buffer allocated empty
//   3. argument binding           one bind group: A, B, C, params uniform
//   4. dispatch + result copy     compute pass over a 2D grid, then
//                                 C -> readback copy, one queue submit
//   5. synchronize + readback     map_async + poll(Wait), cast to i32
//
// ERROR SCOPES:
// wgpu reports most failures through an uncaptured-error handler that
// panics by default. Each stage above runs inside a pushed error scope
// so its failure surfaces as the matching GpuError variant instead: a
// Validation scope around shader/pipeline creation catches WGSL
// diagnostics (the "build log"), an OutOfMemory scope around buffer
// creation catches allocation failure, and Validation scopes around
// bind-group creation and submit catch argument and dispatch errors.
//
// The A/B uploads are enqueued writes on the GPU timeline; nothing
// blocks until the readback map. The poll(Wait) before reading C is the
// single synchronization point, and the same-queue ordering guarantees
// the uploads and the dispatch have completed by then.

use std::mem;

use wgpu::util::DeviceExt;

use crate::gpu::device::{GpuDevice, GpuError};
use crate::matrix::Matrix;

// ---------------------------------------------------------------------------
// Uniform params (must match WGSL struct MatmulParams exactly)
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct MatmulParams {
    num_a_rows: u32,
    num_a_cols: u32,
    num_b_cols: u32,
    num_c_cols: u32,
}

// ---------------------------------------------------------------------------
// GpuMatmul
// ---------------------------------------------------------------------------

/// The compiled matmul kernel, bound to one [`GpuDevice`].
///
/// Create once per device; call [`multiply`](GpuMatmul::multiply) as many
/// times as needed. Invalid after the device it was built on is dropped
/// (the borrow in `multiply` enforces this at compile time).
pub struct GpuMatmul {
    pipeline: wgpu::ComputePipeline,
    bgl: wgpu::BindGroupLayout,
}

impl GpuMatmul {
    /// Compile the WGSL kernel and build the compute pipeline.
    ///
    /// # Errors
    /// [`GpuError::KernelBuild`] with the compiler diagnostic text if the
    /// shader fails to compile or the pipeline fails validation.
    pub fn new(gpu: &GpuDevice) -> Result<Self, GpuError> {
        let shader_src = include_str!("../shaders/matmul.wgsl")
            .replace("{{WG_X}}", &gpu.workgroup_size.x.to_string())
            .replace("{{WG_Y}}", &gpu.workgroup_size.y.to_string());

        gpu.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let shader = gpu.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("matmul.wgsl"),
            source: wgpu::ShaderSource::Wgsl(shader_src.into()),
        });

        let bgl = gpu.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("GpuMatmul BGL"),
            entries: &[
                // 0 — input matrix A (read-only storage)
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // 1 — input matrix B (read-only storage)
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // 2 — output matrix C (writable storage)
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // 3 — scalar dimensions uniform
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let pipeline_layout =
            gpu.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("GpuMatmul pipeline layout"),
                bind_group_layouts: &[&bgl],
                push_constant_ranges: &[],
            });

        let pipeline =
            gpu.device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label:               Some("matmul"),
                layout:              Some(&pipeline_layout),
                module:              &shader,
                entry_point:         "matmul",
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                cache:               None,
            });

        if let Some(e) = pollster::block_on(gpu.device.pop_error_scope()) {
            return Err(GpuError::KernelBuild(e.to_string()));
        }

        Ok(GpuMatmul { pipeline, bgl })
    }

    /// Multiply `a` (m x k) by `b` (k x n) on the GPU, returning the
    /// m x n product as a host matrix.
    ///
    /// # Errors
    /// Any stage failure aborts the call with the matching [`GpuError`]
    /// variant; resources acquired before the failure are released by
    /// drop, in reverse acquisition order.
    pub fn multiply(
        &self,
        gpu: &GpuDevice,
        a: &Matrix,
        b: &Matrix,
    ) -> Result<Matrix, GpuError> {
        if a.cols() != b.rows() {
            return Err(GpuError::DimensionMismatch {
                a_cols: a.cols(),
                b_rows: b.rows(),
            });
        }

        let num_a_rows = a.rows();
        let num_a_cols = a.cols();
        let num_b_cols = b.cols();
        // C inherits A's rows and B's columns; its row stride equals its
        // column count (flat, unpadded layout on both sides).
        let num_c_cols = num_b_cols;
        let c_size = (num_a_rows * num_c_cols * mem::size_of::<i32>()) as u64;

        // --- Buffer staging ---
        gpu.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);

        let a_buf = gpu.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label:    Some("GpuMatmul A"),
            contents: bytemuck::cast_slice(a.as_slice()),
            usage:    wgpu::BufferUsages::STORAGE,
        });
        let b_buf = gpu.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label:    Some("GpuMatmul B"),
            contents: bytemuck::cast_slice(b.as_slice()),
            usage:    wgpu::BufferUsages::STORAGE,
        });
        let c_buf = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label:              Some("GpuMatmul C"),
            size:               c_size,
            usage:              wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let params = MatmulParams {
            num_a_rows: num_a_rows as u32,
            num_a_cols: num_a_cols as u32,
            num_b_cols: num_b_cols as u32,
            num_c_cols: num_c_cols as u32,
        };
        let params_buf = gpu.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label:    Some("GpuMatmul params"),
            contents: bytemuck::bytes_of(&params),
            usage:    wgpu::BufferUsages::UNIFORM,
        });

        let readback = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label:              Some("GpuMatmul readback"),
            size:               c_size,
            usage:              wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        if let Some(e) = pollster::block_on(gpu.device.pop_error_scope()) {
            return Err(GpuError::Allocation(e.to_string()));
        }

        // --- Argument binding ---
        gpu.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label:  Some("GpuMatmul BG"),
            layout: &self.bgl,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: a_buf.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: b_buf.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: c_buf.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 3, resource: params_buf.as_entire_binding() },
            ],
        });

        if let Some(e) = pollster::block_on(gpu.device.pop_error_scope()) {
            return Err(GpuError::ArgumentBinding(e.to_string()));
        }

        // --- Dispatch + result copy ---
        gpu.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let (groups_x, groups_y) = gpu
            .workgroup_size
            .dispatch_size(num_b_cols as u32, num_a_rows as u32);

        let mut encoder = gpu.device.create_command_encoder(
            &wgpu::CommandEncoderDescriptor { label: Some("GpuMatmul dispatch") },
        );
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("matmul"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(groups_x, groups_y, 1);
        }
        encoder.copy_buffer_to_buffer(&c_buf, 0, &readback, 0, c_size);
        gpu.queue.submit(std::iter::once(encoder.finish()));

        if let Some(e) = pollster::block_on(gpu.device.pop_error_scope()) {
            return Err(GpuError::Dispatch(e.to_string()));
        }

        // --- Synchronize + readback ---
        let slice = readback.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |r| {
            let _ = tx.send(r);
        });
        gpu.device.poll(wgpu::Maintain::Wait);
        match rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(GpuError::Readback(e)),
            // The callback was dropped without firing (device lost).
            Err(_) => return Err(GpuError::Readback(wgpu::BufferAsyncError)),
        }

        let mapped = slice.get_mapped_range();
        let out: Vec<i32> = bytemuck::cast_slice(&mapped).to_vec();
        drop(mapped);
        readback.unmap();

        Ok(Matrix::from_vec(num_a_rows, num_c_cols, out))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
