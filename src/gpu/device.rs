// gpu/device.rs — wgpu device abstraction.
//
// Responsibilities:
//   - Enumerate adapters and select the best available compute device.
//   - Bundle device + queue + adapter info into one context object that
//     is passed by reference through the pipeline stages.
//   - Provide `WorkgroupSize`: the 2D workgroup configuration used when
//     creating the matmul pipeline, validated against device limits.
//
// ADAPTER SELECTION:
// wgpu's default `request_adapter` uses power-preference heuristics that
// can grab a software rasterizer (llvmpipe) when one is installed. We
// enumerate explicitly and pick in tiers: real hardware first, virtual
// or unclassified adapters second, and anything at all as a last resort.
// Every visible adapter is logged so the operator knows which one ran.
//
// ERROR TYPE:
// `GpuError` is the single error enum for the whole GPU layer. The
// variants track the failure points of the offload pipeline: discovery,
// device request, kernel build, buffer allocation, argument binding,
// dispatch, readback. Each failure aborts the run; drop order releases
// whatever was acquired before the failing step.

use std::fmt;

/// A 2D workgroup configuration for compute dispatches.
///
/// Spliced into the WGSL source at pipeline creation; validated against
/// the device's invocation limit by [`GpuDevice::set_workgroup_size`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkgroupSize {
    pub x: u32,
    pub y: u32,
}

impl WorkgroupSize {
    /// Total invocations per workgroup (x * y).
    pub fn total(&self) -> u32 {
        self.x * self.y
    }

    /// Number of workgroups needed to cover a `cols` x `rows` output
    /// grid, as `(groups_x, groups_y)`. Ceiling division: the last
    /// workgroup in each dimension may hang past the matrix edge, so the
    /// shader must guard against out-of-range global IDs:
    ///
    /// ```wgsl
    /// if (row >= num_a_rows || col >= num_b_cols) { return; }
    /// ```
    pub fn dispatch_size(&self, cols: u32, rows: u32) -> (u32, u32) {
        let gx = (cols + self.x - 1) / self.x;
        let gy = (rows + self.y - 1) / self.y;
        (gx, gy)
    }
}

impl Default for WorkgroupSize {
    /// 16x8 = 128 invocations: 4 NVIDIA warps, 2 AMD wavefronts, and
    /// within every implementation's minimum invocation limit.
    fn default() -> Self {
        WorkgroupSize { x: 16, y: 8 }
    }
}

impl fmt::Display for WorkgroupSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} ({} invocations)", self.x, self.y, self.total())
    }
}

/// Cached adapter information for logging and diagnostics.
#[derive(Debug, Clone)]
pub struct AdapterInfo {
    pub name: String,
    pub vendor: u32,
    pub device: u32,
    pub device_type: wgpu::DeviceType,
    pub backend: wgpu::Backend,
}

impl fmt::Display for AdapterInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:?}, {:?})",
            self.name, self.backend, self.device_type
        )
    }
}

/// The GPU context: device, queue, adapter info, workgroup configuration.
///
/// Create one via [`GpuDevice::new`] and pass it by reference to every
/// pipeline stage. Multiple independent `GpuDevice` instances in one
/// process are fine; nothing here is global.
///
/// # Field drop order
/// Rust drops struct fields in declaration order. `_instance` is declared
/// last so the `wgpu::Instance` outlives `device` and `queue`; dropping
/// the instance first leaves device-level objects with dangling
/// back-references on some drivers.
pub struct GpuDevice {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub adapter_info: AdapterInfo,
    pub workgroup_size: WorkgroupSize,
    /// Keeps the `wgpu::Instance` alive until `device` and `queue` are
    /// dropped. Never accessed directly.
    _instance: wgpu::Instance,
}

impl GpuDevice {
    /// Create a `GpuDevice` on the best adapter visible through the
    /// primary backends (Vulkan / Metal / DX12).
    ///
    /// # Errors
    /// [`GpuError::NoAdapter`] if discovery finds nothing at all, before
    /// any device-level resource is touched. [`GpuError::DeviceRequest`]
    /// if the selected adapter refuses the device request.
    pub fn new() -> Result<Self, GpuError> {
        pollster::block_on(Self::init_async())
    }

    async fn init_async() -> Result<Self, GpuError> {
        // Validation layer in debug builds for shader error feedback.
        let flags = if cfg!(debug_assertions) {
            wgpu::InstanceFlags::VALIDATION
        } else {
            wgpu::InstanceFlags::empty()
        };

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            flags,
            ..Default::default()
        });

        let all_adapters: Vec<wgpu::Adapter> = instance
            .enumerate_adapters(wgpu::Backends::PRIMARY)
            .into_iter()
            .collect();

        if all_adapters.is_empty() {
            return Err(GpuError::NoAdapter);
        }

        for a in &all_adapters {
            let info = a.get_info();
            eprintln!(
                "[gemmcheck] adapter: {} ({:?}, {:?})",
                info.name, info.backend, info.device_type
            );
        }

        // Tier 1: real hardware. Tier 2: virtual / unclassified.
        // Last resort: whatever exists, even a software rasterizer —
        // a correctness harness still verifies correctly on llvmpipe,
        // and the adapter name was logged above.
        let adapter = all_adapters
            .into_iter()
            .find(|a| {
                matches!(
                    a.get_info().device_type,
                    wgpu::DeviceType::DiscreteGpu
                        | wgpu::DeviceType::IntegratedGpu
                        | wgpu::DeviceType::VirtualGpu
                        | wgpu::DeviceType::Other
                )
            })
            .or_else(|| {
                instance
                    .enumerate_adapters(wgpu::Backends::PRIMARY)
                    .into_iter()
                    .next()
            })
            .ok_or(GpuError::NoAdapter)?;

        let raw_info = adapter.get_info();
        let adapter_info = AdapterInfo {
            name: raw_info.name.clone(),
            vendor: raw_info.vendor,
            device: raw_info.device,
            device_type: raw_info.device_type,
            backend: raw_info.backend,
        };

        let (device, queue): (wgpu::Device, wgpu::Queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("gemmcheck"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await
            .map_err(GpuError::DeviceRequest)?;

        Ok(GpuDevice {
            device,
            queue,
            adapter_info,
            workgroup_size: WorkgroupSize::default(),
            _instance: instance,
        })
    }

    /// Override the default workgroup size.
    ///
    /// Returns `Err` if x * y exceeds the device's
    /// `max_compute_invocations_per_workgroup` limit. Pipelines created
    /// before the override keep the size they were compiled with.
    pub fn set_workgroup_size(&mut self, x: u32, y: u32) -> Result<(), GpuError> {
        let total = x * y;
        let max = self.device.limits().max_compute_invocations_per_workgroup;
        if total == 0 || total > max {
            return Err(GpuError::WorkgroupTooLarge { total, max });
        }
        self.workgroup_size = WorkgroupSize { x, y };
        Ok(())
    }
}

impl fmt::Display for GpuDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "GpuDevice {{ adapter: {}, workgroup: {} }}",
            self.adapter_info, self.workgroup_size
        )
    }
}

// ============================================================
// Error type
// ============================================================

/// Errors from the GPU offload pipeline, one variant per failure point.
#[derive(Debug)]
pub enum GpuError {
    /// Adapter enumeration found no devices at all.
    NoAdapter,
    /// The selected adapter refused the device/queue request.
    DeviceRequest(wgpu::RequestDeviceError),
    /// Requested workgroup size exceeds the device invocation limit
    /// (or is zero).
    WorkgroupTooLarge { total: u32, max: u32 },
    /// WGSL compilation or pipeline creation failed; carries the
    /// compiler diagnostic text.
    KernelBuild(String),
    /// Contraction dimensions disagree: A is m x k, B must be k x n.
    DimensionMismatch { a_cols: usize, b_rows: usize },
    /// Device buffer allocation failed (out of device memory).
    Allocation(String),
    /// Binding buffers and scalar parameters to the kernel failed
    /// (count or type mismatch against the pipeline layout).
    ArgumentBinding(String),
    /// Enqueueing the compute dispatch or the result copy failed.
    Dispatch(String),
    /// Mapping the readback buffer for the device-to-host copy failed.
    Readback(wgpu::BufferAsyncError),
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::NoAdapter => write!(
                f,
                "no GPU adapter found (no Vulkan/Metal/DX12 device visible)"
            ),
            GpuError::DeviceRequest(e) => write!(f, "device request failed: {e}"),
            GpuError::WorkgroupTooLarge { total, max } => write!(
                f,
                "workgroup size {total} outside device limit of {max} invocations"
            ),
            GpuError::KernelBuild(log) => write!(f, "kernel build failed: {log}"),
            GpuError::DimensionMismatch { a_cols, b_rows } => write!(
                f,
                "dimension mismatch: A has {a_cols} columns but B has {b_rows} rows"
            ),
            GpuError::Allocation(e) => write!(f, "device buffer allocation failed: {e}"),
            GpuError::ArgumentBinding(e) => write!(f, "kernel argument binding failed: {e}"),
            GpuError::Dispatch(e) => write!(f, "kernel dispatch failed: {e}"),
            GpuError::Readback(e) => write!(f, "result readback failed: {e}"),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::DeviceRequest(e) => Some(e),
            GpuError::Readback(e) => Some(e),
            _ => None,
        }
    }
}

// ============================================================
// Tests
// ============================================================
