//! wgpu backend. A handle owns a device, its queue and the compiled gemvi
//! pipeline. Only single precision gemvi runs on the GPU; every other
//! instantiation reports `NotSupported`.

use std::sync::Arc;
use std::time::Instant;

use bytemuck::{Pod, Zeroable};
use wgpu::{
    util::{BufferInitDescriptor, DeviceExt},
    Adapter, Backends, BindGroupDescriptor, BindGroupEntry, BindGroupLayout,
    BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingType, Buffer, BufferBindingType,
    BufferDescriptor, BufferUsages, ComputePipeline, ComputePipelineDescriptor, Device,
    DeviceDescriptor, Features, Instance, Limits, Maintain, MapMode, PipelineLayoutDescriptor,
    Queue, ShaderModule, ShaderModuleDescriptor, ShaderSource, ShaderStages,
};

use crate::backend::validate::{self, GemviPlan};
use crate::backend::{GemviArgs, HandleId, HandleTable, SparseBackend, SpgemmOperands};
use crate::error::HarnessError;
use crate::registry::{OperationDescriptor, OperationKind};
use crate::scalar::{Scalar, SparseIndex, ValueType};
use crate::sparse::{CsrOutput, Operation};
use crate::status::Status;

const WORKGROUP_SIZE: u32 = 64;

// Layout matches `Params` in gemvi.wgsl.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct GemviParams {
    m: u32,
    nnz: u32,
    lda: u32,
    base: u32,
    alpha: f32,
    beta: f32,
    pad: [u32; 2],
}

struct GpuContext {
    device: Device,
    queue: Queue,
    bind_group_layout: BindGroupLayout,
    pipeline: ComputePipeline,
}

pub struct WgpuBackend {
    adapter: Adapter,
    handles: HandleTable<Arc<GpuContext>>,
}

impl WgpuBackend {
    pub fn new() -> Result<Self, HarnessError> {
        let instance = Instance::new(Backends::PRIMARY);
        let adapter = pollster::block_on(instance.request_adapter(&Default::default()))
            .ok_or(HarnessError::NoAdapter)?;
        log::info!("wgpu adapter: {:?}", adapter.get_info());
        Ok(Self {
            adapter,
            handles: HandleTable::new(),
        })
    }

    fn try_gemvi<T: Scalar>(
        &self,
        handle: Option<HandleId>,
        args: GemviArgs<'_, T>,
    ) -> Result<(), Status> {
        let context = self.handles.get(handle)?;
        single_precision::<T>()?;
        match validate::gemvi(args)? {
            Some(plan) => context.gemvi(plan),
            None => Ok(()),
        }
    }
}

fn single_precision<T: Scalar>() -> Result<(), Status> {
    match T::VALUE_TYPE {
        ValueType::F32 => Ok(()),
        _ => Err(Status::NotSupported),
    }
}

fn to_u32(v: usize) -> Result<u32, Status> {
    u32::try_from(v).map_err(|_| Status::InvalidSize)
}

impl GpuContext {
    fn new(device: Device, queue: Queue) -> Self {
        let storage = |binding, read_only| BindGroupLayoutEntry {
            binding,
            visibility: ShaderStages::COMPUTE,
            ty: BindingType::Buffer {
                ty: BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let bind_group_layout = device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: Some("gemvi"),
            entries: &[
                BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::COMPUTE,
                    ty: BindingType::Buffer {
                        ty: BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                storage(1, true),
                storage(2, true),
                storage(3, true),
                storage(4, false),
            ],
        });

        let pipeline = {
            let layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
                label: Some("gemvi"),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });
            device.create_compute_pipeline(&ComputePipelineDescriptor {
                label: Some("gemvi"),
                layout: Some(&layout),
                module: &prepare_shader(&device),
                entry_point: "main",
            })
        };

        Self {
            device,
            queue,
            bind_group_layout,
            pipeline,
        }
    }

    fn storage(&self, label: &str, contents: &[u8]) -> Buffer {
        // Zero sized bindings are rejected.
        const EMPTY: [u8; 4] = [0; 4];
        let contents = if contents.is_empty() { &EMPTY[..] } else { contents };
        self.device.create_buffer_init(&BufferInitDescriptor {
            label: Some(label),
            contents,
            usage: BufferUsages::STORAGE | BufferUsages::COPY_SRC,
        })
    }

    fn gemvi<T: Scalar>(&self, plan: GemviPlan<'_, T>) -> Result<(), Status> {
        let cast = |v: T| bytemuck::try_cast::<T, f32>(v).map_err(|_| Status::InternalError);
        let m = plan.a.rows;
        let params = GemviParams {
            m: to_u32(m)?,
            nnz: to_u32(plan.x.values.len())?,
            lda: to_u32(plan.a.ld)?,
            base: to_u32(plan.x.base)?,
            alpha: cast(plan.alpha)?,
            beta: cast(plan.beta)?,
            pad: [0; 2],
        };

        let params_buffer = self.device.create_buffer_init(&BufferInitDescriptor {
            label: Some("gemvi params"),
            contents: bytemuck::bytes_of(&params),
            usage: BufferUsages::UNIFORM,
        });
        let a_buffer = self.storage("gemvi a", bytemuck::cast_slice(plan.a.data));
        let x_val_buffer = self.storage("gemvi x_val", bytemuck::cast_slice(plan.x.values));
        let x_ind_buffer = self.storage("gemvi x_ind", bytemuck::cast_slice(plan.x.indices));
        let y_bytes: &[u8] = bytemuck::cast_slice(&*plan.y);
        let y_size = y_bytes.len() as u64;
        let y_buffer = self.storage("gemvi y", y_bytes);
        let output_buffer = self.device.create_buffer(&BufferDescriptor {
            label: Some("gemvi readback"),
            size: y_size,
            usage: BufferUsages::MAP_READ | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = self.device.create_bind_group(&BindGroupDescriptor {
            label: Some("gemvi"),
            layout: &self.bind_group_layout,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: params_buffer.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: a_buffer.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 2,
                    resource: x_val_buffer.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 3,
                    resource: x_ind_buffer.as_entire_binding(),
                },
                BindGroupEntry {
                    binding: 4,
                    resource: y_buffer.as_entire_binding(),
                },
            ],
        });

        {
            let mut encoder = self.device.create_command_encoder(&Default::default());
            {
                let mut cpass = encoder.begin_compute_pass(&Default::default());
                cpass.set_pipeline(&self.pipeline);
                cpass.set_bind_group(0, &bind_group, &[]);
                cpass.dispatch_workgroups((params.m + WORKGROUP_SIZE - 1) / WORKGROUP_SIZE, 1, 1);
            }
            encoder.copy_buffer_to_buffer(&y_buffer, 0, &output_buffer, 0, y_size);
            self.queue.submit(Some(encoder.finish()));
        }

        let buf_slice = output_buffer.slice(..);
        let (sender, receiver) = futures_intrusive::channel::shared::oneshot_channel();
        buf_slice.map_async(MapMode::Read, move |v| {
            let _ = sender.send(v);
        });

        {
            let now = Instant::now();
            self.device.poll(Maintain::Wait);
            log::debug!("gemvi: {} us during poll", now.elapsed().as_micros());
        }

        match pollster::block_on(receiver.receive()) {
            Some(Ok(())) => {}
            Some(Err(err)) => {
                log::error!("gemvi: could not map readback buffer: {}", err);
                return Err(Status::InternalError);
            }
            None => return Err(Status::InternalError),
        }
        {
            let data_raw = &*buf_slice.get_mapped_range();
            let data: &[T] = bytemuck::try_cast_slice(data_raw).map_err(|_| Status::InternalError)?;
            plan.y.copy_from_slice(data);
        }
        output_buffer.unmap();
        Ok(())
    }
}

fn prepare_shader(device: &Device) -> ShaderModule {
    let start_instant = Instant::now();
    let cs_module = device.create_shader_module(ShaderModuleDescriptor {
        label: Some("gemvi"),
        source: ShaderSource::Wgsl(include_str!("gemvi.wgsl").into()),
    });
    log::debug!("shader compilation {:?}", start_instant.elapsed());
    cs_module
}

impl SparseBackend for WgpuBackend {
    fn name(&self) -> &str {
        "wgpu"
    }

    fn supports(&self, desc: &OperationDescriptor) -> bool {
        desc.kind() == OperationKind::Gemvi && desc.value() == ValueType::F32
    }

    fn acquire(&self) -> Result<HandleId, Status> {
        let (device, queue) = pollster::block_on(self.adapter.request_device(
            &DeviceDescriptor {
                label: Some("sparse_conformance"),
                features: Features::empty(),
                limits: Limits::downlevel_defaults(),
            },
            None,
        ))
        .map_err(|err| {
            log::warn!("wgpu: request_device failed: {}", err);
            Status::InternalError
        })?;
        log::debug!("wgpu: device limits {:?}", device.limits());
        Ok(self.handles.insert(Arc::new(GpuContext::new(device, queue))))
    }

    fn release(&self, handle: HandleId) {
        self.handles.remove(handle);
    }

    fn live_handles(&self) -> usize {
        self.handles.len()
    }

    fn gemvi_buffer_size<T: Scalar>(
        &self,
        handle: Option<HandleId>,
        trans: Operation,
        m: i64,
        n: i64,
        nnz: i64,
    ) -> Result<usize, Status> {
        self.handles.get(handle)?;
        single_precision::<T>()?;
        validate::gemvi_buffer_size::<T>(trans, m, n, nnz)
    }

    fn gemvi<T: Scalar>(&self, handle: Option<HandleId>, args: GemviArgs<'_, T>) -> Status {
        Status::from_result(self.try_gemvi(handle, args))
    }

    fn spgemm_csr_nnz<I: SparseIndex, J: SparseIndex, T: Scalar>(
        &self,
        handle: Option<HandleId>,
        _operands: &SpgemmOperands<'_, I, J, T>,
    ) -> Result<i64, Status> {
        self.handles.get(handle)?;
        Err(Status::NotSupported)
    }

    fn spgemm_csr<I: SparseIndex, J: SparseIndex, T: Scalar>(
        &self,
        handle: Option<HandleId>,
        _operands: &SpgemmOperands<'_, I, J, T>,
        _c: Option<CsrOutput<'_, I, J, T>>,
    ) -> Status {
        Status::from_result(self.handles.get(handle).and(Err(Status::NotSupported)))
    }
}
