use std::mem;
use std::sync::Arc;

use fxhash::{FxHashMap, FxHashSet};
use glam::uvec2;
use log::{debug, info};
use wgpu::util::DeviceExt;

use crate::backend::assert_bindings;
use crate::{gpu, Backend, Kernel, SourceDim, TextureDesc};

/// Vertex entry point shared by all kernels; it's expected to emit a single
/// fullscreen triangle.
pub const VERTEX_ENTRY_POINT: &str = "fullscreen_vs";

/// Returns name of the fragment entry point implementing given kernel.
pub fn fragment_entry_point(kernel: Kernel) -> String {
    format!("{}_fs", kernel.name())
}

#[derive(Clone, Debug)]
pub struct WgpuTexture {
    desc: TextureDesc,
    dim: SourceDim,
    texture: Arc<wgpu::Texture>,
    view: Arc<wgpu::TextureView>,
}

impl WgpuTexture {
    /// Wraps a two-dimensional texture owned by the host, e.g. the camera's
    /// color target.
    pub fn import(label: &'static str, texture: Arc<wgpu::Texture>) -> Self {
        Self::wrap(label, texture, SourceDim::D2)
    }

    /// Wraps a reflection probe's cubemap.
    pub fn import_cube(
        label: &'static str,
        texture: Arc<wgpu::Texture>,
    ) -> Self {
        Self::wrap(label, texture, SourceDim::Cube)
    }

    fn wrap(
        label: &'static str,
        texture: Arc<wgpu::Texture>,
        dim: SourceDim,
    ) -> Self {
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(label),
            dimension: Some(view_dimension(dim)),
            ..Default::default()
        });

        Self {
            desc: TextureDesc::new(
                label,
                uvec2(texture.width(), texture.height()),
                texture.format(),
            ),
            dim,
            texture,
            view: Arc::new(view),
        }
    }

    pub fn desc(&self) -> &TextureDesc {
        &self.desc
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

/// Kernels provided by the host's shader module, together with pipelines
/// built out of them so far.
///
/// Lives as long as the shader module does; pipelines are built lazily, per
/// kernel and set of target formats.
#[derive(Debug)]
pub struct WgpuKernels {
    module: wgpu::ShaderModule,
    available: FxHashSet<Kernel>,
    sampler: wgpu::Sampler,
    dummy: WgpuTexture,
    dummy_cube: WgpuTexture,
    layouts: FxHashMap<Kernel, wgpu::BindGroupLayout>,
    pipelines: FxHashMap<(Kernel, Vec<wgpu::TextureFormat>), Pipeline>,
}

#[derive(Debug)]
struct Pipeline {
    label: String,
    pipeline: wgpu::RenderPipeline,
}

impl WgpuKernels {
    /// Creates the kernel library; `available` lists kernels whose entry
    /// points exist in `module`.
    pub fn new(
        device: &wgpu::Device,
        module: wgpu::ShaderModule,
        available: impl IntoIterator<Item = Kernel>,
    ) -> Self {
        let available: FxHashSet<_> = available.into_iter().collect();

        info!("Initializing SSGI kernels ({} available)", available.len());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("ssgi_sampler"),
            ..Default::default()
        });

        Self {
            module,
            available,
            sampler,
            dummy: Self::create_dummy(device, SourceDim::D2),
            dummy_cube: Self::create_dummy(device, SourceDim::Cube),
            layouts: Default::default(),
            pipelines: Default::default(),
        }
    }

    /// Creates a texture bound in place of missing optional sources.
    fn create_dummy(device: &wgpu::Device, dim: SourceDim) -> WgpuTexture {
        let (label, layers) = match dim {
            SourceDim::D2 => ("ssgi_dummy", 1),
            SourceDim::Cube => ("ssgi_dummy_cube", 6),
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: layers,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba16Float,
            usage: wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        WgpuTexture::wrap(label, Arc::new(texture), dim)
    }

    fn dummy(&self, dim: SourceDim) -> &WgpuTexture {
        match dim {
            SourceDim::D2 => &self.dummy,
            SourceDim::Cube => &self.dummy_cube,
        }
    }

    fn prepare(
        &mut self,
        device: &wgpu::Device,
        kernel: Kernel,
        formats: &[wgpu::TextureFormat],
    ) {
        let layout = self
            .layouts
            .entry(kernel)
            .or_insert_with(|| Self::create_layout(device, kernel));

        let key = (kernel, formats.to_vec());

        if self.pipelines.contains_key(&key) {
            return;
        }

        let pipeline = Self::create_pipeline(
            device,
            &self.module,
            layout,
            kernel,
            formats,
        );

        self.pipelines.insert(key, pipeline);
    }

    fn create_layout(
        device: &wgpu::Device,
        kernel: Kernel,
    ) -> wgpu::BindGroupLayout {
        let label = format!("ssgi_{}_bg0", kernel.name());

        let mut entries = vec![
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        mem::size_of::<gpu::PassParams>() as u64,
                    ),
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(
                    wgpu::SamplerBindingType::NonFiltering,
                ),
                count: None,
            },
        ];

        for (idx, source) in kernel.sources().iter().enumerate() {
            entries.push(wgpu::BindGroupLayoutEntry {
                binding: 2 + idx as u32,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: view_dimension(source.dim()),
                    sample_type: wgpu::TextureSampleType::Float {
                        filterable: false,
                    },
                },
                count: None,
            });
        }

        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&label),
            entries: &entries,
        })
    }

    fn create_pipeline(
        device: &wgpu::Device,
        module: &wgpu::ShaderModule,
        layout: &wgpu::BindGroupLayout,
        kernel: Kernel,
        formats: &[wgpu::TextureFormat],
    ) -> Pipeline {
        debug!("Initializing pass: {kernel}; formats={formats:?}");

        let label = format!("ssgi_{}", kernel.name());
        let pipeline_layout_label = format!("{label}_pipeline_layout");
        let pipeline_label = format!("{label}_pipeline");
        let entry_point = fragment_entry_point(kernel);

        let pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&pipeline_layout_label),
                bind_group_layouts: &[layout],
                push_constant_ranges: &[],
            });

        let targets: Vec<_> = formats
            .iter()
            .map(|&format| {
                Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })
            })
            .collect();

        let pipeline =
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&pipeline_label),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module,
                    entry_point: VERTEX_ENTRY_POINT,
                    buffers: &[],
                },
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module,
                    entry_point: &entry_point,
                    targets: &targets,
                }),
                multiview: None,
            });

        Pipeline { label, pipeline }
    }
}

/// Backend that records passes straight into a command encoder.
///
/// Created anew for each frame (or each encoder); everything that outlives
/// a frame is kept inside [`WgpuKernels`].
#[derive(Debug)]
pub struct WgpuBackend<'a> {
    device: &'a wgpu::Device,
    encoder: &'a mut wgpu::CommandEncoder,
    kernels: &'a mut WgpuKernels,
}

impl<'a> WgpuBackend<'a> {
    pub fn new(
        device: &'a wgpu::Device,
        encoder: &'a mut wgpu::CommandEncoder,
        kernels: &'a mut WgpuKernels,
    ) -> Self {
        Self {
            device,
            encoder,
            kernels,
        }
    }
}

impl Backend for WgpuBackend<'_> {
    type Texture = WgpuTexture;

    fn supports(&self, kernel: Kernel) -> bool {
        self.kernels.available.contains(&kernel)
    }

    fn create_texture(&mut self, desc: &TextureDesc) -> WgpuTexture {
        debug!(
            "Allocating texture `{}`; size={}x{}, format={:?}",
            desc.label, desc.size.x, desc.size.y, desc.format
        );

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(desc.label),
            size: wgpu::Extent3d {
                width: desc.size.x,
                height: desc.size.y,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: desc.format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::COPY_SRC
                | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let view = texture.create_view(&Default::default());

        WgpuTexture {
            desc: desc.clone(),
            dim: SourceDim::D2,
            texture: Arc::new(texture),
            view: Arc::new(view),
        }
    }

    fn release_texture(&mut self, texture: WgpuTexture) {
        // Passes recorded earlier into this encoder might still refer to the
        // texture, so it's dropped instead of being destroyed
        debug!("Releasing texture `{}`", texture.desc.label);
    }

    fn copy_texture(&mut self, src: &WgpuTexture, dst: &WgpuTexture) {
        assert_eq!(
            (src.desc.size, src.desc.format),
            (dst.desc.size, dst.desc.format),
            "cannot copy `{}` into `{}`",
            src.desc.label,
            dst.desc.label
        );

        self.encoder.copy_texture_to_texture(
            src.texture.as_image_copy(),
            dst.texture.as_image_copy(),
            wgpu::Extent3d {
                width: src.desc.size.x,
                height: src.desc.size.y,
                depth_or_array_layers: 1,
            },
        );
    }

    fn run_kernel(
        &mut self,
        kernel: Kernel,
        sources: &[Option<&WgpuTexture>],
        targets: &[&WgpuTexture],
        params: &gpu::PassParams,
    ) {
        assert!(self.supports(kernel), "kernel `{kernel}` is not available");
        assert_bindings(kernel, sources, targets);

        assert!(
            targets
                .iter()
                .all(|target| target.desc.size == targets[0].desc.size),
            "kernel `{kernel}` writes into targets of different sizes"
        );

        let formats: Vec<_> =
            targets.iter().map(|target| target.desc.format).collect();

        self.kernels.prepare(self.device, kernel, &formats);

        let kernels = &*self.kernels;
        let layout = &kernels.layouts[&kernel];
        let pipeline = &kernels.pipelines[&(kernel, formats)];

        let params =
            self.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("ssgi_pass_params"),
                    contents: bytemuck::bytes_of(params),
                    usage: wgpu::BufferUsages::UNIFORM,
                });

        let mut entries = vec![
            wgpu::BindGroupEntry {
                binding: 0,
                resource: params.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&kernels.sampler),
            },
        ];

        for (idx, (source, binding)) in
            kernel.sources().iter().zip(sources).enumerate()
        {
            let texture = match binding {
                Some(texture) => {
                    assert_eq!(
                        source.dim(),
                        texture.dim,
                        "kernel `{kernel}` got source #{idx} of a wrong \
                         dimension",
                    );

                    texture
                }
                None => kernels.dummy(source.dim()),
            };

            entries.push(wgpu::BindGroupEntry {
                binding: 2 + idx as u32,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            });
        }

        let bind_group_label = format!("{}_bg0", pipeline.label);

        let bind_group =
            self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&bind_group_label),
                layout,
                entries: &entries,
            });

        let color_attachments: Vec<_> = targets
            .iter()
            .map(|target| {
                Some(wgpu::RenderPassColorAttachment {
                    view: &target.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: true,
                    },
                })
            })
            .collect();

        let mut pass =
            self.encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some(&pipeline.label),
                    color_attachments: &color_attachments,
                    depth_stencil_attachment: None,
                });

        pass.set_pipeline(&pipeline.pipeline);
        pass.set_bind_group(0, &bind_group, &[]);
        pass.draw(0..3, 0..1);
    }
}

fn view_dimension(dim: SourceDim) -> wgpu::TextureViewDimension {
    match dim {
        SourceDim::D2 => wgpu::TextureViewDimension::D2,
        SourceDim::Cube => wgpu::TextureViewDimension::Cube,
    }
}
