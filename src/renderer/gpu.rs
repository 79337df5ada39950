use std::collections::{HashMap, HashSet};
use std::mem::size_of;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use wgpu::util::DeviceExt;
use winit::window::Window;

use super::uniforms::{GlobalsUniform, ObjectUniform};
use super::{frame_clear_color, physical_size, RenderBackend, RendererOptions, ShadowMap};
use crate::camera::PerspectiveCamera;
use crate::core::WindowDimensions;
use crate::math::Color;
use crate::scene::{Geometry, GeometryId, Node, Scene, Vertex};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const MSAA_SAMPLES: u32 = 4;
const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

/// Vertex and index buffers for one uploaded geometry
struct GpuGeometry {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuGeometry {
    fn upload(device: &wgpu::Device, geometry: &Geometry) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(geometry.vertices()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(geometry.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: geometry.indices().len() as u32,
        }
    }
}

/// One uniform slot per drawn mesh, `stride` bytes apart
struct ObjectBuffer {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    capacity: usize,
}

impl ObjectBuffer {
    fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        stride: u64,
        capacity: usize,
    ) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Object Uniform Buffer"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Object Bind Group"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(size_of::<ObjectUniform>() as u64),
                }),
            }],
        });

        Self {
            buffer,
            bind_group,
            capacity,
        }
    }
}

/// Forward renderer drawing a [`Scene`] into a window surface
pub struct GpuRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    sample_count: u32,
    pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    object_stride: u64,
    objects: ObjectBuffer,
    depth_view: wgpu::TextureView,
    msaa_view: Option<wgpu::TextureView>,
    geometries: HashMap<GeometryId, GpuGeometry>,
    logical_size: WindowDimensions,
    pixel_ratio: f64,
    clear_color: Color,
    clear_alpha: f32,
    shadow_map: ShadowMap,
}

impl GpuRenderer {
    pub async fn new(window: Arc<Window>, options: &RendererOptions) -> Result<Self> {
        let pixel_ratio = window.scale_factor();
        let inner = window.inner_size();
        let logical = inner.to_logical::<u32>(pixel_ratio);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("Failed to create window surface")?;
        let adapter = Self::request_adapter(&instance, &surface).await?;
        let adapter_info = adapter.get_info();
        info!(
            "Using adapter {} ({:?})",
            adapter_info.name, adapter_info.backend
        );
        let (device, queue) = Self::request_device(&adapter).await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("Surface reports no supported formats")?;

        let sample_count = if options.antialias && Self::supports_msaa(&adapter, surface_format) {
            MSAA_SAMPLES
        } else {
            1
        };
        debug!(
            "Surface format {:?}, {}x sampling",
            surface_format, sample_count
        );

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: inner.width.max(1),
            height: inner.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(size_of::<GlobalsUniform>() as u64),
                },
                count: None,
            }],
        });

        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Object Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(size_of::<ObjectUniform>() as u64),
                },
                count: None,
            }],
        });

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Globals Uniform Buffer"),
            contents: bytemuck::bytes_of(&GlobalsUniform::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globals Bind Group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let object_stride = wgpu::util::align_to(
            size_of::<ObjectUniform>() as u64,
            device.limits().min_uniform_buffer_offset_alignment as u64,
        );
        let objects = ObjectBuffer::new(&device, &object_layout, object_stride, 16);

        let pipeline = Self::create_pipeline(
            &device,
            &[&globals_layout, &object_layout],
            surface_format,
            sample_count,
        );

        let (depth_view, msaa_view) =
            Self::create_targets(&device, &surface_config, sample_count);

        Ok(Self {
            device,
            queue,
            surface,
            surface_config,
            sample_count,
            pipeline,
            globals_buffer,
            globals_bind_group,
            object_layout,
            object_stride,
            objects,
            depth_view,
            msaa_view,
            geometries: HashMap::new(),
            logical_size: WindowDimensions::new(logical.width, logical.height),
            pixel_ratio,
            clear_color: Color::BLACK,
            clear_alpha: 1.0,
            shadow_map: ShadowMap::default(),
        })
    }

    async fn request_adapter(
        instance: &wgpu::Instance,
        surface: &wgpu::Surface<'_>,
    ) -> Result<wgpu::Adapter> {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(surface),
                force_fallback_adapter: false,
            })
            .await
            .context("Failed to find appropriate adapter")
    }

    async fn request_device(adapter: &wgpu::Adapter) -> Result<(wgpu::Device, wgpu::Queue)> {
        adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Scene Renderer Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .context("Failed to create device")
    }

    fn supports_msaa(adapter: &wgpu::Adapter, format: wgpu::TextureFormat) -> bool {
        [format, DEPTH_FORMAT].iter().all(|&format| {
            adapter
                .get_texture_format_features(format)
                .flags
                .sample_count_supported(MSAA_SAMPLES)
        })
    }

    fn create_pipeline(
        device: &wgpu::Device,
        bind_group_layouts: &[&wgpu::BindGroupLayout],
        surface_format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> wgpu::RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("scene.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts,
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Scene Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: size_of::<Vertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &VERTEX_ATTRIBUTES,
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: sample_count,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        })
    }

    /// Depth buffer, plus the multisampled colour target when MSAA is on
    fn create_targets(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        sample_count: u32,
    ) -> (wgpu::TextureView, Option<wgpu::TextureView>) {
        let size = wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        };

        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size,
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        let msaa = (sample_count > 1).then(|| {
            device
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some("MSAA Colour Texture"),
                    size,
                    mip_level_count: 1,
                    sample_count,
                    dimension: wgpu::TextureDimension::D2,
                    format: config.format,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    view_formats: &[],
                })
                .create_view(&wgpu::TextureViewDescriptor::default())
        });

        (
            depth.create_view(&wgpu::TextureViewDescriptor::default()),
            msaa,
        )
    }

    /// Resize the surface to the current logical size and pixel ratio
    fn reconfigure(&mut self) {
        let physical = physical_size(self.logical_size, self.pixel_ratio);
        if physical.width == 0 || physical.height == 0 {
            return;
        }

        let max = self.device.limits().max_texture_dimension_2d;
        self.surface_config.width = physical.width.min(max);
        self.surface_config.height = physical.height.min(max);
        self.surface.configure(&self.device, &self.surface_config);

        let (depth_view, msaa_view) =
            Self::create_targets(&self.device, &self.surface_config, self.sample_count);
        self.depth_view = depth_view;
        self.msaa_view = msaa_view;

        debug!(
            "Surface configured at {}x{}",
            self.surface_config.width, self.surface_config.height
        );
    }

    /// Upload geometry first seen this frame, release geometry no longer drawn
    fn sync_geometry(&mut self, scene: &Scene) {
        let mut live = HashSet::new();
        for mesh in scene.nodes().iter().filter_map(Node::as_mesh) {
            let id = mesh.geometry.id();
            live.insert(id);
            if !self.geometries.contains_key(&id) {
                debug!(
                    "Uploading geometry {} ({} triangles)",
                    id.raw(),
                    mesh.geometry.triangle_count()
                );
                let uploaded = GpuGeometry::upload(&self.device, &mesh.geometry);
                self.geometries.insert(id, uploaded);
            }
        }
        self.geometries.retain(|id, _| live.contains(id));
    }

    fn ensure_object_capacity(&mut self, count: usize) {
        if count <= self.objects.capacity {
            return;
        }
        let capacity = count.next_power_of_two();
        debug!("Growing object uniforms to {} slots", capacity);
        self.objects =
            ObjectBuffer::new(&self.device, &self.object_layout, self.object_stride, capacity);
    }
}

impl RenderBackend for GpuRenderer {
    fn set_pixel_ratio(&mut self, ratio: f64) {
        self.pixel_ratio = ratio;
        self.reconfigure();
    }

    fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    fn set_size(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            debug!("Ignoring zero-sized resize");
            return;
        }
        self.logical_size = WindowDimensions::new(width, height);
        self.reconfigure();
    }

    fn size(&self) -> WindowDimensions {
        self.logical_size
    }

    fn set_clear_color(&mut self, color: Color, alpha: f32) {
        self.clear_color = color;
        self.clear_alpha = alpha;
    }

    fn set_shadow_map(&mut self, shadow_map: ShadowMap) {
        self.shadow_map = shadow_map;
    }

    fn shadow_map(&self) -> ShadowMap {
        self.shadow_map
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<()> {
        self.sync_geometry(scene);

        let draws: Vec<(GeometryId, ObjectUniform)> = scene
            .nodes()
            .iter()
            .filter(|node| node.visible)
            .filter_map(|node| {
                node.as_mesh().map(|mesh| {
                    (
                        mesh.geometry.id(),
                        ObjectUniform::new(node.transform.matrix(), &mesh.material),
                    )
                })
            })
            .collect();
        self.ensure_object_capacity(draws.len());

        let globals = GlobalsUniform::from_scene(scene, camera);
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        if !draws.is_empty() {
            let stride = self.object_stride as usize;
            let mut staging = vec![0u8; stride * draws.len()];
            for (slot, (_, object)) in staging.chunks_exact_mut(stride).zip(&draws) {
                slot[..size_of::<ObjectUniform>()].copy_from_slice(bytemuck::bytes_of(object));
            }
            self.queue.write_buffer(&self.objects.buffer, 0, &staging);
        }

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.surface_config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("Surface texture timed out, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(e).context("Failed to acquire surface texture"),
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let [r, g, b, a] = frame_clear_color(scene.background(), self.clear_color, self.clear_alpha);
        let (target, resolve_target) = match &self.msaa_view {
            Some(msaa) => (msaa, Some(&view)),
            None => (&view, None),
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.globals_bind_group, &[]);

            for (index, (geometry_id, _)) in draws.iter().enumerate() {
                let Some(geometry) = self.geometries.get(geometry_id) else {
                    continue;
                };
                if geometry.index_count == 0 {
                    continue;
                }

                let offset = (index as u64 * self.object_stride) as wgpu::DynamicOffset;
                render_pass.set_bind_group(1, &self.objects.bind_group, &[offset]);
                render_pass.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
                render_pass
                    .set_index_buffer(geometry.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..geometry.index_count, 0, 0..1);
            }
        }

        self.queue.submit(Some(encoder.finish()));
        frame.present();

        Ok(())
    }
}
