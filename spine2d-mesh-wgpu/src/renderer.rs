use spine2d_mesh::{BatchedMesh, BlendMode, DebugGeometry, SkeletonMesh, TextureId, VertexLayout};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct GpuVertex {
    position: [f32; 3],
    uv: [f32; 2],
    color: [f32; 4],
    dark_color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct GpuLineVertex {
    position: [f32; 2],
    color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Globals {
    clip_from_world: [[f32; 4]; 4],
}

const NO_DARK_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Shared pipelines and globals. Create one per device and pass it to every draw.
pub struct MeshRenderer {
    pipelines: Pipelines,
    pipelines_pma: Pipelines,
    line_pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    texture_bind_group_layout: wgpu::BindGroupLayout,
}

struct Pipelines {
    normal: wgpu::RenderPipeline,
    additive: wgpu::RenderPipeline,
    multiply: wgpu::RenderPipeline,
    screen: wgpu::RenderPipeline,
}

impl Pipelines {
    fn by_blend(&self, blend: BlendMode) -> &wgpu::RenderPipeline {
        match blend {
            BlendMode::Normal => &self.normal,
            BlendMode::Additive => &self.additive,
            BlendMode::Multiply => &self.multiply,
            BlendMode::Screen => &self.screen,
        }
    }
}

/// GPU copy of one [`BatchedMesh`].
pub struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    vertex_capacity: usize,
    index_capacity: usize,
    uploaded_version: Option<u64>,
    staging: Vec<GpuVertex>,
}

impl GpuMesh {
    pub fn new(device: &wgpu::Device) -> Self {
        let vertex_capacity = 1024;
        let index_capacity = 2048;
        Self {
            vertex_buffer: create_vertex_buffer(device, vertex_capacity),
            index_buffer: create_index_buffer(device, index_capacity),
            vertex_capacity,
            index_capacity,
            uploaded_version: None,
            staging: Vec::new(),
        }
    }

    fn ensure_buffers(&mut self, device: &wgpu::Device, vertices: usize, indices: usize) {
        if vertices > self.vertex_capacity {
            while self.vertex_capacity < vertices {
                self.vertex_capacity *= 2;
            }
            self.vertex_buffer = create_vertex_buffer(device, self.vertex_capacity);
            log::debug!("grew vertex buffer to {} vertices", self.vertex_capacity);
        }
        if indices > self.index_capacity {
            while self.index_capacity < indices {
                self.index_capacity *= 2;
            }
            self.index_buffer = create_index_buffer(device, self.index_capacity);
            log::debug!("grew index buffer to {} indices", self.index_capacity);
        }
    }
}

fn create_vertex_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("spine2d-mesh vertices"),
        size: (capacity * std::mem::size_of::<GpuVertex>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_index_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("spine2d-mesh indices"),
        size: (capacity * std::mem::size_of::<u32>()) as u64,
        usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

/// GPU buffers for every batcher of a [`SkeletonMesh`].
#[derive(Default)]
pub struct GpuSkeleton {
    meshes: Vec<GpuMesh>,
}

impl GpuSkeleton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upload(
        &mut self,
        renderer: &MeshRenderer,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        skeleton: &mut SkeletonMesh,
    ) {
        for (i, mesh) in skeleton.meshes_mut().enumerate() {
            if self.meshes.len() <= i {
                self.meshes.push(GpuMesh::new(device));
            }
            renderer.upload(device, queue, mesh, &mut self.meshes[i]);
        }
    }

    pub fn render<'a>(
        &'a self,
        renderer: &'a MeshRenderer,
        pass: &mut wgpu::RenderPass<'a>,
        skeleton: &'a SkeletonMesh,
        textures: &'a dyn TextureProvider,
    ) {
        for (mesh, gpu) in skeleton.meshes().zip(&self.meshes) {
            renderer.render(pass, mesh, gpu, textures);
        }
    }
}

/// Line-list buffer for [`DebugGeometry`].
pub struct GpuDebugLines {
    buffer: wgpu::Buffer,
    capacity: usize,
    vertex_count: u32,
}

impl GpuDebugLines {
    pub fn new(device: &wgpu::Device) -> Self {
        let capacity = 1024;
        Self {
            buffer: create_line_buffer(device, capacity),
            capacity,
            vertex_count: 0,
        }
    }
}

fn create_line_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("spine2d-mesh debug lines"),
        size: (capacity * std::mem::size_of::<GpuLineVertex>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

impl MeshRenderer {
    pub fn new(device: &wgpu::Device, color_format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("spine2d-mesh-wgpu shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER.into()),
        });
        let line_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("spine2d-mesh-wgpu line shader"),
            source: wgpu::ShaderSource::Wgsl(LINE_SHADER.into()),
        });

        let globals_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("globals bind group layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("texture bind group layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("spine2d-mesh-wgpu pipeline layout"),
            bind_group_layouts: &[&globals_bind_group_layout, &texture_bind_group_layout],
            push_constant_ranges: &[],
        });
        let line_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("spine2d-mesh-wgpu line pipeline layout"),
            bind_group_layouts: &[&globals_bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipelines = create_pipelines(device, &pipeline_layout, &shader, color_format, false);
        let pipelines_pma = create_pipelines(device, &pipeline_layout, &shader, color_format, true);
        let line_pipeline =
            create_line_pipeline(device, &line_pipeline_layout, &line_shader, color_format);

        let globals = Globals {
            clip_from_world: [[0.0; 4]; 4],
        };
        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globals buffer"),
            contents: bytemuck::bytes_of(&globals),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals bind group"),
            layout: &globals_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        Self {
            pipelines,
            pipelines_pma,
            line_pipeline,
            globals_buffer,
            globals_bind_group,
            texture_bind_group_layout,
        }
    }

    pub fn texture_bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.texture_bind_group_layout
    }

    /// World coordinates as centered pixels: x in [-w/2,w/2], y in [-h/2,h/2]. Batch depth is
    /// flattened, so draw order alone decides overlap.
    pub fn update_globals_ortho_centered(&self, queue: &wgpu::Queue, width: f32, height: f32) {
        let clip_from_world = glam::Mat4::from_scale(glam::Vec3::new(
            2.0 / width.max(1.0),
            2.0 / height.max(1.0),
            0.0,
        ));
        self.update_globals_matrix(queue, clip_from_world);
    }

    pub fn update_globals_matrix(&self, queue: &wgpu::Queue, clip_from_world: glam::Mat4) {
        let globals = Globals {
            clip_from_world: clip_from_world.to_cols_array_2d(),
        };
        queue.write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));
    }

    /// Copies `mesh` into `gpu` when it changed since the last upload.
    pub fn upload(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        mesh: &mut BatchedMesh,
        gpu: &mut GpuMesh,
    ) {
        if !mesh.needs_upload() && gpu.uploaded_version == Some(mesh.version()) {
            return;
        }

        let layout = mesh.layout();
        gpu.staging.clear();
        gpu.staging.extend(
            mesh.vertices()
                .chunks_exact(layout.stride())
                .map(|v| to_gpu_vertex(v, layout)),
        );

        gpu.ensure_buffers(device, gpu.staging.len(), mesh.indices().len());
        if !gpu.staging.is_empty() {
            queue.write_buffer(&gpu.vertex_buffer, 0, bytemuck::cast_slice(&gpu.staging));
        }
        if !mesh.indices().is_empty() {
            queue.write_buffer(&gpu.index_buffer, 0, bytemuck::cast_slice(mesh.indices()));
        }

        gpu.uploaded_version = Some(mesh.version());
        mesh.mark_uploaded();
    }

    /// Issues one indexed draw per material group.
    pub fn render<'a>(
        &'a self,
        pass: &mut wgpu::RenderPass<'a>,
        mesh: &'a BatchedMesh,
        gpu: &'a GpuMesh,
        textures: &'a dyn TextureProvider,
    ) {
        if !mesh.is_visible() || mesh.is_empty() {
            return;
        }
        if gpu.uploaded_version != Some(mesh.version()) {
            log::warn!("rendering mesh version {} before upload", mesh.version());
            return;
        }

        pass.set_bind_group(0, &self.globals_bind_group, &[]);
        pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
        pass.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

        for group in mesh.groups() {
            let pipeline = if group.key.premultiplied_alpha {
                self.pipelines_pma.by_blend(group.key.blend)
            } else {
                self.pipelines.by_blend(group.key.blend)
            };
            pass.set_pipeline(pipeline);
            let Some(bind_group) = textures.bind_group_for(group.key.texture) else {
                log::warn!("no bind group for texture {}", group.key.texture.0);
                continue;
            };
            pass.set_bind_group(1, bind_group, &[]);
            pass.draw_indexed(group.range.clone(), 0, 0..1);
        }
    }

    pub fn upload_debug(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        geometry: &DebugGeometry,
        gpu: &mut GpuDebugLines,
    ) {
        let vertices: Vec<GpuLineVertex> = geometry
            .vertices
            .iter()
            .map(|v| GpuLineVertex {
                position: v.position,
                color: v.color,
            })
            .collect();

        if vertices.len() > gpu.capacity {
            while gpu.capacity < vertices.len() {
                gpu.capacity *= 2;
            }
            gpu.buffer = create_line_buffer(device, gpu.capacity);
        }
        if !vertices.is_empty() {
            queue.write_buffer(&gpu.buffer, 0, bytemuck::cast_slice(&vertices));
        }
        gpu.vertex_count = vertices.len() as u32;
    }

    pub fn render_debug<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>, gpu: &'a GpuDebugLines) {
        if gpu.vertex_count == 0 {
            return;
        }
        pass.set_pipeline(&self.line_pipeline);
        pass.set_bind_group(0, &self.globals_bind_group, &[]);
        pass.set_vertex_buffer(0, gpu.buffer.slice(..));
        pass.draw(0..gpu.vertex_count, 0..1);
    }
}

fn to_gpu_vertex(v: &[f32], layout: VertexLayout) -> GpuVertex {
    let p = VertexLayout::POSITION_OFFSET;
    let t = VertexLayout::UV_OFFSET;
    let c = VertexLayout::COLOR_OFFSET;
    let dark_color = if layout.two_color_tint {
        let d = VertexLayout::DARK_COLOR_OFFSET;
        [v[d], v[d + 1], v[d + 2], v[d + 3]]
    } else {
        NO_DARK_COLOR
    };
    GpuVertex {
        position: [v[p], v[p + 1], v[p + 2]],
        uv: [v[t], v[t + 1]],
        color: [v[c], v[c + 1], v[c + 2], v[c + 3]],
        dark_color,
    }
}

fn create_pipelines(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    color_format: wgpu::TextureFormat,
    premultiplied_alpha: bool,
) -> Pipelines {
    let create = |blend| {
        create_pipeline(
            device,
            layout,
            shader,
            color_format,
            blend,
            premultiplied_alpha,
        )
    };
    Pipelines {
        normal: create(BlendMode::Normal),
        additive: create(BlendMode::Additive),
        multiply: create(BlendMode::Multiply),
        screen: create(BlendMode::Screen),
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    color_format: wgpu::TextureFormat,
    blend: BlendMode,
    premultiplied_alpha: bool,
) -> wgpu::RenderPipeline {
    let label = match (blend, premultiplied_alpha) {
        (BlendMode::Normal, false) => "spine2d-mesh-wgpu pipeline normal",
        (BlendMode::Additive, false) => "spine2d-mesh-wgpu pipeline additive",
        (BlendMode::Multiply, false) => "spine2d-mesh-wgpu pipeline multiply",
        (BlendMode::Screen, false) => "spine2d-mesh-wgpu pipeline screen",
        (BlendMode::Normal, true) => "spine2d-mesh-wgpu pipeline normal pma",
        (BlendMode::Additive, true) => "spine2d-mesh-wgpu pipeline additive pma",
        (BlendMode::Multiply, true) => "spine2d-mesh-wgpu pipeline multiply pma",
        (BlendMode::Screen, true) => "spine2d-mesh-wgpu pipeline screen pma",
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<GpuVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![
                    0 => Float32x3,
                    1 => Float32x2,
                    2 => Float32x4,
                    3 => Float32x4
                ],
            }],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(blend_state(blend, premultiplied_alpha)),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn create_line_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    color_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("spine2d-mesh-wgpu debug line pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<GpuLineVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![
                    0 => Float32x2,
                    1 => Float32x4
                ],
            }],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::LineList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn blend_state(blend: BlendMode, premultiplied_alpha: bool) -> wgpu::BlendState {
    use wgpu::{BlendComponent, BlendFactor, BlendOperation};

    // Same factors as spine-webgl:
    // glBlendFuncSeparate(srcColorBlend, dstBlend, ONE, dstBlend).
    let (src_color, dst) = match blend {
        BlendMode::Normal => (
            src_color_for_alpha(premultiplied_alpha),
            BlendFactor::OneMinusSrcAlpha,
        ),
        BlendMode::Additive => (src_color_for_alpha(premultiplied_alpha), BlendFactor::One),
        BlendMode::Multiply => (BlendFactor::Dst, BlendFactor::OneMinusSrcAlpha),
        BlendMode::Screen => (BlendFactor::One, BlendFactor::OneMinusSrc),
    };

    wgpu::BlendState {
        color: BlendComponent {
            src_factor: src_color,
            dst_factor: dst,
            operation: BlendOperation::Add,
        },
        alpha: BlendComponent {
            src_factor: BlendFactor::One,
            dst_factor: dst,
            operation: BlendOperation::Add,
        },
    }
}

fn src_color_for_alpha(premultiplied_alpha: bool) -> wgpu::BlendFactor {
    if premultiplied_alpha {
        wgpu::BlendFactor::One
    } else {
        wgpu::BlendFactor::SrcAlpha
    }
}

pub trait TextureProvider {
    fn bind_group_for(&self, texture: TextureId) -> Option<&wgpu::BindGroup>;
}

pub struct HashMapTextureProvider {
    pub bind_groups: std::collections::HashMap<TextureId, wgpu::BindGroup>,
}

impl TextureProvider for HashMapTextureProvider {
    fn bind_group_for(&self, texture: TextureId) -> Option<&wgpu::BindGroup> {
        self.bind_groups.get(&texture)
    }
}

pub fn create_texture_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("spine2d-mesh texture bind group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}

pub fn create_sampler(
    device: &wgpu::Device,
    filter: wgpu::FilterMode,
    address_mode: wgpu::AddressMode,
) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("spine2d-mesh sampler"),
        mag_filter: filter,
        min_filter: filter,
        address_mode_u: address_mode,
        address_mode_v: address_mode,
        ..Default::default()
    })
}

const SHADER: &str = r#"
struct Globals {
  clip_from_world: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

struct VsIn {
  @location(0) position: vec3<f32>,
  @location(1) uv: vec2<f32>,
  @location(2) light_color: vec4<f32>,
  @location(3) dark_color: vec4<f32>,
};

struct VsOut {
  @builtin(position) position: vec4<f32>,
  @location(0) uv: vec2<f32>,
  @location(1) light_color: vec4<f32>,
  @location(2) dark_color: vec4<f32>,
};

@vertex
fn vs_main(in: VsIn) -> VsOut {
  var out: VsOut;
  out.position = globals.clip_from_world * vec4<f32>(in.position, 1.0);
  out.uv = in.uv;
  out.light_color = in.light_color;
  out.dark_color = in.dark_color;
  return out;
}

@group(1) @binding(0)
var tex: texture_2d<f32>;

@group(1) @binding(1)
var samp: sampler;

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
  let tex_color = textureSample(tex, samp, in.uv);
  let alpha = tex_color.a * in.light_color.a;
  let rgb = ((tex_color.a - 1.0) * in.dark_color.a + 1.0 - tex_color.rgb) * in.dark_color.rgb
    + tex_color.rgb * in.light_color.rgb;
  return vec4<f32>(rgb, alpha);
}
"#;

const LINE_SHADER: &str = r#"
struct Globals {
  clip_from_world: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> globals: Globals;

struct VsOut {
  @builtin(position) position: vec4<f32>,
  @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(@location(0) position: vec2<f32>, @location(1) color: vec4<f32>) -> VsOut {
  var out: VsOut;
  out.position = globals.clip_from_world * vec4<f32>(position, 0.0, 1.0);
  out.color = color;
  return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
  return in.color;
}
"#;
