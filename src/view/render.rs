use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::config::SceneConfig;
use crate::model::material::{AMBIENT_INTENSITY, ATTENUATION_FACTOR, BASE_COLOR, LIGHT_POSITION, TIME};
use crate::model::{ObjectId, PerspectiveCamera, RenderableObject, SceneGraph, ShaderProgram};
use crate::utils::{MeshBuffer, Vertex};
use crate::view::GpuContext;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Something that can draw a [`SceneGraph`] from a camera.
pub trait SceneRenderer {
    fn set_size(&mut self, width: u32, height: u32);
    fn size(&self) -> (u32, u32);
    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera);
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub eye: [f32; 3],
    pub _pad: f32,
}

impl CameraUniform {
    pub fn from_camera(camera: &PerspectiveCamera) -> Self {
        Self {
            view_proj: camera.view_proj().to_cols_array_2d(),
            eye: camera.position.to_array(),
            _pad: 0.0,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct CubeUniform {
    pub model: [[f32; 4]; 4],
    pub time: f32,
    pub _pad: [f32; 3],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct AlphabetUniform {
    pub model: [[f32; 4]; 4],
    pub light_position: [f32; 3],
    pub ambient_intensity: f32,
    pub base_color: [f32; 3],
    pub _pad: f32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DigitUniform {
    pub model: [[f32; 4]; 4],
    pub light_position: [f32; 3],
    pub ambient_intensity: f32,
    pub base_color: [f32; 3],
    pub attenuation_factor: f32,
}

/// Per-object uniform block, laid out for the object's shader program.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjectUniform {
    Cube(CubeUniform),
    Alphabet(AlphabetUniform),
    Digit(DigitUniform),
}

/// Largest of the per-object blocks; every object buffer gets this size.
pub const OBJECT_UNIFORM_SIZE: u64 = std::mem::size_of::<DigitUniform>() as u64;

impl ObjectUniform {
    /// Pack the object's material, resolving live references against `scene`.
    /// Missing values fall back to zero, except colors which fall back to white.
    pub fn pack(object: &RenderableObject, scene: &SceneGraph) -> Self {
        let material = &object.material;
        let model = object.model_matrix().to_cols_array_2d();
        let float = |name: &str| material.float(name, scene).unwrap_or(0.0);
        let vec3 = |name: &str, fallback: Vec3| material.vec3(name, scene).unwrap_or(fallback).to_array();

        match material.program {
            ShaderProgram::Cube => ObjectUniform::Cube(CubeUniform { model, time: float(TIME), _pad: [0.0; 3] }),
            ShaderProgram::Alphabet => ObjectUniform::Alphabet(AlphabetUniform {
                model,
                light_position: vec3(LIGHT_POSITION, Vec3::ZERO),
                ambient_intensity: float(AMBIENT_INTENSITY),
                base_color: vec3(BASE_COLOR, Vec3::ONE),
                _pad: 0.0,
            }),
            ShaderProgram::Digit => ObjectUniform::Digit(DigitUniform {
                model,
                light_position: vec3(LIGHT_POSITION, Vec3::ZERO),
                ambient_intensity: float(AMBIENT_INTENSITY),
                base_color: vec3(BASE_COLOR, Vec3::ONE),
                attenuation_factor: float(ATTENUATION_FACTOR),
            }),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ObjectUniform::Cube(u) => bytemuck::bytes_of(u),
            ObjectUniform::Alphabet(u) => bytemuck::bytes_of(u),
            ObjectUniform::Digit(u) => bytemuck::bytes_of(u),
        }
    }

    pub fn light_position(&self) -> Option<Vec3> {
        match self {
            ObjectUniform::Cube(_) => None,
            ObjectUniform::Alphabet(u) => Some(Vec3::from_array(u.light_position)),
            ObjectUniform::Digit(u) => Some(Vec3::from_array(u.light_position)),
        }
    }
}

fn shader_source(program: ShaderProgram) -> &'static str {
    match program {
        ShaderProgram::Cube => include_str!("shaders/cube.wgsl"),
        ShaderProgram::Alphabet => include_str!("shaders/alphabet.wgsl"),
        ShaderProgram::Digit => include_str!("shaders/digit.wgsl"),
    }
}

fn uniform_layout_entry() -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding: 0,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

pub fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d { width: width.max(1), height: height.max(1), depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    depth_texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    layout: &wgpu::PipelineLayout,
    program: ShaderProgram,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(program.label()),
        source: wgpu::ShaderSource::Wgsl(shader_source(program).into()),
    });

    // Extruded glyph caps can contain slivers of either winding.
    let cull_mode = match program {
        ShaderProgram::Cube => Some(wgpu::Face::Back),
        ShaderProgram::Alphabet | ShaderProgram::Digit => None,
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(program.label()),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
        multiview: None,
        cache: None,
    })
}

/// GPU-side copy of one scene object.
struct GpuObject {
    mesh: MeshBuffer,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// wgpu implementation of [`SceneRenderer`].
///
/// Meshes are uploaded the first time an object is drawn. Uniforms are
/// rewritten every frame.
pub struct WgpuRenderer {
    gpu: GpuContext,
    clear_color: wgpu::Color,
    depth_view: wgpu::TextureView,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    pipelines: HashMap<ShaderProgram, wgpu::RenderPipeline>,
    objects: HashMap<ObjectId, GpuObject>,
}

impl WgpuRenderer {
    pub fn new(gpu: GpuContext, config: &SceneConfig) -> Self {
        let device = &gpu.device;
        let (width, height) = gpu.size();

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("camera_buffer"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("camera_bind_group_layout"),
            entries: &[uniform_layout_entry()],
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera_bind_group"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry { binding: 0, resource: camera_buffer.as_entire_binding() }],
        });
        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object_bind_group_layout"),
            entries: &[uniform_layout_entry()],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&camera_layout, &object_layout],
            push_constant_ranges: &[],
        });
        let pipelines = ShaderProgram::ALL
            .into_iter()
            .map(|program| (program, create_pipeline(device, gpu.format, &pipeline_layout, program)))
            .collect();

        let depth_view = create_depth_texture(device, width, height);
        let [r, g, b, a] = config.clear_color;
        tracing::info!(width, height, format = ?gpu.format, "renderer ready");

        Self {
            clear_color: wgpu::Color { r, g, b, a },
            depth_view,
            camera_buffer,
            camera_bind_group,
            object_layout,
            pipelines,
            objects: HashMap::new(),
            gpu,
        }
    }

    fn upload_object(&self, id: ObjectId, object: &RenderableObject) -> GpuObject {
        let device = &self.gpu.device;
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(object.name.as_str()),
            size: OBJECT_UNIFORM_SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(object.name.as_str()),
            layout: &self.object_layout,
            entries: &[wgpu::BindGroupEntry { binding: 0, resource: uniform_buffer.as_entire_binding() }],
        });
        tracing::debug!(id = id.index(), name = %object.name, triangles = object.geometry.triangle_count(), "uploading mesh");
        GpuObject { mesh: object.geometry.upload(device), uniform_buffer, bind_group }
    }
}

impl SceneRenderer for WgpuRenderer {
    fn set_size(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == self.gpu.size() {
            return;
        }
        self.gpu.resize(width, height);
        self.depth_view = create_depth_texture(&self.gpu.device, width, height);
    }

    fn size(&self) -> (u32, u32) {
        self.gpu.size()
    }

    fn render(&mut self, scene: &SceneGraph, camera: &PerspectiveCamera) {
        for (id, object) in scene.iter() {
            if object.geometry.is_empty() {
                continue;
            }
            if !self.objects.contains_key(&id) {
                let uploaded = self.upload_object(id, object);
                self.objects.insert(id, uploaded);
            }
            if let Some(gpu_object) = self.objects.get(&id) {
                let packed = ObjectUniform::pack(object, scene);
                self.gpu.queue.write_buffer(&gpu_object.uniform_buffer, 0, packed.as_bytes());
            }
        }
        self.gpu
            .queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(&CameraUniform::from_camera(camera)));

        let frame = match self.gpu.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("surface lost, reconfiguring");
                self.gpu.reconfigure();
                return;
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::warn!("timed out acquiring a frame");
                return;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to acquire a frame");
                return;
            }
        };

        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("encoder") });

        {
            let mut rp = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations { load: wgpu::LoadOp::Clear(self.clear_color), store: wgpu::StoreOp::Store },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations { load: wgpu::LoadOp::Clear(1.0), store: wgpu::StoreOp::Store }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rp.set_bind_group(0, &self.camera_bind_group, &[]);
            for (id, object) in scene.iter() {
                let (Some(gpu_object), Some(pipeline)) =
                    (self.objects.get(&id), self.pipelines.get(&object.material.program))
                else {
                    continue;
                };
                rp.set_pipeline(pipeline);
                rp.set_bind_group(1, &gpu_object.bind_group, &[]);
                rp.set_vertex_buffer(0, gpu_object.mesh.vertex_buffer.slice(..));
                rp.set_index_buffer(gpu_object.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                rp.draw_indexed(0..gpu_object.mesh.index_count, 0, 0..1);
            }
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }
}
