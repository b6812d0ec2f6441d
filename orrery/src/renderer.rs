//! wgpu renderer for the orrery
//!
//! Bodies, asteroids and background stars are all instanced billboards
//! shaded as spheres in the fragment shader. Orbit paths and ring systems
//! are line lists.

use common::{create_uniform_buffer, Camera3D, CameraUniform, GraphicsContext, LineVertex};
use glam::{Quat, Vec3};
use orrery::registry::{BodyId, BodyKind, BODIES};
use orrery::scene::{BodyNode, Orrery};
use std::f32::consts::TAU;
use wgpu::util::DeviceExt;

/// Segments per orbit or ring circle.
const CIRCLE_SEGMENTS: usize = 128;

/// Concentric circles drawn per ring system.
const RING_BANDS: usize = 12;

const KIND_STAR: u32 = 0;
const KIND_SOLID: u32 = 1;
const KIND_ASTEROID: u32 = 2;
const KIND_BACKGROUND: u32 = 3;

const FLAG_ATMOSPHERE: u32 = 1;
const FLAG_CLOUDS: u32 = 1 << 1;
const FLAG_SELECTED: u32 = 1 << 2;
const FLAG_BANDED: u32 = 1 << 3;

/// Per-instance billboard data
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BodyInstance {
    pub position: [f32; 3],
    pub radius: f32,
    pub color: [f32; 4],
    /// Body orientation as a quaternion (x, y, z, w).
    pub rotation: [f32; 4],
    pub kind: u32,
    pub flags: u32,
    pub _padding: [u32; 2],
}

impl BodyInstance {
    const ATTRIBS: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
        2 => Float32x3,
        3 => Float32,
        4 => Float32x4,
        5 => Float32x4,
        6 => Uint32,
        7 => Uint32,
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<BodyInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }

    fn point(position: Vec3, radius: f32, color: [f32; 4], kind: u32) -> Self {
        Self {
            position: position.to_array(),
            radius,
            color,
            rotation: Quat::IDENTITY.to_array(),
            kind,
            flags: 0,
            _padding: [0; 2],
        }
    }

    fn from_node(node: &BodyNode, selected: bool) -> Self {
        let config = node.config;
        let kind = match config.kind {
            BodyKind::Star => KIND_STAR,
            BodyKind::Planet | BodyKind::Moon => KIND_SOLID,
        };

        let mut flags = 0;
        if config.decorations.atmosphere {
            flags |= FLAG_ATMOSPHERE;
        }
        if config.decorations.clouds {
            flags |= FLAG_CLOUDS;
            // Clouds on a big planet read as gas-giant bands
            if config.visual_radius > 3.0 {
                flags |= FLAG_BANDED;
            }
        }
        if selected {
            flags |= FLAG_SELECTED;
        }

        Self {
            position: node.position().to_array(),
            radius: config.visual_radius,
            color: config.color,
            rotation: node.state.transform(config).rotation().to_array(),
            kind,
            flags,
            _padding: [0; 2],
        }
    }
}

/// Quad vertex for billboards
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
}

impl QuadVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

const QUAD_VERTICES: &[QuadVertex] = &[
    QuadVertex { position: [-1.0, -1.0] },
    QuadVertex { position: [1.0, -1.0] },
    QuadVertex { position: [1.0, 1.0] },
    QuadVertex { position: [-1.0, -1.0] },
    QuadVertex { position: [1.0, 1.0] },
    QuadVertex { position: [-1.0, 1.0] },
];

/// Counts produced by [`OrreryRenderer::update`] for the draw calls.
pub struct RenderData {
    pub instance_count: u32,
    pub line_vertex_count: u32,
}

pub struct OrreryRenderer {
    body_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    skybox_pipeline: wgpu::RenderPipeline,
    quad_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    line_buffer: wgpu::Buffer,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    depth_texture: wgpu::TextureView,
    max_instances: usize,
    max_line_vertices: usize,
}

impl OrreryRenderer {
    pub fn new(ctx: &GraphicsContext, camera: &Camera3D, max_instances: usize) -> Self {
        let device = &ctx.device;
        let max_line_vertices = BODIES.len() * (1 + RING_BANDS) * CIRCLE_SEGMENTS * 2;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Orrery Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/orrery.wgsl").into()),
        });

        let camera_buffer = create_uniform_buffer(device, &CameraUniform::from_camera_3d(camera));

        let camera_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Camera Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Camera Bind Group"),
            layout: &camera_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Orrery Pipeline Layout"),
            bind_group_layouts: &[&camera_bind_group_layout],
            push_constant_ranges: &[],
        });

        let depth_texture = Self::create_depth_texture(device, ctx.size.width, ctx.size.height);

        let depth_stencil_state = wgpu::DepthStencilState {
            format: wgpu::TextureFormat::Depth32Float,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        };

        let blended_target = [Some(wgpu::ColorTargetState {
            format: ctx.config.format,
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            write_mask: wgpu::ColorWrites::ALL,
        })];

        let body_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Body Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_body",
                buffers: &[QuadVertex::layout(), BodyInstance::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_body",
                targets: &blended_target,
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: Some(depth_stencil_state.clone()),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        // Lines test against depth but never hide what is drawn after them
        let line_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Line Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_line",
                buffers: &[LineVertex::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_line",
                targets: &blended_target,
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                depth_write_enabled: false,
                ..depth_stencil_state
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let skybox_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Skybox Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_skybox",
                buffers: &[],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_skybox",
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctx.config.format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let quad_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Quad Buffer"),
            contents: bytemuck::cast_slice(QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Instance Buffer"),
            size: (std::mem::size_of::<BodyInstance>() * max_instances.max(1)) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let line_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Line Buffer"),
            size: (std::mem::size_of::<LineVertex>() * max_line_vertices) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            body_pipeline,
            line_pipeline,
            skybox_pipeline,
            quad_buffer,
            instance_buffer,
            line_buffer,
            camera_buffer,
            camera_bind_group,
            depth_texture,
            max_instances,
            max_line_vertices,
        }
    }

    fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn update(
        &self,
        queue: &wgpu::Queue,
        camera: &Camera3D,
        orrery: &Orrery,
        selected: Option<BodyId>,
        show_orbits: bool,
    ) -> RenderData {
        let uniform = CameraUniform::from_camera_3d(camera);
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[uniform]));

        let instances = build_instances(camera, orrery, selected, self.max_instances);
        queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));

        let mut lines = Vec::with_capacity(self.max_line_vertices);
        if show_orbits {
            push_orbit_paths(&mut lines, orrery, selected);
        }
        push_rings(&mut lines, orrery);
        lines.truncate(self.max_line_vertices);
        if !lines.is_empty() {
            queue.write_buffer(&self.line_buffer, 0, bytemuck::cast_slice(&lines));
        }

        RenderData {
            instance_count: instances.len() as u32,
            line_vertex_count: lines.len() as u32,
        }
    }

    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView, data: &RenderData) {
        // Skybox (no depth)
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Skybox Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_pipeline(&self.skybox_pipeline);
            pass.set_bind_group(0, &self.camera_bind_group, &[]);
            pass.draw(0..3, 0..1);
        }

        // Scene with depth
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if data.instance_count > 0 {
                pass.set_pipeline(&self.body_pipeline);
                pass.set_bind_group(0, &self.camera_bind_group, &[]);
                pass.set_vertex_buffer(0, self.quad_buffer.slice(..));
                pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                pass.draw(0..6, 0..data.instance_count);
            }

            if data.line_vertex_count > 0 {
                pass.set_pipeline(&self.line_pipeline);
                pass.set_bind_group(0, &self.camera_bind_group, &[]);
                pass.set_vertex_buffer(0, self.line_buffer.slice(..));
                pass.draw(0..data.line_vertex_count, 0..1);
            }
        }
    }
}

/// Background stars, then asteroids, then bodies far to near so halos blend
/// over whatever sits behind them.
fn build_instances(
    camera: &Camera3D,
    orrery: &Orrery,
    selected: Option<BodyId>,
    max_instances: usize,
) -> Vec<BodyInstance> {
    let mut instances = Vec::with_capacity(max_instances);

    // Stars are pinned to the camera so they behave like a sky sphere.
    let starfield = &orrery.starfield;
    let star_size = starfield.distance * 0.0022;
    instances.extend(starfield.stars.iter().map(|star| {
        let b = star.brightness;
        BodyInstance::point(
            camera.position + starfield.position(star),
            star_size * (0.6 + b),
            [0.8 + 0.2 * b, 0.85 + 0.15 * b, 1.0, b],
            KIND_BACKGROUND,
        )
    }));

    let belt = &orrery.belt;
    instances.extend(belt.asteroids.iter().map(|asteroid| {
        BodyInstance::point(
            belt.position(asteroid),
            asteroid.scale,
            [0.55, 0.5, 0.45, 1.0],
            KIND_ASTEROID,
        )
    }));

    let mut bodies: Vec<&BodyNode> = orrery.bodies().iter().collect();
    bodies.sort_by(|a, b| {
        let da = a.position().distance_squared(camera.position);
        let db = b.position().distance_squared(camera.position);
        db.total_cmp(&da)
    });

    // Bodies go last so truncation drops decoration first.
    let room = max_instances.saturating_sub(bodies.len());
    instances.truncate(room);
    instances.extend(
        bodies
            .into_iter()
            .map(|node| BodyInstance::from_node(node, Some(node.id()) == selected)),
    );
    instances
}

fn push_circle(lines: &mut Vec<LineVertex>, center: Vec3, radius: f32, rotation: Quat, color: [f32; 4]) {
    let point = |i: usize| {
        let angle = i as f32 / CIRCLE_SEGMENTS as f32 * TAU;
        let local = Vec3::new(angle.sin() * radius, 0.0, angle.cos() * radius);
        (center + rotation * local).to_array()
    };
    for i in 0..CIRCLE_SEGMENTS {
        lines.push(LineVertex::new(point(i), color));
        lines.push(LineVertex::new(point(i + 1), color));
    }
}

fn push_orbit_paths(lines: &mut Vec<LineVertex>, orrery: &Orrery, selected: Option<BodyId>) {
    for node in orrery.bodies() {
        if node.config.is_stationary() {
            continue;
        }
        let [r, g, b, _] = node.config.color;
        let alpha = if Some(node.id()) == selected { 0.6 } else { 0.18 };
        push_circle(
            lines,
            orrery.orbit_center(node),
            node.config.orbital_radius,
            Quat::IDENTITY,
            [r, g, b, alpha],
        );
    }
}

fn push_rings(lines: &mut Vec<LineVertex>, orrery: &Orrery) {
    for node in orrery.bodies() {
        let Some(rings) = node.config.decorations.rings else {
            continue;
        };
        // Rings lie in the equatorial plane, so they tilt with the pole
        // but do not spin.
        let equator = node.state.transform(node.config).equator();
        for band in 0..RING_BANDS {
            let t = band as f32 / (RING_BANDS - 1) as f32;
            let radius = rings.inner + (rings.outer - rings.inner) * t;
            let mut color = rings.color;
            // Thin gap two thirds of the way out
            if (t - 0.66).abs() < 0.05 {
                color[3] *= 0.2;
            }
            push_circle(lines, node.position(), radius, equator, color);
        }
    }
}
