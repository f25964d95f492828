use std::collections::BTreeSet;

use atrium_scene::{OrbitCamera, SceneConfig};
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};
use wgpu::util::DeviceExt;

use crate::counters::FrameCounters;
use crate::mesh::{self, QuadVertex, RoomVertex, Vertex};
use crate::shaders;

/// Height the shadow decals sit above the floor plane before the
/// configured bias is applied.
const SHADOW_LIFT: f32 = 0.01;

/// Furnishings flatter than this cast no contact shadow (rugs).
const SHADOW_MIN_HEIGHT: f32 = 0.1;

const MAX_INSTANCES: u32 = 256;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    ambient: [f32; 4],
    sun_dir: [f32; 4],
    point_pos: [f32; 4],
    point_color: [f32; 4],
    params: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct ShadowInstance {
    center_radius: [f32; 4],
}

fn build_uniforms(camera: &OrbitCamera, scene: &SceneConfig) -> Uniforms {
    let lighting = &scene.lighting;
    let sun = lighting.directional_direction();
    let point = lighting.point_position;
    Uniforms {
        view_proj: camera.view_projection().to_cols_array_2d(),
        ambient: [1.0, 1.0, 1.0, lighting.ambient_intensity],
        sun_dir: [sun.x, sun.y, sun.z, lighting.directional_intensity],
        point_pos: [point.x, point.y, point.z, lighting.point_intensity],
        point_color: [
            lighting.point_color[0],
            lighting.point_color[1],
            lighting.point_color[2],
            if lighting.is_baked() { 1.0 } else { 0.0 },
        ],
        // The bias nudges the decals off the floor plane.
        params: [
            SHADOW_LIFT - lighting.shadow_bias,
            scene.contact_shadows.opacity,
            0.0,
            0.0,
        ],
    }
}

/// One instance per furnishing: a unit cube scaled to the item's extents,
/// translated so its base sits on the floor.
fn build_instances(scene: &SceneConfig) -> Vec<InstanceData> {
    scene
        .furnishings
        .iter()
        .take(MAX_INSTANCES as usize)
        .map(|f| {
            let center = f.position + Vec3::new(0.0, f.size.y / 2.0, 0.0);
            let model = Mat4::from_scale_rotation_translation(f.size, Quat::IDENTITY, center);
            let cols = model.to_cols_array_2d();
            InstanceData {
                model_0: cols[0],
                model_1: cols[1],
                model_2: cols[2],
                model_3: cols[3],
                color: f.color,
            }
        })
        .collect()
}

fn build_shadow_instances(scene: &SceneConfig) -> Vec<ShadowInstance> {
    scene
        .furnishings
        .iter()
        .filter(|f| f.size.y >= SHADOW_MIN_HEIGHT)
        .take(MAX_INSTANCES as usize)
        .map(|f| {
            let radius = f.size.x.max(f.size.z) / 2.0 * scene.contact_shadows.scale;
            ShadowInstance {
                center_radius: [f.position.x, f.position.y, f.position.z, radius],
            }
        })
        .collect()
}

/// Distinct materials in the scene: unique furnishing colors plus the two
/// room surfaces.
fn material_count(scene: &SceneConfig) -> u32 {
    let mut colors: BTreeSet<[u32; 4]> = BTreeSet::new();
    colors.insert(scene.room.floor_color.map(f32::to_bits));
    colors.insert(scene.room.wall_color.map(f32::to_bits));
    for f in &scene.furnishings {
        colors.insert(f.color.map(f32::to_bits));
    }
    colors.len() as u32
}

/// wgpu renderer for the furnished room.
pub struct RoomRenderer {
    room_pipeline: wgpu::RenderPipeline,
    furnish_pipeline: wgpu::RenderPipeline,
    shadow_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    room_vertex_buffer: wgpu::Buffer,
    room_index_buffer: wgpu::Buffer,
    room_index_count: u32,
    cube_vertex_buffer: wgpu::Buffer,
    cube_index_buffer: wgpu::Buffer,
    cube_index_count: u32,
    quad_vertex_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    shadow_instance_buffer: wgpu::Buffer,
    depth_texture: wgpu::TextureView,
    counters: FrameCounters,
}

impl RoomRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        scene: &SceneConfig,
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&Uniforms {
                view_proj: Mat4::IDENTITY.to_cols_array_2d(),
                ambient: [0.0; 4],
                sun_dir: [0.0; 4],
                point_pos: [0.0; 4],
                point_color: [0.0; 4],
                params: [0.0; 4],
            }),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
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

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let scene_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SCENE_SHADER.into()),
        });

        let depth_stencil = wgpu::DepthStencilState {
            format: wgpu::TextureFormat::Depth32Float,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: Default::default(),
            bias: Default::default(),
        };

        // Room shell: walls are seen from inside, so no culling.
        let room_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("room_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &scene_shader,
                entry_point: Some("vs_room"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<RoomVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x3,
                        2 => Float32x4,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &scene_shader,
                entry_point: Some("fs_room"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(depth_stencil.clone()),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let furnish_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("furnish_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &scene_shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![
                            0 => Float32x3,
                            1 => Float32x3,
                        ],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceData>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            2 => Float32x4,
                            3 => Float32x4,
                            4 => Float32x4,
                            5 => Float32x4,
                            6 => Float32x4,
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &scene_shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(depth_stencil.clone()),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let shadow_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shadow_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SHADOW_SHADER.into()),
        });

        // Shadow decals blend over the floor and never write depth.
        let shadow_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("shadow_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shadow_shader,
                entry_point: Some("vs_shadow"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<QuadVertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![0 => Float32x2],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<ShadowInstance>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![1 => Float32x4],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shadow_shader,
                entry_point: Some("fs_shadow"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::LessEqual,
                ..depth_stencil
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let (room_verts, room_indices) = mesh::room_mesh(&scene.room);
        let room_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("room_vertex_buffer"),
            contents: bytemuck::cast_slice(&room_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let room_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("room_index_buffer"),
            contents: bytemuck::cast_slice(&room_indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let room_index_count = room_indices.len() as u32;

        let (cube_verts, cube_indices) = mesh::cube_mesh();
        let cube_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_vertex_buffer"),
            contents: bytemuck::cast_slice(&cube_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let cube_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube_index_buffer"),
            contents: bytemuck::cast_slice(&cube_indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let cube_index_count = cube_indices.len() as u32;

        let quad_verts = mesh::shadow_quad();
        let quad_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("quad_vertex_buffer"),
            contents: bytemuck::cast_slice(&quad_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (MAX_INSTANCES as u64) * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let shadow_instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("shadow_instance_buffer"),
            size: (MAX_INSTANCES as u64) * std::mem::size_of::<ShadowInstance>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_texture = Self::create_depth_texture(device, width, height);

        let mut counters = FrameCounters::default();
        // Three geometry buffers (room, cube, shadow quad), one depth texture.
        counters.set_resources(3, 1, material_count(scene));

        tracing::debug!(
            furnishings = scene.furnishings.len(),
            materials = material_count(scene),
            "room renderer created"
        );

        Self {
            room_pipeline,
            furnish_pipeline,
            shadow_pipeline,
            uniform_buffer,
            uniform_bind_group,
            room_vertex_buffer,
            room_index_buffer,
            room_index_count,
            cube_vertex_buffer,
            cube_index_buffer,
            cube_index_count,
            quad_vertex_buffer,
            instance_buffer,
            shadow_instance_buffer,
            depth_texture,
            counters,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    /// Live counters for the frame most recently submitted.
    pub fn counters(&self) -> &FrameCounters {
        &self.counters
    }

    /// Render one frame: room shell, furnishings, contact shadows.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        camera: &OrbitCamera,
        scene: &SceneConfig,
    ) {
        self.counters.begin_frame();

        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&build_uniforms(camera, scene)),
        );

        let instances = build_instances(scene);
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let draw_shadows = scene.contact_shadows.enabled && !scene.lighting.is_baked();
        let shadows = if draw_shadows {
            build_shadow_instances(scene)
        } else {
            Vec::new()
        };
        if !shadows.is_empty() {
            queue.write_buffer(
                &self.shadow_instance_buffer,
                0,
                bytemuck::cast_slice(&shadows),
            );
        }

        let [r, g, b] = scene.background;
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
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
                ..Default::default()
            });

            pass.set_pipeline(&self.room_pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(0, self.room_vertex_buffer.slice(..));
            pass.set_index_buffer(self.room_index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            pass.draw_indexed(0..self.room_index_count, 0, 0..1);
            self.counters.record_draw(self.room_index_count as u64 / 3);

            if !instances.is_empty() {
                pass.set_pipeline(&self.furnish_pipeline);
                pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                pass.set_vertex_buffer(0, self.cube_vertex_buffer.slice(..));
                pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                pass.set_index_buffer(self.cube_index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..self.cube_index_count, 0, 0..instances.len() as u32);
                self.counters
                    .record_draw(self.cube_index_count as u64 / 3 * instances.len() as u64);
            }

            if !shadows.is_empty() {
                pass.set_pipeline(&self.shadow_pipeline);
                pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                pass.set_vertex_buffer(0, self.quad_vertex_buffer.slice(..));
                pass.set_vertex_buffer(1, self.shadow_instance_buffer.slice(..));
                pass.draw(0..6, 0..shadows.len() as u32);
                self.counters.record_draw(2 * shadows.len() as u64);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));

        self.counters.set_resources(3, 1, material_count(scene));
    }

    fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
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
        texture.create_view(&Default::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atrium_scene::{Furnishing, LightingMode};

    #[test]
    fn one_instance_per_furnishing() {
        let scene = SceneConfig::living_room();
        let instances = build_instances(&scene);
        assert_eq!(instances.len(), scene.furnishings.len());
    }

    #[test]
    fn instance_base_sits_on_the_floor() {
        let mut scene = SceneConfig::living_room();
        scene.furnishings = vec![Furnishing::new(
            "crate",
            Vec3::new(1.0, 0.0, -1.0),
            Vec3::new(2.0, 1.0, 2.0),
            [1.0, 1.0, 1.0, 1.0],
        )];
        let inst = &build_instances(&scene)[0];
        // Translation lives in the fourth column; the box center is at
        // half its height.
        assert_eq!(inst.model_3, [1.0, 0.5, -1.0, 1.0]);
    }

    #[test]
    fn flat_furnishings_cast_no_contact_shadow() {
        let scene = SceneConfig::living_room();
        let shadows = build_shadow_instances(&scene);
        let tall = scene
            .furnishings
            .iter()
            .filter(|f| f.size.y >= SHADOW_MIN_HEIGHT)
            .count();
        assert_eq!(shadows.len(), tall);
        assert!(shadows.len() < scene.furnishings.len());
    }

    #[test]
    fn shadow_radius_scales_with_footprint() {
        let mut scene = SceneConfig::living_room();
        scene.contact_shadows.scale = 2.0;
        scene.furnishings = vec![Furnishing::new(
            "crate",
            Vec3::ZERO,
            Vec3::new(1.0, 1.0, 3.0),
            [1.0, 1.0, 1.0, 1.0],
        )];
        let shadows = build_shadow_instances(&scene);
        assert_eq!(shadows[0].center_radius[3], 3.0);
    }

    #[test]
    fn material_count_includes_room_surfaces() {
        let scene = SceneConfig::living_room();
        // Every furnishing color is distinct, plus floor and wall.
        assert_eq!(
            material_count(&scene),
            scene.furnishings.len() as u32 + 2
        );
    }

    #[test]
    fn duplicate_colors_count_once() {
        let mut scene = SceneConfig::living_room();
        let color = [0.5, 0.5, 0.5, 1.0];
        scene.furnishings = vec![
            Furnishing::new("a", Vec3::ZERO, Vec3::ONE, color),
            Furnishing::new("b", Vec3::X, Vec3::ONE, color),
        ];
        assert_eq!(material_count(&scene), 3);
    }

    #[test]
    fn baked_mode_is_flagged_in_uniforms() {
        let mut scene = SceneConfig::living_room();
        let camera = OrbitCamera::from_config(&scene.camera, 1.0);

        let dynamic = build_uniforms(&camera, &scene);
        assert_eq!(dynamic.point_color[3], 0.0);

        scene.lighting.mode = LightingMode::Baked;
        let baked = build_uniforms(&camera, &scene);
        assert_eq!(baked.point_color[3], 1.0);
    }

    #[test]
    fn shadow_bias_shifts_the_decal_lift() {
        let scene = SceneConfig::living_room();
        let camera = OrbitCamera::from_config(&scene.camera, 1.0);
        let uniforms = build_uniforms(&camera, &scene);
        // Default bias is -0.001, so the lift lands just above the base.
        assert!((uniforms.params[0] - 0.011).abs() < 1e-6);
    }
}
