/// WGSL for the room shell and the instanced furnishings.
///
/// Both entry-point pairs share the uniform block and the `shade`
/// function. The baked path lights with bake-time constants and ignores
/// the live parameters entirely.
pub(crate) const SCENE_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    ambient: vec4<f32>,      // rgb tint, w intensity
    sun_dir: vec4<f32>,      // xyz direction, w intensity
    point_pos: vec4<f32>,    // xyz position, w intensity
    point_color: vec4<f32>,  // rgb, w = 1.0 when baked
    params: vec4<f32>,       // x shadow lift, y shadow opacity
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

const BAKED_AMBIENT: vec3<f32> = vec3<f32>(0.42, 0.39, 0.36);
const BAKED_SUN_DIR: vec3<f32> = vec3<f32>(-0.4677, -0.7483, -0.4677);
const BAKED_SUN: f32 = 1.2;
const BAKED_WARMTH: vec3<f32> = vec3<f32>(1.0, 0.9, 0.78);

fn shade(n_in: vec3<f32>, world_pos: vec3<f32>, albedo: vec3<f32>) -> vec3<f32> {
    let n = normalize(n_in);

    if (uniforms.point_color.w > 0.5) {
        let sun = max(dot(n, -BAKED_SUN_DIR), 0.0) * BAKED_SUN;
        return albedo * BAKED_WARMTH * (BAKED_AMBIENT + vec3<f32>(sun));
    }

    let sun = max(dot(n, -uniforms.sun_dir.xyz), 0.0) * uniforms.sun_dir.w;
    let to_point = uniforms.point_pos.xyz - world_pos;
    let falloff = uniforms.point_pos.w / (1.0 + 0.15 * dot(to_point, to_point));
    let point = max(dot(n, normalize(to_point)), 0.0) * falloff;
    let light = uniforms.ambient.rgb * uniforms.ambient.w
        + vec3<f32>(sun)
        + uniforms.point_color.rgb * point;
    return albedo * light;
}

// --- Room shell: per-vertex surface color ---

struct RoomVertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) color: vec4<f32>,
};

struct RoomVertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) color: vec4<f32>,
};

@vertex
fn vs_room(vertex: RoomVertexInput) -> RoomVertexOutput {
    var out: RoomVertexOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(vertex.position, 1.0);
    out.world_pos = vertex.position;
    out.world_normal = vertex.normal;
    out.color = vertex.color;
    return out;
}

@fragment
fn fs_room(in: RoomVertexOutput) -> @location(0) vec4<f32> {
    let lit = shade(in.world_normal, in.world_pos, in.color.rgb);
    return vec4<f32>(lit, in.color.a);
}

// --- Furnishings: instanced unit cubes ---

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) color: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);
    let world_normal = (model * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.world_pos = world_pos.xyz;
    out.world_normal = world_normal;
    out.color = instance.color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let lit = shade(in.world_normal, in.world_pos, in.color.rgb);
    return vec4<f32>(lit, in.color.a);
}
"#;

/// WGSL for the contact-shadow discs under furnishings.
pub(crate) const SHADOW_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    ambient: vec4<f32>,
    sun_dir: vec4<f32>,
    point_pos: vec4<f32>,
    point_color: vec4<f32>,
    params: vec4<f32>,       // x shadow lift, y shadow opacity
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct ShadowOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_shadow(
    @location(0) corner: vec2<f32>,
    @location(1) center_radius: vec4<f32>,
) -> ShadowOutput {
    let radius = center_radius.w;
    let world = vec3<f32>(
        center_radius.x + corner.x * radius,
        uniforms.params.x,
        center_radius.z + corner.y * radius,
    );

    var out: ShadowOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(world, 1.0);
    out.uv = corner;
    return out;
}

@fragment
fn fs_shadow(in: ShadowOutput) -> @location(0) vec4<f32> {
    let d = length(in.uv);
    let alpha = uniforms.params.y * pow(clamp(1.0 - d, 0.0, 1.0), 1.5);
    return vec4<f32>(0.0, 0.0, 0.0, alpha);
}
"#;
