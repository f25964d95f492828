use atrium_scene::RoomShell;
use bytemuck::{Pod, Zeroable};

/// Vertex for instanced furnishing geometry.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub(crate) struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Vertex for the room shell, with a per-surface color baked in.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub(crate) struct RoomVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

/// Corner of the unit contact-shadow quad, in [-1, 1].
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub(crate) struct QuadVertex {
    pub corner: [f32; 2],
}

/// Generate unit cube vertices and indices, one quad per face.
pub(crate) fn cube_mesh() -> (Vec<Vertex>, Vec<u16>) {
    let p = 0.5_f32;
    #[rustfmt::skip]
    let vertices = vec![
        // +Z face
        Vertex { position: [-p, -p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [ p, -p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [ p,  p,  p], normal: [0.0, 0.0, 1.0] },
        Vertex { position: [-p,  p,  p], normal: [0.0, 0.0, 1.0] },
        // -Z face
        Vertex { position: [ p, -p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [-p, -p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [-p,  p, -p], normal: [0.0, 0.0, -1.0] },
        Vertex { position: [ p,  p, -p], normal: [0.0, 0.0, -1.0] },
        // +X face
        Vertex { position: [ p, -p,  p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p, -p, -p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p,  p, -p], normal: [1.0, 0.0, 0.0] },
        Vertex { position: [ p,  p,  p], normal: [1.0, 0.0, 0.0] },
        // -X face
        Vertex { position: [-p, -p, -p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p, -p,  p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p,  p,  p], normal: [-1.0, 0.0, 0.0] },
        Vertex { position: [-p,  p, -p], normal: [-1.0, 0.0, 0.0] },
        // +Y face
        Vertex { position: [-p,  p,  p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [ p,  p,  p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [ p,  p, -p], normal: [0.0, 1.0, 0.0] },
        Vertex { position: [-p,  p, -p], normal: [0.0, 1.0, 0.0] },
        // -Y face
        Vertex { position: [-p, -p, -p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [ p, -p, -p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [ p, -p,  p], normal: [0.0, -1.0, 0.0] },
        Vertex { position: [-p, -p,  p], normal: [0.0, -1.0, 0.0] },
    ];
    #[rustfmt::skip]
    let indices: Vec<u16> = vec![
        0,1,2, 2,3,0,       // +Z
        4,5,6, 6,7,4,       // -Z
        8,9,10, 10,11,8,    // +X
        12,13,14, 14,15,12, // -X
        16,17,18, 18,19,16, // +Y
        20,21,22, 22,23,20, // -Y
    ];
    (vertices, indices)
}

/// Generate the room shell: floor plus the two walls behind the scene.
///
/// The camera orbits in the +X/+Z quadrant, so only the -X and -Z walls
/// are built; the near sides stay open. Normals face into the room.
pub(crate) fn room_mesh(shell: &RoomShell) -> (Vec<RoomVertex>, Vec<u16>) {
    let hw = shell.width / 2.0;
    let hd = shell.depth / 2.0;
    let h = shell.height;
    let floor = shell.floor_color;
    let wall = shell.wall_color;

    let mut vertices = Vec::with_capacity(12);
    let mut indices = Vec::with_capacity(18);

    let mut quad = |verts: [([f32; 3], [f32; 3]); 4], color: [f32; 4]| {
        let base = vertices.len() as u16;
        for (position, normal) in verts {
            vertices.push(RoomVertex {
                position,
                normal,
                color,
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    };

    // Floor, normal up
    let up = [0.0, 1.0, 0.0];
    quad(
        [
            ([-hw, 0.0, hd], up),
            ([hw, 0.0, hd], up),
            ([hw, 0.0, -hd], up),
            ([-hw, 0.0, -hd], up),
        ],
        floor,
    );

    // Back wall at -Z, normal +Z
    let back = [0.0, 0.0, 1.0];
    quad(
        [
            ([-hw, 0.0, -hd], back),
            ([hw, 0.0, -hd], back),
            ([hw, h, -hd], back),
            ([-hw, h, -hd], back),
        ],
        wall,
    );

    // Side wall at -X, normal +X
    let side = [1.0, 0.0, 0.0];
    quad(
        [
            ([-hw, 0.0, hd], side),
            ([-hw, 0.0, -hd], side),
            ([-hw, h, -hd], side),
            ([-hw, h, hd], side),
        ],
        wall,
    );

    (vertices, indices)
}

/// Unit quad on the floor plane as a triangle list, corners in [-1, 1].
pub(crate) fn shadow_quad() -> Vec<QuadVertex> {
    let c = |x: f32, y: f32| QuadVertex { corner: [x, y] };
    vec![
        c(-1.0, -1.0),
        c(1.0, -1.0),
        c(1.0, 1.0),
        c(1.0, 1.0),
        c(-1.0, 1.0),
        c(-1.0, -1.0),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_twelve_triangles() {
        let (vertices, indices) = cube_mesh();
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);
        assert_eq!(indices.len() % 3, 0);
    }

    #[test]
    fn room_has_three_quads() {
        let (vertices, indices) = room_mesh(&RoomShell::default());
        assert_eq!(vertices.len(), 12);
        assert_eq!(indices.len(), 18);
        // Indices stay in range.
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn room_floor_uses_floor_color() {
        let shell = RoomShell::default();
        let (vertices, _) = room_mesh(&shell);
        assert_eq!(vertices[0].color, shell.floor_color);
        assert_eq!(vertices[4].color, shell.wall_color);
    }

    #[test]
    fn shadow_quad_is_two_triangles() {
        assert_eq!(shadow_quad().len(), 6);
    }
}
