use glam::Vec3;

use crate::utils::Mesh;

/// Axis-aligned box centred on the origin, one flat-shaded quad per face.
pub fn box_geometry(width: f32, height: f32, depth: f32) -> Mesh {
    let h = Vec3::new(width, height, depth) * 0.5;
    let mut mesh = Mesh::empty();

    // (normal, u axis, v axis) with u x v == normal so every quad winds CCW from outside.
    let faces = [
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
    ];

    for (normal, u, v) in faces {
        let centre = normal * h;
        let u = u * h;
        let v = v * h;
        mesh.push_quad(centre - u - v, centre + u - v, centre + u + v, centre - u + v, normal);
    }
    mesh
}
