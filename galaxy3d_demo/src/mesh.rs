/// CPU-side mesh and buffer stand-ins
///
/// Positions are `glam::Vec3`, indices are `u16`. Byte views go through
/// bytemuck so the sizes match what a GPU upload would copy.

use glam::Vec3;

/// Raw bytes uploaded for a mesh
pub struct Buffer {
    bytes: Vec<u8>,
}

impl Buffer {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self { bytes: bytes.to_vec() }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }
}

/// Indexed triangle list
pub struct Mesh {
    positions: Vec<Vec3>,
    indices: Vec<u16>,
}

impl Mesh {
    /// Unit cube centered at the origin, counter-clockwise faces seen from outside
    pub fn solid_cube() -> Self {
        let positions = vec![
            Vec3::new(-1.0, -1.0,  1.0),
            Vec3::new( 1.0, -1.0,  1.0),
            Vec3::new( 1.0,  1.0,  1.0),
            Vec3::new(-1.0,  1.0,  1.0),
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new( 1.0, -1.0, -1.0),
            Vec3::new( 1.0,  1.0, -1.0),
            Vec3::new(-1.0,  1.0, -1.0),
        ];
        let indices = vec![
            0, 1, 2,  0, 2, 3, // +z
            5, 4, 7,  5, 7, 6, // -z
            1, 5, 6,  1, 6, 2, // +x
            4, 0, 3,  4, 3, 7, // -x
            3, 2, 6,  3, 6, 7, // +y
            4, 5, 1,  4, 1, 0, // -y
        ];
        Self { positions, indices }
    }

    /// Reverse the winding of every triangle so faces point inwards
    pub fn flip_face_winding(&mut self) {
        for triangle in self.indices.chunks_exact_mut(3) {
            triangle.swap(1, 2);
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Total bytes of vertex and index data
    pub fn byte_size(&self) -> usize {
        self.vertex_bytes().len() + self.index_bytes().len()
    }

    /// Corners of the axis-aligned bounding box
    pub fn bounds(&self) -> (Vec3, Vec3) {
        self.positions.iter().fold(
            (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
            |(min, max), p| (min.min(*p), max.max(*p)),
        )
    }
}
