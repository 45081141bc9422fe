/// Cube map shader stand-in
///
/// Holds the uniforms a real program would upload.

use std::sync::Mutex;
use glam::Mat4;

pub struct CubeMapShader {
    pub texture_layer: u32,
    transformation_projection: Mutex<Mat4>,
}

impl CubeMapShader {
    pub fn new() -> Self {
        Self {
            texture_layer: 0,
            transformation_projection: Mutex::new(Mat4::IDENTITY),
        }
    }

    pub fn set_transformation_projection_matrix(&self, matrix: Mat4) {
        if let Ok(mut uniform) = self.transformation_projection.lock() {
            *uniform = matrix;
        }
    }

    pub fn transformation_projection_matrix(&self) -> Mat4 {
        self.transformation_projection.lock()
            .map(|uniform| *uniform)
            .unwrap_or(Mat4::IDENTITY)
    }
}

impl Default for CubeMapShader {
    fn default() -> Self {
        Self::new()
    }
}
