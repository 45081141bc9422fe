/// Sky box object
///
/// Every CubeMap shares the same mesh, texture and shader. The first one
/// constructed builds them; later ones find them ready in the manager.

use glam::{Mat4, UVec2};
use galaxy_3d_resources::galaxy3d::Result;
use galaxy_3d_resources::galaxy3d::resource::{Handle, ResourceManager, ResourcePolicy};
use crate::mesh::{Buffer, Mesh};
use crate::shader::CubeMapShader;
use crate::texture::{CubeMapFace, CubeMapTexture, TgaImporter};

/// Key of the importer a CubeMap reads its faces with
pub const IMPORTER_KEY: &str = "tga-importer";

/// What a draw would submit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub index_count: usize,
    pub texture_layer: u32,
    pub matrix: Mat4,
}

pub struct CubeMap {
    cube: Handle<Mesh>,
    texture: Handle<CubeMapTexture>,
    shader: Handle<CubeMapShader>,
}

impl CubeMap {
    /// Build or reuse the sky box resources
    ///
    /// `prefix` is prepended to the face file names ("+x.tga", ...).
    /// Requires a `TgaImporter` under `IMPORTER_KEY` unless the texture
    /// already exists.
    pub fn new(rm: &ResourceManager, prefix: &str) -> Result<Self> {
        let cube = rm.get::<Mesh>("cube")?;
        if !cube.is_ready() {
            let mut mesh = Mesh::solid_cube();
            // Viewed from inside
            mesh.flip_face_winding();
            rm.set("cube-buffer", Buffer::from_bytes(mesh.vertex_bytes()), ResourcePolicy::Resident)?;
            rm.set("cube-index-buffer", Buffer::from_bytes(mesh.index_bytes()), ResourcePolicy::Resident)?;
            rm.set(cube.key(), mesh, ResourcePolicy::Resident)?;
        }

        let texture = rm.get::<CubeMapTexture>("texture")?;
        if !texture.is_ready() {
            let importer = rm.get::<TgaImporter>(IMPORTER_KEY)?;
            let importer = importer.get()?;

            // Storage is sized from the first face
            importer.open_file(&format!("{}{}.tga", prefix, CubeMapFace::PositiveX.suffix()))?;
            let first = importer.image_2d()?;
            let mut cube_map = CubeMapTexture::with_storage(UVec2::splat(first.size.min_element()));
            cube_map.set_face(CubeMapFace::PositiveX, first)?;

            for face in &CubeMapFace::ALL[1..] {
                importer.open_file(&format!("{}{}.tga", prefix, face.suffix()))?;
                cube_map.set_face(*face, importer.image_2d()?)?;
            }

            rm.set(texture.key(), cube_map, ResourcePolicy::Manual)?;
        }

        let shader = rm.get::<CubeMapShader>("shader")?;
        if !shader.is_ready() {
            rm.set(shader.key(), CubeMapShader::new(), ResourcePolicy::Manual)?;
        }

        Ok(Self { cube, texture, shader })
    }

    pub fn draw(&self, transformation: Mat4, projection: Mat4) -> Result<DrawCall> {
        let shader = self.shader.get()?;
        let texture = self.texture.get()?;
        let cube = self.cube.get()?;

        let matrix = projection * transformation;
        shader.set_transformation_projection_matrix(matrix);
        debug_assert!(texture.is_complete());

        Ok(DrawCall {
            index_count: cube.index_count(),
            texture_layer: shader.texture_layer,
            matrix,
        })
    }

    pub fn texture(&self) -> &Handle<CubeMapTexture> {
        &self.texture
    }
}

#[cfg(test)]
#[path = "cubemap_tests.rs"]
mod tests;
