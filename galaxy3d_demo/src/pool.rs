/// Demo scene: a few sky boxes sharing their resources
///
/// The importer only lives for the loading phase. It is stored as Manual
/// and freed once every object has been built.

use glam::{Mat4, Vec3};
use galaxy_3d_resources::galaxy3d::Result;
use galaxy_3d_resources::galaxy3d::resource::{ResourceManager, ResourcePolicy};
use crate::cubemap::{CubeMap, DrawCall, IMPORTER_KEY};
use crate::texture::TgaImporter;

pub struct Pool {
    cube_maps: Vec<CubeMap>,
    projection: Mat4,
}

impl Pool {
    /// Size of the synthesized importer images
    pub const IMAGE_SIZE: u32 = 64;

    pub fn setup(rm: &ResourceManager, prefix: &str, count: usize) -> Result<Self> {
        rm.set(IMPORTER_KEY, TgaImporter::new(Self::IMAGE_SIZE), ResourcePolicy::Manual)?;

        let cube_maps = (0..count)
            .map(|_| CubeMap::new(rm, prefix))
            .collect::<Result<Vec<_>>>();

        // The loading phase is over either way
        rm.free::<TgaImporter>(IMPORTER_KEY)?;
        let cube_maps = cube_maps?;

        Ok(Self {
            cube_maps,
            projection: Mat4::perspective_rh(35f32.to_radians(), 4.0 / 3.0, 0.1, 100.0),
        })
    }

    /// Draw every object once, spread along the x axis
    pub fn draw(&self) -> Result<Vec<DrawCall>> {
        self.cube_maps.iter()
            .enumerate()
            .map(|(i, cube_map)| {
                let transformation = Mat4::from_translation(Vec3::new(i as f32 * 3.0, 0.0, -3.5));
                cube_map.draw(transformation, self.projection)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.cube_maps.len()
    }
}
