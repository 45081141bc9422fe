/// Cube map texture and the TGA importer that feeds it
///
/// Nothing is decoded: the importer synthesizes a small image per file so
/// the demo runs without assets on disk.

use std::sync::Mutex;
use glam::UVec2;
use galaxy_3d_resources::galaxy3d::{Error, Result};

/// One face of a cube map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeMapFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeMapFace {
    pub const ALL: [CubeMapFace; 6] = [
        CubeMapFace::PositiveX,
        CubeMapFace::NegativeX,
        CubeMapFace::PositiveY,
        CubeMapFace::NegativeY,
        CubeMapFace::PositiveZ,
        CubeMapFace::NegativeZ,
    ];

    /// File name suffix, e.g. "+x"
    pub fn suffix(self) -> &'static str {
        match self {
            CubeMapFace::PositiveX => "+x",
            CubeMapFace::NegativeX => "-x",
            CubeMapFace::PositiveY => "+y",
            CubeMapFace::NegativeY => "-y",
            CubeMapFace::PositiveZ => "+z",
            CubeMapFace::NegativeZ => "-z",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// RGB8 image
#[derive(Debug, Clone)]
pub struct Image2D {
    pub size: UVec2,
    pub pixels: Vec<u8>,
}

/// Six-face RGB8 texture
pub struct CubeMapTexture {
    size: UVec2,
    mip_levels: u32,
    faces: [Option<Image2D>; 6],
}

impl CubeMapTexture {
    /// Allocate storage for faces of `size`, with a full mip chain
    pub fn with_storage(size: UVec2) -> Self {
        let mip_levels = size.min_element().max(1).ilog2() + 1;
        Self {
            size,
            mip_levels,
            faces: Default::default(),
        }
    }

    pub fn set_face(&mut self, face: CubeMapFace, image: Image2D) -> Result<()> {
        if image.size != self.size {
            return Err(Error::InvalidResource(format!(
                "Face {} is {}x{}, cube map storage is {}x{}",
                face.suffix(), image.size.x, image.size.y, self.size.x, self.size.y)));
        }
        self.faces[face.index()] = Some(image);
        Ok(())
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    pub fn mip_levels(&self) -> u32 {
        self.mip_levels
    }

    pub fn is_complete(&self) -> bool {
        self.faces.iter().all(Option::is_some)
    }

    pub fn byte_size(&self) -> usize {
        self.faces.iter().flatten().map(|image| image.pixels.len()).sum()
    }
}

/// Importer plugin stand-in
///
/// Stored in the resource manager so scene objects can share one instance
/// during loading. `open_file` takes `&self` because shared values are
/// reached through `Arc`.
pub struct TgaImporter {
    image_size: u32,
    opened: Mutex<Option<String>>,
}

impl TgaImporter {
    pub fn new(image_size: u32) -> Self {
        Self {
            image_size,
            opened: Mutex::new(None),
        }
    }

    pub fn open_file(&self, path: &str) -> Result<()> {
        let mut opened = self.opened.lock()
            .map_err(|_| Error::LockPoisoned("TgaImporter file lock poisoned".to_string()))?;
        *opened = Some(path.to_string());
        Ok(())
    }

    /// Image of the currently opened file
    pub fn image_2d(&self) -> Result<Image2D> {
        let opened = self.opened.lock()
            .map_err(|_| Error::LockPoisoned("TgaImporter file lock poisoned".to_string()))?;
        let path = opened.as_deref()
            .ok_or_else(|| Error::InvalidResource("TgaImporter has no file opened".to_string()))?;

        // Tint derived from the path so every face differs
        let tint = path.bytes().fold(0u8, |acc, b| acc.wrapping_mul(31).wrapping_add(b));
        let texels = (self.image_size * self.image_size) as usize;
        let pixels = (0..texels)
            .flat_map(|i| [tint, (i % 256) as u8, 255 - tint])
            .collect();

        Ok(Image2D {
            size: UVec2::splat(self.image_size),
            pixels,
        })
    }
}
