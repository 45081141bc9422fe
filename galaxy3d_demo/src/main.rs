/// Galaxy3D resource demo
///
/// Builds a small scene whose objects share meshes, textures and shaders
/// through one ResourceManager, then tears it down.

mod cubemap;
mod mesh;
mod pool;
mod shader;
mod texture;

use galaxy_3d_resources::galaxy3d::{Engine, Result};
use galaxy_3d_resources::galaxy3d::log::{DefaultLogger, LogSeverity};
use galaxy_3d_resources::galaxy3d::resource::{ResourceManager, ResourceManagerConfig, ResourceStats};
use crate::mesh::{Buffer, Mesh};
use crate::pool::Pool;
use crate::texture::CubeMapTexture;

fn print_stats(label: &str, stats: ResourceStats) {
    println!("[{}] types: {}, slots: {}, ready: {}, handles: {}",
        label, stats.types, stats.slots, stats.ready, stats.handles);
}

fn run() -> Result<()> {
    let rm = ResourceManager::with_config(ResourceManagerConfig {
        name: "demo".to_string(),
        ..Default::default()
    });

    let pool = Pool::setup(&rm, "sky/", 3)?;
    println!("pool: {} sky boxes", pool.len());
    print_stats("after setup", rm.stats());

    for call in pool.draw()? {
        println!("draw {} indices, layer {}, translation {}",
            call.index_count, call.texture_layer, call.matrix.w_axis.truncate());
    }

    let cube = rm.get::<Mesh>("cube")?;
    let (min, max) = cube.get()?.bounds();
    println!("cube: {} vertices, {} bytes, bounds {} .. {}",
        cube.get()?.vertex_count(), cube.get()?.byte_size(), min, max);
    let texture = rm.get::<CubeMapTexture>("texture")?;
    println!("texture: {} mip levels, {} bytes",
        texture.get()?.mip_levels(), texture.get()?.byte_size());
    let vertices = rm.get::<Buffer>("cube-buffer")?;
    let indices = rm.get::<Buffer>("cube-index-buffer")?;
    println!("buffers: {} + {} bytes", vertices.get()?.len(), indices.get()?.len());
    drop(cube);
    drop(texture);

    drop(pool);
    rm.free::<CubeMapTexture>("texture")?;
    print_stats("after free", rm.stats());

    rm.clear();
    print_stats("after clear", rm.stats());
    Ok(())
}

fn main() {
    Engine::set_logger(DefaultLogger::with_min_severity(LogSeverity::Debug));

    if let Err(e) = run() {
        eprintln!("Demo failed: {}", e);
        std::process::exit(1);
    }
}
