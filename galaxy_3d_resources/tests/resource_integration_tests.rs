//! Integration tests for ResourceManager through the public API
//!
//! These tests play out how scene objects share resources: the first object
//! to find a resource missing builds it, later objects reuse the instance.
//!
//! Run with: cargo test --test resource_integration_tests

use galaxy_3d_resources::galaxy3d::Error;
use galaxy_3d_resources::galaxy3d::resource::{
    Handle, LoadedResource, ResourceManager, ResourceManagerConfig, ResourcePolicy,
    ResourceState, ResourceStats,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

// ============================================================================
// TEST RESOURCES
// ============================================================================

struct Mesh {
    indices: Vec<u16>,
}

struct Texture {
    faces: usize,
    drops: Arc<AtomicUsize>,
}

impl Drop for Texture {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

struct Importer {
    created: Arc<AtomicUsize>,
}

impl Importer {
    fn import(&self, face: &str) -> String {
        format!("image:{}", face)
    }
}

/// Scene object that builds its resources on first use
struct CubeMap {
    mesh: Handle<Mesh>,
    texture: Handle<Texture>,
}

impl CubeMap {
    fn new(rm: &ResourceManager, created: &Arc<AtomicUsize>, drops: &Arc<AtomicUsize>) -> Self {
        let mesh = rm.get::<Mesh>("cube").unwrap();
        if !mesh.is_ready() {
            rm.set("cube", Mesh { indices: vec![0, 1, 2, 2, 3, 0] }, ResourcePolicy::Resident)
                .unwrap();
        }

        let texture = rm.get::<Texture>("sky").unwrap();
        if !texture.is_ready() {
            let importer = rm.get::<Importer>("tga").unwrap();
            if !importer.is_ready() {
                created.fetch_add(1, Ordering::SeqCst);
                rm.set("tga", Importer { created: created.clone() }, ResourcePolicy::Manual)
                    .unwrap();
            }
            let images: Vec<String> = ["+x", "-x", "+y", "-y", "+z", "-z"].iter()
                .map(|face| importer.get().unwrap().import(face))
                .collect();
            rm.set("sky", Texture { faces: images.len(), drops: drops.clone() },
                ResourcePolicy::ReferenceCounted).unwrap();
        }

        Self { mesh, texture }
    }
}

fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

// ============================================================================
// SHARING TESTS
// ============================================================================

#[test]
fn test_integration_objects_share_one_instance() {
    let rm = ResourceManager::new();
    let created = counter();
    let drops = counter();

    let first = CubeMap::new(&rm, &created, &drops);
    let second = CubeMap::new(&rm, &created, &drops);

    assert_eq!(created.load(Ordering::SeqCst), 1);
    assert!(Arc::ptr_eq(&first.mesh.get().unwrap(), &second.mesh.get().unwrap()));
    assert!(Arc::ptr_eq(&first.texture.get().unwrap(), &second.texture.get().unwrap()));
    assert_eq!(first.texture.get().unwrap().faces, 6);
    assert_eq!(first.mesh.get().unwrap().indices.len(), 6);
    assert_eq!(rm.handle_count::<Texture>("sky"), 2);
}

#[test]
fn test_integration_reference_counted_texture_follows_objects() {
    let rm = ResourceManager::new();
    let created = counter();
    let drops = counter();

    let first = CubeMap::new(&rm, &created, &drops);
    let second = CubeMap::new(&rm, &created, &drops);

    drop(first);
    assert_eq!(drops.load(Ordering::SeqCst), 0);
    drop(second);
    assert_eq!(drops.load(Ordering::SeqCst), 1);

    // The Resident mesh stays for the next object
    assert!(rm.contains::<Mesh>("cube"));
    assert_eq!(rm.state::<Texture>("sky"), None);
}

#[test]
fn test_integration_importer_freed_after_setup() {
    let rm = ResourceManager::new();
    let created = counter();
    let drops = counter();

    let cubemap = CubeMap::new(&rm, &created, &drops);
    rm.free::<Importer>("tga").unwrap();
    assert_eq!(rm.state::<Importer>("tga"), None);

    // Texture is already built, so a second object does not need the importer
    let _second = CubeMap::new(&rm, &created, &drops);
    assert_eq!(created.load(Ordering::SeqCst), 1);
    assert!(cubemap.texture.is_ready());
}

#[test]
fn test_integration_importer_recreated_when_needed_again() {
    let rm = ResourceManager::new();
    let created = counter();
    let drops = counter();

    drop(CubeMap::new(&rm, &created, &drops));
    rm.free::<Importer>("tga").unwrap();

    // Texture went away with its last holder, so the importer is rebuilt
    let _cubemap = CubeMap::new(&rm, &created, &drops);
    assert_eq!(created.load(Ordering::SeqCst), 2);
    let importer = rm.get::<Importer>("tga").unwrap();
    assert_eq!(Arc::strong_count(&importer.get().unwrap().created), 2);
}

// ============================================================================
// POLICY TESTS
// ============================================================================

#[test]
fn test_integration_resident_cannot_be_freed() {
    let rm = ResourceManager::new();
    rm.set("cube", Mesh { indices: vec![0, 1, 2] }, ResourcePolicy::Resident).unwrap();

    let result = rm.free::<Mesh>("cube");
    assert!(matches!(result, Err(Error::PolicyViolation(_))));
    assert_eq!(rm.state::<Mesh>("cube"), Some(ResourceState::Final));
}

#[test]
fn test_integration_duplicate_set_reported() {
    let rm = ResourceManager::new();
    rm.set("cube", Mesh { indices: vec![0, 1, 2] }, ResourcePolicy::Resident).unwrap();

    let err = rm.set("cube", Mesh { indices: vec![] }, ResourcePolicy::Resident).unwrap_err();
    assert!(matches!(err, Error::DuplicateKey(_)));
    assert!(err.to_string().starts_with("Duplicate key:"));
    assert_eq!(rm.get::<Mesh>("cube").unwrap().get().unwrap().indices.len(), 3);
}

#[test]
fn test_integration_strict_manual_free() {
    let rm = ResourceManager::with_config(ResourceManagerConfig {
        name: "strict".to_string(),
        strict_manual_free: true,
        ..Default::default()
    });
    let created = counter();
    rm.set("tga", Importer { created: created.clone() }, ResourcePolicy::Manual).unwrap();

    let importer = rm.get::<Importer>("tga").unwrap();
    assert!(matches!(rm.free::<Importer>("tga"), Err(Error::PolicyViolation(_))));
    drop(importer);
    assert!(rm.free::<Importer>("tga").is_ok());
}

// ============================================================================
// LOADER TESTS
// ============================================================================

#[test]
fn test_integration_loader_populates_on_get() {
    let rm = ResourceManager::new();
    let drops = counter();
    let loader_drops = drops.clone();
    rm.set_loader::<Texture, _>(move |key: &str| {
        if key.starts_with("missing") {
            return None;
        }
        Some(LoadedResource::new(
            Texture { faces: 6, drops: loader_drops.clone() },
            ResourcePolicy::ReferenceCounted,
        ))
    }).unwrap();

    let sky = rm.get::<Texture>("sky").unwrap();
    assert_eq!(sky.get().unwrap().faces, 6);

    let missing = rm.get::<Texture>("missing-face").unwrap();
    assert!(matches!(missing.get(), Err(Error::NotReady(_))));

    drop(sky);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn test_integration_fallback_while_loading() {
    let rm = ResourceManager::new();
    let drops = counter();
    rm.set_fallback(Texture { faces: 1, drops: drops.clone() }).unwrap();
    rm.set_loading::<Texture>("sky").unwrap();

    let sky = rm.get::<Texture>("sky").unwrap();
    assert_eq!(sky.state(), ResourceState::Loading);
    assert_eq!(sky.get_or_fallback().unwrap().faces, 1);

    rm.set("sky", Texture { faces: 6, drops: drops.clone() }, ResourcePolicy::Manual).unwrap();
    assert_eq!(sky.get_or_fallback().unwrap().faces, 6);
}

// ============================================================================
// CONCURRENCY TESTS
// ============================================================================

#[test]
fn test_integration_concurrent_first_set_wins() {
    let rm = Arc::new(ResourceManager::new());
    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));

    let results: Vec<bool> = (0..threads)
        .map(|i| {
            let rm = rm.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                let handle = rm.get::<Mesh>("cube").unwrap();
                barrier.wait();
                let stored = rm
                    .set("cube", Mesh { indices: vec![i as u16] }, ResourcePolicy::Resident)
                    .is_ok();
                assert!(handle.is_ready());
                stored
            })
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|t| t.join().unwrap())
        .collect();

    assert_eq!(results.iter().filter(|stored| **stored).count(), 1);
    assert_eq!(rm.get::<Mesh>("cube").unwrap().get().unwrap().indices.len(), 1);
}

#[test]
fn test_integration_concurrent_handles_are_counted() {
    let rm = Arc::new(ResourceManager::new());
    let drops = counter();
    rm.set("sky", Texture { faces: 6, drops: drops.clone() }, ResourcePolicy::ReferenceCounted)
        .unwrap();
    let keeper = rm.get::<Texture>("sky").unwrap();

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let rm = rm.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    let handle = rm.get::<Texture>("sky").unwrap();
                    let copy = handle.clone();
                    assert_eq!(copy.get().unwrap().faces, 6);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(keeper.handle_count(), 1);
    assert_eq!(drops.load(Ordering::SeqCst), 0);
    drop(keeper);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

// ============================================================================
// TEARDOWN TESTS
// ============================================================================

#[test]
fn test_integration_stats_and_teardown() {
    let rm = ResourceManager::new();
    let created = counter();
    let drops = counter();
    let cubemap = CubeMap::new(&rm, &created, &drops);

    assert_eq!(rm.stats(), ResourceStats { types: 3, slots: 3, ready: 3, handles: 2 });

    assert_eq!(rm.free_unused(), 1); // importer
    assert_eq!(rm.clear(), 2); // mesh and texture
    assert_eq!(drops.load(Ordering::SeqCst), 1);
    assert!(!cubemap.mesh.is_ready());
    assert!(!cubemap.texture.is_ready());
}
