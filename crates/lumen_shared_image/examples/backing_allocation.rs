//! Backing Allocation Demo
//!
//! Builds GL texture factories over a headless driver and walks a set of
//! requests through them, printing which are admitted and why the others
//! are refused.
//!
//! Run with:
//! ```
//! RUST_LOG=debug cargo run -p lumen_shared_image --example backing_allocation
//! ```

use lumen_shared_image::prelude::*;
use lumen_shared_image::GlImplementation;
use std::sync::Arc;

fn main() {
    env_logger::init();

    println!("Backing Allocation Demo");
    println!("=======================\n");

    let driver = Arc::new(HeadlessTextureDriver::new());
    let base = BaseCapabilities::gles3();

    let configs = [
        ("default", FactoryConfig::default()),
        ("validating", FactoryConfig::validating()),
        ("ANGLE/Metal", FactoryConfig::angle_metal()),
        ("CPU upload", FactoryConfig::cpu_upload()),
    ];

    let requests = [
        ("RGBA raster", ImageBackingRequest::new(SharedImageFormat::RGBA_8888, Size::new(512, 512), SharedImageUsage::RASTER)),
        ("NV12 sampled", ImageBackingRequest::new(SharedImageFormat::NV12, Size::new(1920, 1080), SharedImageUsage::GLES2)),
        ("BGRA scanout", ImageBackingRequest::new(SharedImageFormat::BGRA_8888, Size::new(1920, 1080), SharedImageUsage::SCANOUT)),
        (
            "RGBA CPU upload",
            ImageBackingRequest::new(
                SharedImageFormat::RGBA_8888,
                Size::new(256, 256),
                SharedImageUsage::CPU_UPLOAD | SharedImageUsage::SCANOUT,
            ),
        ),
        (
            "RGBA on Vulkan",
            ImageBackingRequest::new(SharedImageFormat::RGBA_8888, Size::new(256, 256), SharedImageUsage::DISPLAY_READ)
                .with_backend(BackendContextType::Vulkan),
        ),
    ];

    for (label, config) in configs {
        let gl = config.gl_implementation;
        let factory = match GlTextureImageBackingFactory::new(config, &base, driver.clone()) {
            Ok(f) => f,
            Err(e) => {
                eprintln!("Failed to create {} factory: {}", label, e);
                continue;
            }
        };
        println!("{} factory ({}):", label, if gl == GlImplementation::Native { "native GL" } else { gl.name() });
        for (name, request) in &requests {
            match factory.check_supported(request, &[]) {
                Ok(()) => println!("  {:<16} admitted", name),
                Err(e) => println!("  {:<16} refused: {}", name, e),
            }
        }
        println!();
    }

    let factory = match GlTextureImageBackingFactory::new(FactoryConfig::default(), &base, driver.clone()) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Failed to create factory: {}", e);
            return;
        }
    };
    let mailboxes = MailboxGenerator::new(1);
    let desc = SharedImageDesc::new(
        mailboxes.generate(),
        SharedImageFormat::NV12,
        Size::new(1920, 1080),
        SharedImageUsage::GLES2,
    );
    match factory.create_shared_image(&desc, SurfaceHandle::NULL) {
        Ok(backing) => {
            println!("Created {:?}", backing);
            println!("  Planes: {}", backing.plane_count());
            println!("  Estimated size: {} bytes", backing.estimated_size());
            println!("  Live textures: {}", driver.live_textures());
        }
        Err(e) => eprintln!("Creation failed: {}", e),
    }
    println!("Live textures after release: {}", driver.live_textures());
}
