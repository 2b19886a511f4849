//! GL texture backing factory
//!
//! Decides whether a shared image request can be served by plain 2D GL
//! textures and allocates the backing. Admission is checked rule by rule;
//! the first failing rule is the refusal reason.

use crate::backing::{
    GlTextureImageBacking, SharedImageBacking, SharedImageDesc, TextureRepresentation,
};
use crate::capability::{BaseCapabilities, CapabilityTable};
use crate::config::FactoryConfig;
use crate::context::{BackendContextType, GlImplementation, GpuMemoryBufferType};
use crate::driver::{TextureDescriptor, TextureDriver, TextureTarget};
use crate::error::{SharedImageError, SharedImageResult};
use crate::usage::SharedImageUsage;
use lumen_core::{SharedImageFormat, Size, SurfaceHandle};
use std::sync::Arc;

/// Usage this factory never serves
const INVALID_USAGE: SharedImageUsage = SharedImageUsage(
    SharedImageUsage::VIDEO_DECODE.0 | SharedImageUsage::SCANOUT.0 | SharedImageUsage::WEBGPU.0,
);

/// Usage refused when running on ANGLE/Metal
const INVALID_USAGE_ANGLE_METAL: SharedImageUsage = SharedImageUsage(
    SharedImageUsage::DISPLAY_READ.0
        | SharedImageUsage::SCANOUT.0
        | SharedImageUsage::VIDEO_DECODE.0
        | SharedImageUsage::GLES2.0
        | SharedImageUsage::GLES2_FRAMEBUFFER_HINT.0
        | SharedImageUsage::WEBGPU.0,
);

/// Usage that needs the consumer to be on a GL context
const GL_CONTEXT_USAGE: SharedImageUsage = SharedImageUsage(
    SharedImageUsage::DISPLAY_READ.0 | SharedImageUsage::DISPLAY_WRITE.0 | SharedImageUsage::RASTER.0,
);

/// Usage that binds the texture as a framebuffer attachment
const FRAMEBUFFER_USAGE: SharedImageUsage =
    SharedImageUsage(SharedImageUsage::RASTER.0 | SharedImageUsage::GLES2_FRAMEBUFFER_HINT.0);

/// What is asked of a factory, independent of the image's name and metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageBackingRequest {
    pub format: SharedImageFormat,
    pub size: Size,
    pub usage: SharedImageUsage,
    pub thread_safe: bool,
    pub buffer_source: GpuMemoryBufferType,
    pub backend_context_type: BackendContextType,
}

impl ImageBackingRequest {
    /// Single-threaded request on a GL context with no client memory
    pub fn new(format: SharedImageFormat, size: Size, usage: SharedImageUsage) -> Self {
        Self {
            format,
            size,
            usage,
            thread_safe: false,
            buffer_source: GpuMemoryBufferType::EmptyBuffer,
            backend_context_type: BackendContextType::Gl,
        }
    }

    pub fn from_desc(desc: &SharedImageDesc) -> Self {
        Self::new(desc.format, desc.size, desc.usage)
    }

    /// The same call context asking for the image `desc` describes
    pub fn for_desc(self, desc: &SharedImageDesc) -> Self {
        Self {
            format: desc.format,
            size: desc.size,
            usage: desc.usage,
            ..self
        }
    }

    pub fn with_thread_safe(mut self, thread_safe: bool) -> Self {
        self.thread_safe = thread_safe;
        self
    }

    pub fn with_buffer_source(mut self, buffer_source: GpuMemoryBufferType) -> Self {
        self.buffer_source = buffer_source;
        self
    }

    pub fn with_backend(mut self, backend_context_type: BackendContextType) -> Self {
        self.backend_context_type = backend_context_type;
        self
    }
}

/// Factory for [`GlTextureImageBacking`]s
pub struct GlTextureImageBackingFactory {
    config: FactoryConfig,
    capabilities: CapabilityTable,
    driver: Arc<dyn TextureDriver>,
}

impl GlTextureImageBackingFactory {
    /// Create a factory for a context reporting `base` format support
    pub fn new(
        config: FactoryConfig,
        base: &BaseCapabilities,
        driver: Arc<dyn TextureDriver>,
    ) -> SharedImageResult<Self> {
        config.validate()?;
        let capabilities = CapabilityTable::new(base);
        log::info!(
            "GL texture factory on {} ({}, {}{})",
            driver.name(),
            config.gl_implementation.name(),
            if config.use_passthrough { "passthrough" } else { "validating" },
            if config.for_cpu_upload_usage { ", CPU upload" } else { "" }
        );
        Ok(Self {
            config,
            capabilities,
            driver,
        })
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    pub fn capabilities(&self) -> &CapabilityTable {
        &self.capabilities
    }

    /// Whether this factory can create the requested backing.
    ///
    /// `pixel_data` is the initial content, empty if none.
    pub fn is_supported(&self, request: &ImageBackingRequest, pixel_data: &[u8]) -> bool {
        match self.check_supported(request, pixel_data) {
            Ok(()) => true,
            Err(e) => {
                log::debug!("Refusing {} {}: {}", request.format, request.size, e);
                false
            }
        }
    }

    /// Like [`is_supported`](Self::is_supported), with the reason for a refusal
    pub fn check_supported(
        &self,
        request: &ImageBackingRequest,
        pixel_data: &[u8],
    ) -> SharedImageResult<()> {
        let format = request.format;
        let refuse = |reason: String| Err(SharedImageError::unsupported(format, reason));

        // Validating textures cannot track cleared state per plane
        if format.is_multi_plane() && !self.config.use_passthrough {
            return refuse("multi-planar formats need passthrough textures".into());
        }
        if !pixel_data.is_empty() && !request.backend_context_type.is_gl() {
            return refuse(format!(
                "initial data cannot be uploaded for a {} context",
                request.backend_context_type.name()
            ));
        }
        if request.thread_safe {
            return refuse("thread-safe backings are not supported".into());
        }
        if request.buffer_source != GpuMemoryBufferType::EmptyBuffer {
            return refuse(format!("cannot import {:?}", request.buffer_source));
        }

        let cpu_upload = request.usage.contains(SharedImageUsage::CPU_UPLOAD);
        if cpu_upload != self.config.for_cpu_upload_usage {
            return refuse(if cpu_upload {
                "CPU upload usage on a non CPU-upload factory".into()
            } else {
                "factory only serves CPU upload usage".into()
            });
        }

        let mut usage = request.usage;
        if cpu_upload {
            if !self.capabilities.supports_pixel_upload(format) {
                return refuse("format does not support pixel upload".into());
            }
            // CPU-upload images may ask for scanout; plain textures ignore it
            usage = usage.without(SharedImageUsage::SCANOUT);
        }

        if usage.intersects(INVALID_USAGE) {
            return refuse(format!("unsupported usage {}", usage & INVALID_USAGE));
        }
        if self.config.gl_implementation == GlImplementation::AngleMetal
            && usage.intersects(INVALID_USAGE_ANGLE_METAL)
        {
            return refuse(format!(
                "usage {} unsupported on ANGLE/Metal",
                usage & INVALID_USAGE_ANGLE_METAL
            ));
        }
        if !request.backend_context_type.is_gl() && usage.intersects(GL_CONTEXT_USAGE) {
            return refuse(format!(
                "usage {} needs a GL context, got {}",
                usage & GL_CONTEXT_USAGE,
                request.backend_context_type.name()
            ));
        }

        self.validate_texture(format, request.size, pixel_data, TextureTarget::Texture2D)
    }

    /// Whether a `format` texture of `size` with `pixel_data` can be created on `target`
    pub fn can_create_texture(
        &self,
        format: SharedImageFormat,
        size: Size,
        pixel_data: &[u8],
        target: TextureTarget,
    ) -> bool {
        self.validate_texture(format, size, pixel_data, target).is_ok()
    }

    fn validate_texture(
        &self,
        format: SharedImageFormat,
        size: Size,
        pixel_data: &[u8],
        target: TextureTarget,
    ) -> SharedImageResult<()> {
        let max = self.config.max_texture_size;
        if size.is_empty() || size.width > max || size.height > max {
            log::warn!("Invalid texture size {} for {}", size, format);
            return Err(SharedImageError::InvalidSize { size, max });
        }
        if !self.capabilities.is_enabled(format) {
            return Err(SharedImageError::UnknownFormat(format));
        }
        if format.is_compressed() && pixel_data.is_empty() {
            return Err(SharedImageError::unsupported(
                format,
                "compressed formats need initial data",
            ));
        }
        if !pixel_data.is_empty() {
            if format.is_multi_plane() {
                return Err(SharedImageError::unsupported(
                    format,
                    "initial data is only supported for single-plane formats",
                ));
            }
            let expected = format
                .estimated_size_in_bytes(size)
                .ok_or(SharedImageError::InvalidSize { size, max })?;
            if pixel_data.len() != expected {
                log::warn!(
                    "Initial data for {} {} is {} bytes, expected {}",
                    format,
                    size,
                    pixel_data.len(),
                    expected
                );
                return Err(SharedImageError::InvalidPixelData {
                    expected,
                    actual: pixel_data.len(),
                });
            }
        }
        if target != TextureTarget::Texture2D {
            return Err(SharedImageError::unsupported(
                format,
                format!("texture target {:?}", target),
            ));
        }
        Ok(())
    }

    /// Create a backing with undefined content
    pub fn create_shared_image(
        &self,
        desc: &SharedImageDesc,
        surface_handle: SurfaceHandle,
    ) -> SharedImageResult<GlTextureImageBacking> {
        if !surface_handle.is_null() {
            log::trace!("Surface handle {:?} unused by GL texture backings", surface_handle);
        }
        self.create_shared_image_internal(desc, &[])
    }

    /// Create a backing initialized with `pixel_data`
    pub fn create_shared_image_with_data(
        &self,
        desc: &SharedImageDesc,
        pixel_data: &[u8],
    ) -> SharedImageResult<GlTextureImageBacking> {
        self.create_shared_image_internal(desc, pixel_data)
    }

    fn create_shared_image_internal(
        &self,
        desc: &SharedImageDesc,
        pixel_data: &[u8],
    ) -> SharedImageResult<GlTextureImageBacking> {
        self.validate_texture(desc.format, desc.size, pixel_data, TextureTarget::Texture2D)?;
        let planes = self
            .capabilities
            .get(desc.format)
            .ok_or(SharedImageError::UnknownFormat(desc.format))?;
        let estimated_size = desc
            .format
            .estimated_size_in_bytes(desc.size)
            .ok_or(SharedImageError::InvalidSize {
                size: desc.size,
                max: self.config.max_texture_size,
            })?;

        let framebuffer_attachment = desc.usage.intersects(FRAMEBUFFER_USAGE);
        let framebuffer_attachment_angle =
            framebuffer_attachment && self.config.texture_usage_angle;
        let representation = if self.config.use_passthrough {
            TextureRepresentation::Passthrough
        } else {
            TextureRepresentation::Validating
        };

        // Textures allocated so far are released if a later step fails
        let mut backing = GlTextureImageBacking::new(
            *desc,
            representation,
            framebuffer_attachment_angle,
            estimated_size,
            Arc::clone(&self.driver),
        );

        for (plane, info) in planes.iter().enumerate() {
            let immutable_storage = self.config.use_texture_storage && !info.is_compressed;
            let texture_desc = TextureDescriptor {
                target: TextureTarget::Texture2D,
                size: desc.format.plane_size(plane, desc.size),
                internal_format: if immutable_storage {
                    info.storage_internal_format
                } else {
                    info.image_internal_format
                },
                format: info.gl_format,
                data_type: info.gl_type,
                immutable_storage,
                is_compressed: info.is_compressed,
                framebuffer_attachment_angle,
            };
            let texture = self.driver.create_texture(&texture_desc).map_err(|e| {
                log::warn!(
                    "Failed to allocate plane {} of {} {}: {}",
                    plane,
                    desc.format,
                    desc.size,
                    e
                );
                e
            })?;
            backing.push_plane(texture, texture_desc);
        }

        if !pixel_data.is_empty() {
            if let Some(texture) = backing.texture(0) {
                self.driver.upload(texture, pixel_data)?;
            }
            backing.set_cleared();
        }

        log::debug!(
            "Created {} backing {} ({} {}, usage {})",
            representation.name(),
            desc.mailbox,
            desc.format,
            desc.size,
            desc.usage
        );
        Ok(backing)
    }
}

impl std::fmt::Debug for GlTextureImageBackingFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlTextureImageBackingFactory")
            .field("config", &self.config)
            .field("formats", &self.capabilities.len())
            .field("driver", &self.driver.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::HeadlessTextureDriver;
    use lumen_core::{Mailbox, ResourceFormat};

    fn factory_with(config: FactoryConfig) -> (GlTextureImageBackingFactory, Arc<HeadlessTextureDriver>) {
        let driver = Arc::new(HeadlessTextureDriver::new());
        let factory =
            GlTextureImageBackingFactory::new(config, &BaseCapabilities::gles3(), driver.clone())
                .unwrap();
        (factory, driver)
    }

    fn request(format: SharedImageFormat, usage: SharedImageUsage) -> ImageBackingRequest {
        ImageBackingRequest::new(format, Size::new(256, 256), usage)
    }

    #[test]
    fn test_multi_plane_needs_passthrough() {
        let (validating, _) = factory_with(FactoryConfig::validating());
        let (passthrough, _) = factory_with(FactoryConfig::default());
        let req = request(SharedImageFormat::NV12, SharedImageUsage::GLES2);
        assert!(!validating.is_supported(&req, &[]));
        assert!(passthrough.is_supported(&req, &[]));
    }

    #[test]
    fn test_pixel_data_needs_gl_backend() {
        let (factory, _) = factory_with(FactoryConfig::default());
        let data = vec![0u8; 256 * 256 * 4];
        let req = request(SharedImageFormat::RGBA_8888, SharedImageUsage::GLES2);
        assert!(factory.is_supported(&req, &data));
        assert!(!factory.is_supported(&req.with_backend(BackendContextType::Vulkan), &data));
        assert!(factory.is_supported(&req.with_backend(BackendContextType::Vulkan), &[]));
    }

    #[test]
    fn test_buffer_source_must_be_empty() {
        let (factory, _) = factory_with(FactoryConfig::default());
        let req = request(SharedImageFormat::RGBA_8888, SharedImageUsage::GLES2);
        for source in [GpuMemoryBufferType::SharedMemoryBuffer, GpuMemoryBufferType::NativePixmap] {
            assert!(!factory.is_supported(&req.with_buffer_source(source), &[]));
        }
    }

    #[test]
    fn test_cpu_upload_mode_is_symmetric() {
        let (plain, _) = factory_with(FactoryConfig::default());
        let (cpu, _) = factory_with(FactoryConfig::cpu_upload());
        let upload = request(SharedImageFormat::RGBA_8888, SharedImageUsage::CPU_UPLOAD);
        let no_upload = request(SharedImageFormat::RGBA_8888, SharedImageUsage::GLES2);
        assert!(!plain.is_supported(&upload, &[]));
        assert!(plain.is_supported(&no_upload, &[]));
        assert!(cpu.is_supported(&upload, &[]));
        assert!(!cpu.is_supported(&no_upload, &[]));
    }

    #[test]
    fn test_cpu_upload_drops_scanout() {
        let (cpu, _) = factory_with(FactoryConfig::cpu_upload());
        let usage = SharedImageUsage::CPU_UPLOAD | SharedImageUsage::SCANOUT;
        assert!(cpu.is_supported(&request(SharedImageFormat::RGBA_8888, usage), &[]));
        // Packed formats cannot take CPU pixels as-is
        let packed = request(ResourceFormat::Rgb565.into(), SharedImageUsage::CPU_UPLOAD);
        assert!(!cpu.is_supported(&packed, &[]));
    }

    #[test]
    fn test_angle_metal_usage() {
        let (metal, _) = factory_with(FactoryConfig::angle_metal());
        assert!(!metal.is_supported(&request(SharedImageFormat::RGBA_8888, SharedImageUsage::GLES2), &[]));
        assert!(!metal.is_supported(
            &request(SharedImageFormat::RGBA_8888, SharedImageUsage::DISPLAY_READ),
            &[]
        ));
        assert!(metal.is_supported(&request(SharedImageFormat::RGBA_8888, SharedImageUsage::RASTER), &[]));
    }

    #[test]
    fn test_gl_context_usage_on_other_backends() {
        let (factory, _) = factory_with(FactoryConfig::default());
        let raster = request(SharedImageFormat::RGBA_8888, SharedImageUsage::RASTER)
            .with_backend(BackendContextType::Vulkan);
        assert!(!factory.is_supported(&raster, &[]));
        let gles2 = request(SharedImageFormat::RGBA_8888, SharedImageUsage::GLES2)
            .with_backend(BackendContextType::Vulkan);
        assert!(factory.is_supported(&gles2, &[]));
    }

    #[test]
    fn test_refusal_reason() {
        let (factory, _) = factory_with(FactoryConfig::default());
        let req = request(SharedImageFormat::RGBA_8888, SharedImageUsage::WEBGPU);
        match factory.check_supported(&req, &[]) {
            Err(SharedImageError::Unsupported { format, reason }) => {
                assert_eq!(format, SharedImageFormat::RGBA_8888);
                assert!(reason.contains("WEBGPU"), "{}", reason);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_can_create_texture() {
        let (factory, _) = factory_with(FactoryConfig::default());
        let size = Size::new(64, 64);
        let rgba = SharedImageFormat::RGBA_8888;
        assert!(factory.can_create_texture(rgba, size, &[], TextureTarget::Texture2D));
        assert!(!factory.can_create_texture(rgba, size, &[], TextureTarget::External));
        assert!(!factory.can_create_texture(rgba, Size::new(0, 64), &[], TextureTarget::Texture2D));
        assert!(!factory.can_create_texture(rgba, Size::new(8193, 1), &[], TextureTarget::Texture2D));

        let etc1 = ResourceFormat::Etc1.into();
        assert!(!factory.can_create_texture(etc1, size, &[], TextureTarget::Texture2D));
        assert!(factory.can_create_texture(etc1, size, &[0u8; 16 * 16 * 8], TextureTarget::Texture2D));

        let nv12_data = vec![0u8; 64 * 64 + 32 * 32 * 2];
        assert!(!factory.can_create_texture(SharedImageFormat::NV12, size, &nv12_data, TextureTarget::Texture2D));
    }

    #[test]
    fn test_framebuffer_attachment_hint() {
        let driver = Arc::new(HeadlessTextureDriver::new());
        let config = FactoryConfig {
            gl_implementation: GlImplementation::AngleVulkan,
            texture_usage_angle: true,
            ..Default::default()
        };
        let factory =
            GlTextureImageBackingFactory::new(config, &BaseCapabilities::gles3(), driver.clone())
                .unwrap();

        let raster = SharedImageDesc::new(
            Mailbox::new(1, 1),
            SharedImageFormat::RGBA_8888,
            Size::new(32, 32),
            SharedImageUsage::RASTER,
        );
        let backing = factory.create_shared_image(&raster, SurfaceHandle::NULL).unwrap();
        assert!(backing.is_framebuffer_attachment_optimized());
        let texture = driver.texture(backing.texture(0).unwrap()).unwrap();
        assert!(texture.desc.framebuffer_attachment_angle);

        let sampled = SharedImageDesc { usage: SharedImageUsage::GLES2, ..raster };
        let backing = factory.create_shared_image(&sampled, SurfaceHandle::NULL).unwrap();
        assert!(!backing.is_framebuffer_attachment_optimized());
    }

    #[test]
    fn test_create_multi_plane() {
        let (factory, driver) = factory_with(FactoryConfig::default());
        let desc = SharedImageDesc::new(
            Mailbox::new(1, 7),
            SharedImageFormat::YV12,
            Size::new(33, 17),
            SharedImageUsage::GLES2,
        );
        let backing = factory.create_shared_image(&desc, SurfaceHandle::NULL).unwrap();
        assert_eq!(backing.plane_count(), 3);
        assert_eq!(backing.texture_descriptor(1).unwrap().size, Size::new(17, 9));
        assert_eq!(backing.estimated_size(), 33 * 17 + 2 * 17 * 9);
        assert!(!backing.is_cleared());
        assert_eq!(driver.live_textures(), 3);
        drop(backing);
        assert_eq!(driver.live_textures(), 0);
    }

    #[test]
    fn test_failed_allocation_releases_planes() {
        let (factory, driver) = factory_with(FactoryConfig::default());
        driver.set_fail_allocations(true);
        let desc = SharedImageDesc::new(
            Mailbox::new(1, 8),
            SharedImageFormat::NV12,
            Size::new(16, 16),
            SharedImageUsage::GLES2,
        );
        assert!(matches!(
            factory.create_shared_image(&desc, SurfaceHandle::NULL),
            Err(SharedImageError::Driver(_))
        ));
        assert_eq!(driver.live_textures(), 0);
    }

    #[test]
    fn test_validating_representation() {
        let (factory, _) = factory_with(FactoryConfig::validating());
        let desc = SharedImageDesc::new(
            Mailbox::new(2, 1),
            SharedImageFormat::BGRA_8888,
            Size::new(8, 8),
            SharedImageUsage::DISPLAY_READ,
        );
        let backing = factory.create_shared_image(&desc, SurfaceHandle::NULL).unwrap();
        assert_eq!(backing.representation(), TextureRepresentation::Validating);
    }
}
