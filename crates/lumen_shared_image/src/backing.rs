//! Shared image backings
//!
//! A backing owns the driver resources behind one shared image. The GL
//! texture backing holds one texture per plane and releases them when
//! dropped.

use crate::driver::{TextureDescriptor, TextureDriver, TextureId};
use crate::usage::SharedImageUsage;
use lumen_core::{AlphaType, ColorSpace, Mailbox, SharedImageFormat, Size, SurfaceOrigin};
use std::fmt;
use std::sync::Arc;

/// Creation arguments common to every shared image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharedImageDesc {
    pub mailbox: Mailbox,
    pub format: SharedImageFormat,
    pub size: Size,
    pub color_space: ColorSpace,
    pub surface_origin: SurfaceOrigin,
    pub alpha_type: AlphaType,
    pub usage: SharedImageUsage,
}

impl SharedImageDesc {
    /// sRGB, top-left origin, premultiplied alpha
    pub fn new(
        mailbox: Mailbox,
        format: SharedImageFormat,
        size: Size,
        usage: SharedImageUsage,
    ) -> Self {
        Self {
            mailbox,
            format,
            size,
            color_space: ColorSpace::default(),
            surface_origin: SurfaceOrigin::default(),
            alpha_type: AlphaType::default(),
            usage,
        }
    }

    pub fn with_color_space(mut self, color_space: ColorSpace) -> Self {
        self.color_space = color_space;
        self
    }

    pub fn with_surface_origin(mut self, surface_origin: SurfaceOrigin) -> Self {
        self.surface_origin = surface_origin;
        self
    }

    pub fn with_alpha_type(mut self, alpha_type: AlphaType) -> Self {
        self.alpha_type = alpha_type;
        self
    }
}

/// How the texture is exposed to GL clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureRepresentation {
    /// Handed straight to the client context
    Passthrough,
    /// Wrapped in a validating texture object tracking cleared state
    Validating,
}

impl TextureRepresentation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Passthrough => "passthrough",
            Self::Validating => "validating",
        }
    }
}

/// A shared image backing, whatever its storage
pub trait SharedImageBacking: Send + Sync + fmt::Debug {
    /// Backing type name for logs
    fn name(&self) -> &'static str;

    fn desc(&self) -> &SharedImageDesc;

    /// Bytes of GPU memory attributed to this backing
    fn estimated_size(&self) -> usize;

    /// Every pixel has been written at least once
    fn is_cleared(&self) -> bool;

    fn set_cleared(&mut self);

    fn mailbox(&self) -> Mailbox {
        self.desc().mailbox
    }

    fn format(&self) -> SharedImageFormat {
        self.desc().format
    }

    fn size(&self) -> Size {
        self.desc().size
    }

    fn usage(&self) -> SharedImageUsage {
        self.desc().usage
    }
}

#[derive(Debug, Clone, Copy)]
struct Plane {
    texture: TextureId,
    desc: TextureDescriptor,
}

/// Shared image stored in plain GL textures, one per plane
pub struct GlTextureImageBacking {
    desc: SharedImageDesc,
    representation: TextureRepresentation,
    planes: Vec<Plane>,
    cleared: bool,
    framebuffer_attachment_angle: bool,
    estimated_size: usize,
    driver: Arc<dyn TextureDriver>,
}

impl GlTextureImageBacking {
    pub(crate) fn new(
        desc: SharedImageDesc,
        representation: TextureRepresentation,
        framebuffer_attachment_angle: bool,
        estimated_size: usize,
        driver: Arc<dyn TextureDriver>,
    ) -> Self {
        Self {
            desc,
            representation,
            planes: Vec::with_capacity(desc.format.number_of_planes()),
            cleared: false,
            framebuffer_attachment_angle,
            estimated_size,
            driver,
        }
    }

    /// Take ownership of an allocated plane texture
    pub(crate) fn push_plane(&mut self, texture: TextureId, desc: TextureDescriptor) {
        self.planes.push(Plane { texture, desc });
    }

    pub fn representation(&self) -> TextureRepresentation {
        self.representation
    }

    pub fn plane_count(&self) -> usize {
        self.planes.len()
    }

    pub fn texture(&self, plane: usize) -> Option<TextureId> {
        self.planes.get(plane).map(|p| p.texture)
    }

    pub fn texture_descriptor(&self, plane: usize) -> Option<&TextureDescriptor> {
        self.planes.get(plane).map(|p| &p.desc)
    }

    /// Allocated with the framebuffer-attachment usage hint
    pub fn is_framebuffer_attachment_optimized(&self) -> bool {
        self.framebuffer_attachment_angle
    }

    pub fn color_space(&self) -> ColorSpace {
        self.desc.color_space
    }

    pub fn surface_origin(&self) -> SurfaceOrigin {
        self.desc.surface_origin
    }

    pub fn alpha_type(&self) -> AlphaType {
        self.desc.alpha_type
    }
}

impl SharedImageBacking for GlTextureImageBacking {
    fn name(&self) -> &'static str {
        "GlTextureImageBacking"
    }

    fn desc(&self) -> &SharedImageDesc {
        &self.desc
    }

    fn estimated_size(&self) -> usize {
        self.estimated_size
    }

    fn is_cleared(&self) -> bool {
        self.cleared
    }

    fn set_cleared(&mut self) {
        self.cleared = true;
    }
}

impl fmt::Debug for GlTextureImageBacking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlTextureImageBacking")
            .field("mailbox", &self.desc.mailbox)
            .field("format", &self.desc.format)
            .field("size", &self.desc.size)
            .field("usage", &self.desc.usage)
            .field("representation", &self.representation)
            .field("textures", &self.planes.iter().map(|p| p.texture).collect::<Vec<_>>())
            .field("cleared", &self.cleared)
            .field("driver", &self.driver.name())
            .finish()
    }
}

impl Drop for GlTextureImageBacking {
    fn drop(&mut self) {
        for plane in self.planes.drain(..) {
            self.driver.delete_texture(plane.texture);
        }
        log::trace!("Released backing {}", self.desc.mailbox);
    }
}
