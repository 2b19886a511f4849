//! Texture driver abstraction
//!
//! Backings never call GL directly; texture allocation, upload, and
//! release go through a [`TextureDriver`]. [`HeadlessTextureDriver`] keeps
//! textures in process memory for tests and tooling.

use crate::capability::gl;
use crate::error::{SharedImageError, SharedImageResult};
use lumen_core::Size;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Driver-side texture name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

/// Texture binding target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TextureTarget {
    #[default]
    Texture2D,
    Rectangle,
    External,
}

/// Everything needed to allocate one texture plane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDescriptor {
    pub target: TextureTarget,
    pub size: Size,
    /// Internal format passed to TexImage2D or TexStorage2D
    pub internal_format: u32,
    /// Client data format of uploads
    pub format: u32,
    /// Client data type of uploads
    pub data_type: u32,
    /// Allocated with TexStorage2D (sized, immutable)
    pub immutable_storage: bool,
    pub is_compressed: bool,
    /// Hint the driver to allocate for framebuffer attachment
    pub framebuffer_attachment_angle: bool,
}

/// Texture driver trait
///
/// Implementations must be usable from whichever thread owns the backings.
pub trait TextureDriver: Send + Sync {
    /// Driver name for logs
    fn name(&self) -> &str;

    /// Allocate a texture
    fn create_texture(&self, desc: &TextureDescriptor) -> SharedImageResult<TextureId>;

    /// Upload a full, tightly packed image into level 0
    fn upload(&self, texture: TextureId, data: &[u8]) -> SharedImageResult<()>;

    /// Release a texture; unknown ids are ignored
    fn delete_texture(&self, texture: TextureId);
}

/// A texture held by the headless driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessTexture {
    pub desc: TextureDescriptor,
    /// Bytes of the last upload, if any
    pub uploaded_bytes: Option<usize>,
}

#[derive(Debug, Default)]
struct HeadlessState {
    next_id: u32,
    textures: HashMap<TextureId, HeadlessTexture>,
    fail_allocations: bool,
    allocations: u64,
    uploads: u64,
    deletions: u64,
}

/// In-process texture driver that allocates nothing on a GPU.
///
/// Validates descriptors the way a GL driver would reject them, records
/// every call, and can be told to fail allocations.
#[derive(Debug, Default)]
pub struct HeadlessTextureDriver {
    state: Mutex<HeadlessState>,
}

impl HeadlessTextureDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following allocation fail (or succeed again)
    pub fn set_fail_allocations(&self, fail: bool) {
        self.state.lock().fail_allocations = fail;
    }

    /// Textures currently allocated
    pub fn live_textures(&self) -> usize {
        self.state.lock().textures.len()
    }

    pub fn texture(&self, id: TextureId) -> Option<HeadlessTexture> {
        self.state.lock().textures.get(&id).cloned()
    }

    pub fn allocation_count(&self) -> u64 {
        self.state.lock().allocations
    }

    pub fn upload_count(&self) -> u64 {
        self.state.lock().uploads
    }

    pub fn deletion_count(&self) -> u64 {
        self.state.lock().deletions
    }
}

impl TextureDriver for HeadlessTextureDriver {
    fn name(&self) -> &str {
        "headless"
    }

    fn create_texture(&self, desc: &TextureDescriptor) -> SharedImageResult<TextureId> {
        let mut state = self.state.lock();
        if state.fail_allocations {
            return Err(SharedImageError::Driver("out of memory".into()));
        }
        if desc.size.is_empty() {
            return Err(SharedImageError::Driver(format!(
                "zero-sized texture {}",
                desc.size
            )));
        }
        if desc.immutable_storage {
            // TexStorage2D needs a sized format matching the upload layout
            let matches = gl::storage_format_components(desc.internal_format)
                .map(|(format, data_type)| {
                    format == desc.format && gl::same_data_type(data_type, desc.data_type)
                })
                .unwrap_or(false);
            if !matches {
                return Err(SharedImageError::Driver(format!(
                    "invalid storage format {:#x}",
                    desc.internal_format
                )));
            }
        }

        state.next_id += 1;
        let id = TextureId(state.next_id);
        state.textures.insert(
            id,
            HeadlessTexture {
                desc: *desc,
                uploaded_bytes: None,
            },
        );
        state.allocations += 1;
        Ok(id)
    }

    fn upload(&self, texture: TextureId, data: &[u8]) -> SharedImageResult<()> {
        let mut state = self.state.lock();
        let Some(entry) = state.textures.get_mut(&texture) else {
            return Err(SharedImageError::Driver(format!(
                "upload to unknown texture {:?}",
                texture
            )));
        };
        entry.uploaded_bytes = Some(data.len());
        state.uploads += 1;
        Ok(())
    }

    fn delete_texture(&self, texture: TextureId) {
        let mut state = self.state.lock();
        if state.textures.remove(&texture).is_some() {
            state.deletions += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba_desc(immutable_storage: bool) -> TextureDescriptor {
        TextureDescriptor {
            target: TextureTarget::Texture2D,
            size: Size::new(16, 16),
            internal_format: if immutable_storage { gl::RGBA8 } else { gl::RGBA },
            format: gl::RGBA,
            data_type: gl::UNSIGNED_BYTE,
            immutable_storage,
            is_compressed: false,
            framebuffer_attachment_angle: false,
        }
    }

    #[test]
    fn test_allocate_upload_delete() {
        let driver = HeadlessTextureDriver::new();
        let id = driver.create_texture(&rgba_desc(true)).unwrap();
        assert_eq!(driver.live_textures(), 1);

        driver.upload(id, &[0u8; 16 * 16 * 4]).unwrap();
        assert_eq!(driver.texture(id).unwrap().uploaded_bytes, Some(1024));

        driver.delete_texture(id);
        driver.delete_texture(id);
        assert_eq!(driver.live_textures(), 0);
        assert_eq!(driver.deletion_count(), 1);
    }

    #[test]
    fn test_unsized_storage_rejected() {
        let driver = HeadlessTextureDriver::new();
        let mut desc = rgba_desc(true);
        desc.internal_format = gl::RGBA;
        assert!(matches!(
            driver.create_texture(&desc),
            Err(SharedImageError::Driver(_))
        ));
        assert!(driver.create_texture(&rgba_desc(false)).is_ok());
    }

    #[test]
    fn test_failure_injection() {
        let driver = HeadlessTextureDriver::new();
        driver.set_fail_allocations(true);
        assert!(driver.create_texture(&rgba_desc(false)).is_err());
        driver.set_fail_allocations(false);
        assert!(driver.create_texture(&rgba_desc(false)).is_ok());
        assert_eq!(driver.allocation_count(), 1);
    }

    #[test]
    fn test_upload_to_unknown_texture() {
        let driver = HeadlessTextureDriver::new();
        assert!(driver.upload(TextureId(42), &[0]).is_err());
        assert_eq!(driver.upload_count(), 0);
    }
}
