//! Per-format texture capabilities
//!
//! [`BaseCapabilities`] is what the GL context reports for single-plane
//! formats. [`CapabilityTable`] is built from it once per factory and adds
//! the multi-planar YUV layouts whose planes the context can store.

use lumen_core::{MultiPlaneFormat, ResourceFormat, SharedImageFormat};
use std::collections::HashMap;

/// GL enum values used by the format table
pub mod gl {
    pub const ALPHA: u32 = 0x1906;
    pub const RGB: u32 = 0x1907;
    pub const RGBA: u32 = 0x1908;
    pub const LUMINANCE: u32 = 0x1909;
    pub const RED_EXT: u32 = 0x1903;
    pub const RG_EXT: u32 = 0x8227;
    pub const BGRA_EXT: u32 = 0x80E1;

    pub const UNSIGNED_BYTE: u32 = 0x1401;
    pub const UNSIGNED_SHORT: u32 = 0x1403;
    pub const HALF_FLOAT: u32 = 0x140B;
    pub const HALF_FLOAT_OES: u32 = 0x8D61;
    pub const UNSIGNED_SHORT_4_4_4_4: u32 = 0x8033;
    pub const UNSIGNED_SHORT_5_6_5: u32 = 0x8363;
    pub const UNSIGNED_INT_2_10_10_10_REV: u32 = 0x8368;

    pub const RGB8: u32 = 0x8051;
    pub const RGBA8: u32 = 0x8058;
    pub const BGRA8_EXT: u32 = 0x93A1;
    pub const R8: u32 = 0x8229;
    pub const RG8: u32 = 0x822B;
    pub const ALPHA8: u32 = 0x803C;
    pub const LUMINANCE8: u32 = 0x8040;
    pub const RGBA4: u32 = 0x8056;
    pub const RGB565: u32 = 0x8D62;
    pub const RGB10_A2: u32 = 0x8059;
    pub const R16_EXT: u32 = 0x822A;
    pub const RG16_EXT: u32 = 0x822C;
    pub const LUMINANCE16F_EXT: u32 = 0x881E;
    pub const RGBA16F: u32 = 0x881A;
    pub const ETC1_RGB8_OES: u32 = 0x8D64;

    /// Unsized `(format, type)` pair an immutable storage format implies
    pub fn storage_format_components(storage_format: u32) -> Option<(u32, u32)> {
        let components = match storage_format {
            RGB8 => (RGB, UNSIGNED_BYTE),
            RGBA8 => (RGBA, UNSIGNED_BYTE),
            BGRA8_EXT => (BGRA_EXT, UNSIGNED_BYTE),
            R8 => (RED_EXT, UNSIGNED_BYTE),
            RG8 => (RG_EXT, UNSIGNED_BYTE),
            ALPHA8 => (ALPHA, UNSIGNED_BYTE),
            LUMINANCE8 => (LUMINANCE, UNSIGNED_BYTE),
            RGBA4 => (RGBA, UNSIGNED_SHORT_4_4_4_4),
            RGB565 => (RGB, UNSIGNED_SHORT_5_6_5),
            RGB10_A2 => (RGBA, UNSIGNED_INT_2_10_10_10_REV),
            R16_EXT => (RED_EXT, UNSIGNED_SHORT),
            RG16_EXT => (RG_EXT, UNSIGNED_SHORT),
            LUMINANCE16F_EXT => (LUMINANCE, HALF_FLOAT),
            RGBA16F => (RGBA, HALF_FLOAT),
            _ => return None,
        };
        Some(components)
    }

    /// Whether two data types describe the same client layout
    pub fn same_data_type(a: u32, b: u32) -> bool {
        let normalize = |t: u32| if t == HALF_FLOAT_OES { HALF_FLOAT } else { t };
        normalize(a) == normalize(b)
    }
}

/// GL description of one texture plane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatInfo {
    pub resource_format: ResourceFormat,
    /// Client data format (`format` argument of TexImage2D)
    pub gl_format: u32,
    /// Client data type
    pub gl_type: u32,
    /// Internal format for TexImage2D
    pub image_internal_format: u32,
    /// Sized internal format for TexStorage2D
    pub storage_internal_format: u32,
    pub is_compressed: bool,
    /// The context can actually create textures of this format
    pub enabled: bool,
}

impl FormatInfo {
    /// GL description of `format`, `None` if no GL texture can hold it
    pub fn for_format(format: ResourceFormat) -> Option<Self> {
        use ResourceFormat as F;
        let (gl_format, gl_type, image_internal_format, storage_internal_format) = match format {
            F::Rgba8888 | F::Rgbx8888 => (gl::RGBA, gl::UNSIGNED_BYTE, gl::RGBA, gl::RGBA8),
            F::Bgra8888 | F::Bgrx8888 => {
                (gl::BGRA_EXT, gl::UNSIGNED_BYTE, gl::BGRA_EXT, gl::BGRA8_EXT)
            }
            F::Alpha8 => (gl::ALPHA, gl::UNSIGNED_BYTE, gl::ALPHA, gl::ALPHA8),
            F::Luminance8 => (gl::LUMINANCE, gl::UNSIGNED_BYTE, gl::LUMINANCE, gl::LUMINANCE8),
            F::R8 => (gl::RED_EXT, gl::UNSIGNED_BYTE, gl::RED_EXT, gl::R8),
            F::Rg88 => (gl::RG_EXT, gl::UNSIGNED_BYTE, gl::RG_EXT, gl::RG8),
            F::Rgba4444 => (gl::RGBA, gl::UNSIGNED_SHORT_4_4_4_4, gl::RGBA, gl::RGBA4),
            F::Rgb565 => (gl::RGB, gl::UNSIGNED_SHORT_5_6_5, gl::RGB, gl::RGB565),
            F::Rgba1010102 => (
                gl::RGBA,
                gl::UNSIGNED_INT_2_10_10_10_REV,
                gl::RGB10_A2,
                gl::RGB10_A2,
            ),
            F::R16 => (gl::RED_EXT, gl::UNSIGNED_SHORT, gl::R16_EXT, gl::R16_EXT),
            F::Rg1616 => (gl::RG_EXT, gl::UNSIGNED_SHORT, gl::RG16_EXT, gl::RG16_EXT),
            F::LuminanceF16 => (
                gl::LUMINANCE,
                gl::HALF_FLOAT_OES,
                gl::LUMINANCE,
                gl::LUMINANCE16F_EXT,
            ),
            F::RgbaF16 => (gl::RGBA, gl::HALF_FLOAT_OES, gl::RGBA, gl::RGBA16F),
            F::Etc1 => (
                gl::ETC1_RGB8_OES,
                gl::UNSIGNED_BYTE,
                gl::ETC1_RGB8_OES,
                gl::ETC1_RGB8_OES,
            ),
            F::Bgr565 | F::Bgra1010102 | F::Yvu420 | F::Yuv420Biplanar => return None,
        };
        Some(Self {
            resource_format: format,
            gl_format,
            gl_type,
            image_internal_format,
            storage_internal_format,
            is_compressed: format.is_compressed(),
            enabled: true,
        })
    }

    pub fn disabled(self) -> Self {
        Self {
            enabled: false,
            ..self
        }
    }

    /// CPU-written pixels can be uploaded as-is.
    ///
    /// Packed and compressed layouts need conversion first.
    pub fn supports_pixel_upload(&self) -> bool {
        !self.is_compressed
            && self.enabled
            && matches!(
                self.gl_type,
                gl::UNSIGNED_BYTE | gl::UNSIGNED_SHORT | gl::HALF_FLOAT_OES
            )
    }
}

/// Single-plane format capabilities reported by a GL context
#[derive(Debug, Clone, Default)]
pub struct BaseCapabilities {
    formats: HashMap<ResourceFormat, FormatInfo>,
}

impl BaseCapabilities {
    /// No formats at all
    pub fn new() -> Self {
        Self::default()
    }

    /// Every format a GLES3 context can store in a plain texture
    pub fn gles3() -> Self {
        Self {
            formats: ResourceFormat::ALL
                .iter()
                .filter_map(|&format| FormatInfo::for_format(format).map(|info| (format, info)))
                .collect(),
        }
    }

    /// Add `format` with its default GL description
    pub fn with(mut self, format: ResourceFormat) -> Self {
        if let Some(info) = FormatInfo::for_format(format) {
            self.formats.insert(format, info);
        }
        self
    }

    pub fn without(mut self, format: ResourceFormat) -> Self {
        self.formats.remove(&format);
        self
    }

    pub fn insert(&mut self, info: FormatInfo) {
        self.formats.insert(info.resource_format, info);
    }

    pub fn get(&self, format: ResourceFormat) -> Option<&FormatInfo> {
        self.formats.get(&format)
    }

    pub fn contains(&self, format: ResourceFormat) -> bool {
        self.formats.contains_key(&format)
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }
}

/// Per-plane capabilities of every shared image format a factory handles.
///
/// Immutable once built.
#[derive(Debug, Clone)]
pub struct CapabilityTable {
    formats: HashMap<SharedImageFormat, Vec<FormatInfo>>,
}

impl CapabilityTable {
    pub fn new(base: &BaseCapabilities) -> Self {
        let mut formats: HashMap<SharedImageFormat, Vec<FormatInfo>> = base
            .formats
            .iter()
            .map(|(&format, &info)| (SharedImageFormat::SinglePlane(format), vec![info]))
            .collect();

        // YUV is sampleable exactly when its plane formats are
        if let (Some(&r8), Some(&rg88)) = (
            base.get(ResourceFormat::R8),
            base.get(ResourceFormat::Rg88),
        ) {
            formats.insert(SharedImageFormat::MultiPlane(MultiPlaneFormat::Nv12), vec![r8, rg88]);
            formats.insert(
                SharedImageFormat::MultiPlane(MultiPlaneFormat::Yv12),
                vec![r8, r8, r8],
            );
        }

        log::debug!("Built capability table with {} formats", formats.len());
        Self { formats }
    }

    /// Per-plane descriptors, `None` if the format is not in the table
    pub fn get(&self, format: SharedImageFormat) -> Option<&[FormatInfo]> {
        self.formats.get(&format).map(Vec::as_slice)
    }

    pub fn contains(&self, format: SharedImageFormat) -> bool {
        self.formats.contains_key(&format)
    }

    /// Present with every plane enabled
    pub fn is_enabled(&self, format: SharedImageFormat) -> bool {
        self.get(format)
            .map(|planes| planes.iter().all(|info| info.enabled))
            .unwrap_or(false)
    }

    /// Every plane accepts CPU-written pixels as-is
    pub fn supports_pixel_upload(&self, format: SharedImageFormat) -> bool {
        self.get(format)
            .map(|planes| planes.iter().all(FormatInfo::supports_pixel_upload))
            .unwrap_or(false)
    }

    pub fn formats(&self) -> impl Iterator<Item = SharedImageFormat> + '_ {
        self.formats.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }
}
