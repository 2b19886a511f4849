//! Shared image pixel formats
//!
//! A shared image is either a single interleaved plane (`ResourceFormat`)
//! or a multi-planar YUV layout whose planes are themselves described by
//! single-plane formats.

use serde::{Deserialize, Serialize};

/// Single-plane pixel format
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum ResourceFormat {
    // 8-bit per channel
    Rgba8888,
    Bgra8888,
    Rgbx8888,
    Bgrx8888,
    Alpha8,
    Luminance8,
    R8,
    Rg88,

    // Packed
    Rgba4444,
    Rgb565,
    Bgr565,
    Rgba1010102,
    Bgra1010102,

    // 16-bit per channel
    R16,
    Rg1616,
    LuminanceF16,
    RgbaF16,

    // Compressed
    Etc1,

    // Legacy single-plane YUV; never backed by a plain texture
    Yvu420,
    Yuv420Biplanar,
}

impl ResourceFormat {
    /// All formats, in declaration order
    pub const ALL: [ResourceFormat; 20] = [
        Self::Rgba8888,
        Self::Bgra8888,
        Self::Rgbx8888,
        Self::Bgrx8888,
        Self::Alpha8,
        Self::Luminance8,
        Self::R8,
        Self::Rg88,
        Self::Rgba4444,
        Self::Rgb565,
        Self::Bgr565,
        Self::Rgba1010102,
        Self::Bgra1010102,
        Self::R16,
        Self::Rg1616,
        Self::LuminanceF16,
        Self::RgbaF16,
        Self::Etc1,
        Self::Yvu420,
        Self::Yuv420Biplanar,
    ];

    /// Check if this is a block-compressed format
    pub fn is_compressed(&self) -> bool {
        matches!(self, Self::Etc1)
    }

    /// Bits per pixel (averaged over a block for compressed formats)
    pub fn bits_per_pixel(&self) -> u32 {
        match self {
            Self::Rgba8888
            | Self::Bgra8888
            | Self::Rgbx8888
            | Self::Bgrx8888
            | Self::Rgba1010102
            | Self::Bgra1010102
            | Self::Rg1616 => 32,
            Self::Alpha8 | Self::Luminance8 | Self::R8 => 8,
            Self::Rg88
            | Self::Rgba4444
            | Self::Rgb565
            | Self::Bgr565
            | Self::R16
            | Self::LuminanceF16 => 16,
            Self::RgbaF16 => 64,
            Self::Etc1 => 4,
            Self::Yvu420 | Self::Yuv420Biplanar => 12,
        }
    }

    /// Tightly packed byte size of a `size` image in this format.
    ///
    /// Returns `None` on overflow.
    pub fn size_in_bytes(&self, size: Size) -> Option<usize> {
        let width = size.width as usize;
        let height = size.height as usize;
        if self.is_compressed() {
            // ETC1: 4x4 blocks of 8 bytes
            let blocks_wide = width.checked_add(3)? / 4;
            let blocks_high = height.checked_add(3)? / 4;
            return blocks_wide.checked_mul(blocks_high)?.checked_mul(8);
        }
        let row_bits = width.checked_mul(self.bits_per_pixel() as usize)?;
        let row_bytes = row_bits.checked_add(7)? / 8;
        row_bytes.checked_mul(height)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Rgba8888 => "RGBA_8888",
            Self::Bgra8888 => "BGRA_8888",
            Self::Rgbx8888 => "RGBX_8888",
            Self::Bgrx8888 => "BGRX_8888",
            Self::Alpha8 => "ALPHA_8",
            Self::Luminance8 => "LUMINANCE_8",
            Self::R8 => "RED_8",
            Self::Rg88 => "RG_88",
            Self::Rgba4444 => "RGBA_4444",
            Self::Rgb565 => "RGB_565",
            Self::Bgr565 => "BGR_565",
            Self::Rgba1010102 => "RGBA_1010102",
            Self::Bgra1010102 => "BGRA_1010102",
            Self::R16 => "R16_EXT",
            Self::Rg1616 => "RG16_EXT",
            Self::LuminanceF16 => "LUMINANCE_F16",
            Self::RgbaF16 => "RGBA_F16",
            Self::Etc1 => "ETC1",
            Self::Yvu420 => "YVU_420",
            Self::Yuv420Biplanar => "YUV_420_BIPLANAR",
        }
    }
}

/// Multi-planar YUV layouts
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MultiPlaneFormat {
    /// Luma plane + interleaved half-resolution chroma plane
    Nv12,
    /// Luma plane + two half-resolution chroma planes
    Yv12,
}

impl MultiPlaneFormat {
    pub fn number_of_planes(&self) -> usize {
        match self {
            Self::Nv12 => 2,
            Self::Yv12 => 3,
        }
    }

    /// Single-plane format each plane is stored in
    pub fn plane_format(&self, plane: usize) -> Option<ResourceFormat> {
        match (self, plane) {
            (Self::Nv12, 0) => Some(ResourceFormat::R8),
            (Self::Nv12, 1) => Some(ResourceFormat::Rg88),
            (Self::Yv12, 0..=2) => Some(ResourceFormat::R8),
            _ => None,
        }
    }

    /// Size of `plane` for an image of `size`; chroma planes are 2x2 subsampled
    pub fn plane_size(&self, plane: usize, size: Size) -> Size {
        if plane == 0 {
            size
        } else {
            Size::new(size.width.div_ceil(2), size.height.div_ceil(2))
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Nv12 => "NV12",
            Self::Yv12 => "YV12",
        }
    }
}

/// Format of a shared image
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SharedImageFormat {
    SinglePlane(ResourceFormat),
    MultiPlane(MultiPlaneFormat),
}

impl SharedImageFormat {
    pub const RGBA_8888: Self = Self::SinglePlane(ResourceFormat::Rgba8888);
    pub const BGRA_8888: Self = Self::SinglePlane(ResourceFormat::Bgra8888);
    pub const R_8: Self = Self::SinglePlane(ResourceFormat::R8);
    pub const RG_88: Self = Self::SinglePlane(ResourceFormat::Rg88);
    pub const NV12: Self = Self::MultiPlane(MultiPlaneFormat::Nv12);
    pub const YV12: Self = Self::MultiPlane(MultiPlaneFormat::Yv12);

    pub fn is_multi_plane(&self) -> bool {
        matches!(self, Self::MultiPlane(_))
    }

    pub fn is_single_plane(&self) -> bool {
        matches!(self, Self::SinglePlane(_))
    }

    /// The underlying single-plane format, if any
    pub fn resource_format(&self) -> Option<ResourceFormat> {
        match self {
            Self::SinglePlane(format) => Some(*format),
            Self::MultiPlane(_) => None,
        }
    }

    pub fn number_of_planes(&self) -> usize {
        match self {
            Self::SinglePlane(_) => 1,
            Self::MultiPlane(format) => format.number_of_planes(),
        }
    }

    /// Single-plane format of `plane`
    pub fn plane_format(&self, plane: usize) -> Option<ResourceFormat> {
        match self {
            Self::SinglePlane(format) if plane == 0 => Some(*format),
            Self::SinglePlane(_) => None,
            Self::MultiPlane(format) => format.plane_format(plane),
        }
    }

    /// Dimensions of `plane` for an image of `size`
    pub fn plane_size(&self, plane: usize, size: Size) -> Size {
        match self {
            Self::SinglePlane(_) => size,
            Self::MultiPlane(format) => format.plane_size(plane, size),
        }
    }

    pub fn is_compressed(&self) -> bool {
        self.resource_format()
            .map(|format| format.is_compressed())
            .unwrap_or(false)
    }

    /// Total tightly packed byte size over all planes, `None` on overflow
    pub fn estimated_size_in_bytes(&self, size: Size) -> Option<usize> {
        (0..self.number_of_planes()).try_fold(0usize, |total, plane| {
            let plane_bytes = self
                .plane_format(plane)?
                .size_in_bytes(self.plane_size(plane, size))?;
            total.checked_add(plane_bytes)
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SinglePlane(format) => format.name(),
            Self::MultiPlane(format) => format.name(),
        }
    }
}

impl From<ResourceFormat> for SharedImageFormat {
    fn from(format: ResourceFormat) -> Self {
        Self::SinglePlane(format)
    }
}

impl core::fmt::Display for SharedImageFormat {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Image dimensions in pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl core::fmt::Display for Size {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
