//! Shared image usage flags

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bitmask of the ways a shared image will be used
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SharedImageUsage(pub u32);

impl SharedImageUsage {
    pub const NONE: Self = Self(0);
    /// Sampled or drawn through the GLES2 interface
    pub const GLES2: Self = Self(1 << 0);
    /// GLES2 use will bind it as a framebuffer attachment
    pub const GLES2_FRAMEBUFFER_HINT: Self = Self(1 << 1);
    pub const RASTER: Self = Self(1 << 2);
    /// Read by the display compositor
    pub const DISPLAY_READ: Self = Self(1 << 3);
    /// Written by the display compositor
    pub const DISPLAY_WRITE: Self = Self(1 << 4);
    /// Presented directly as an overlay plane
    pub const SCANOUT: Self = Self(1 << 5);
    pub const WEBGPU: Self = Self(1 << 6);
    /// Written by a hardware video decoder
    pub const VIDEO_DECODE: Self = Self(1 << 7);
    pub const CONCURRENT_READ_WRITE: Self = Self(1 << 8);
    /// Pixels are written by the CPU and uploaded
    pub const CPU_UPLOAD: Self = Self(1 << 9);

    const NAMES: [(Self, &'static str); 10] = [
        (Self::GLES2, "GLES2"),
        (Self::GLES2_FRAMEBUFFER_HINT, "GLES2_FRAMEBUFFER_HINT"),
        (Self::RASTER, "RASTER"),
        (Self::DISPLAY_READ, "DISPLAY_READ"),
        (Self::DISPLAY_WRITE, "DISPLAY_WRITE"),
        (Self::SCANOUT, "SCANOUT"),
        (Self::WEBGPU, "WEBGPU"),
        (Self::VIDEO_DECODE, "VIDEO_DECODE"),
        (Self::CONCURRENT_READ_WRITE, "CONCURRENT_READ_WRITE"),
        (Self::CPU_UPLOAD, "CPU_UPLOAD"),
    ];

    pub fn bits(&self) -> u32 {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// All bits of `other` are set
    pub fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Any bit of `other` is set
    pub fn intersects(&self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// This set with every bit of `other` cleared
    pub fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl core::ops::BitOr for SharedImageUsage {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl core::ops::BitOrAssign for SharedImageUsage {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl core::ops::BitAnd for SharedImageUsage {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Display for SharedImageUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("NONE");
        }
        let mut first = true;
        for (flag, name) in Self::NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        let unknown = self.0 & !Self::NAMES.iter().fold(0, |bits, (flag, _)| bits | flag.0);
        if unknown != 0 {
            if !first {
                f.write_str("|")?;
            }
            write!(f, "{:#x}", unknown)?;
        }
        Ok(())
    }
}
