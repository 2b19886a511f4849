//! Image metadata carried alongside a shared image

use serde::{Deserialize, Serialize};

/// Color space of the stored pixels
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorSpace {
    #[default]
    Srgb,
    DisplayP3,
    Rec601,
    Rec709,
    /// BT.2020 primaries with the PQ transfer function
    Rec2020Pq,
    /// BT.2020 primaries with the HLG transfer function
    Rec2020Hlg,
    ExtendedSrgbLinear,
}

impl ColorSpace {
    pub fn is_hdr(&self) -> bool {
        matches!(self, Self::Rec2020Pq | Self::Rec2020Hlg | Self::ExtendedSrgbLinear)
    }
}

/// Which corner row 0 of the image starts at
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceOrigin {
    #[default]
    TopLeft,
    BottomLeft,
}

/// How alpha is stored
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlphaType {
    #[default]
    Premul,
    Unpremul,
    Opaque,
}

/// Native window the image may be presented to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceHandle(pub u64);

impl SurfaceHandle {
    pub const NULL: Self = Self(0);

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}
