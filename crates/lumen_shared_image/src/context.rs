//! Execution context a shared image request is made in

use serde::{Deserialize, Serialize};

/// Rendering backend of the context that will use the image
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendContextType {
    /// GL (or GLES) context
    #[default]
    Gl,
    Vulkan,
    Metal,
    Dawn,
}

impl BackendContextType {
    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gl => "GL",
            Self::Vulkan => "Vulkan",
            Self::Metal => "Metal",
            Self::Dawn => "Dawn",
        }
    }

    pub fn is_gl(&self) -> bool {
        matches!(self, Self::Gl)
    }
}

/// GL implementation backing the factory's context
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GlImplementation {
    /// Platform GL or GLES driver
    #[default]
    Native,
    AngleOpenGl,
    AngleVulkan,
    AngleMetal,
    AngleSwiftShader,
}

impl GlImplementation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::AngleOpenGl => "ANGLE/OpenGL",
            Self::AngleVulkan => "ANGLE/Vulkan",
            Self::AngleMetal => "ANGLE/Metal",
            Self::AngleSwiftShader => "ANGLE/SwiftShader",
        }
    }

    pub fn is_angle(&self) -> bool {
        !matches!(self, Self::Native)
    }
}

/// Client memory a shared image is imported from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GpuMemoryBufferType {
    /// No client memory; the factory allocates
    #[default]
    EmptyBuffer,
    SharedMemoryBuffer,
    NativePixmap,
}
