//! GL texture factory configuration

use crate::context::GlImplementation;
use crate::error::{SharedImageError, SharedImageResult};
use serde::{Deserialize, Serialize};

/// Configuration of a [`GlTextureImageBackingFactory`](crate::GlTextureImageBackingFactory)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    /// Textures are handed out as passthrough (rather than validating) textures
    pub use_passthrough: bool,

    /// GL implementation under the context
    pub gl_implementation: GlImplementation,

    /// ANGLE exposes GL_ANGLE_texture_usage
    pub texture_usage_angle: bool,

    /// Allocate uncompressed textures with immutable storage
    pub use_texture_storage: bool,

    /// Largest texture dimension the context supports
    pub max_texture_size: u32,

    /// This instance only serves CPU-upload requests (and no others)
    pub for_cpu_upload_usage: bool,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            use_passthrough: true,
            gl_implementation: GlImplementation::Native,
            texture_usage_angle: false,
            use_texture_storage: true,
            max_texture_size: 8192,
            for_cpu_upload_usage: false,
        }
    }
}

impl FactoryConfig {
    /// Validating command decoder; multi-planar formats are refused
    pub fn validating() -> Self {
        Self {
            use_passthrough: false,
            ..Default::default()
        }
    }

    /// ANGLE on Metal, with the texture usage extension
    pub fn angle_metal() -> Self {
        Self {
            gl_implementation: GlImplementation::AngleMetal,
            texture_usage_angle: true,
            ..Default::default()
        }
    }

    /// Instance dedicated to CPU-upload images
    pub fn cpu_upload() -> Self {
        Self {
            for_cpu_upload_usage: true,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> SharedImageResult<()> {
        if self.max_texture_size == 0 {
            return Err(SharedImageError::InvalidConfig(
                "max_texture_size must be at least 1".into(),
            ));
        }
        if self.texture_usage_angle && !self.gl_implementation.is_angle() {
            return Err(SharedImageError::InvalidConfig(format!(
                "texture_usage_angle requires ANGLE, got {}",
                self.gl_implementation.name()
            )));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> SharedImageResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> SharedImageResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
