//! # lumen_shared_image - Shared Image Backings
//!
//! Allocation side of GPU shared images: given a format, size, usage, and
//! the context of the request, decide which factory can serve it and
//! create the backing.
//!
//! - **Capabilities**: per-format GL descriptors, with YUV layouts derived
//!   from their plane formats
//! - **GL texture factory**: admissibility rules and plain 2D texture backings
//! - **Factory chain**: first admitting factory wins
//! - **Texture driver**: the seam to the GL binding layer, with a headless
//!   implementation
//!
//! ```text
//! request ─► FactoryChain ─► GlTextureImageBackingFactory ─► TextureDriver
//!                                      │
//!                                      └─► GlTextureImageBacking (one texture per plane)
//! ```

pub mod backing;
pub mod capability;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod driver;
pub mod error;
pub mod factory;
pub mod usage;

pub use backing::{GlTextureImageBacking, SharedImageBacking, SharedImageDesc, TextureRepresentation};
pub use capability::{BaseCapabilities, CapabilityTable, FormatInfo};
pub use config::FactoryConfig;
pub use context::{BackendContextType, GlImplementation, GpuMemoryBufferType};
pub use dispatch::{FactoryChain, SharedImageBackingFactory};
pub use driver::{HeadlessTextureDriver, TextureDescriptor, TextureDriver, TextureId, TextureTarget};
pub use error::{SharedImageError, SharedImageResult};
pub use factory::{GlTextureImageBackingFactory, ImageBackingRequest};
pub use usage::SharedImageUsage;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::backing::{SharedImageBacking, SharedImageDesc};
    pub use crate::capability::BaseCapabilities;
    pub use crate::config::FactoryConfig;
    pub use crate::context::{BackendContextType, GpuMemoryBufferType};
    pub use crate::dispatch::{FactoryChain, SharedImageBackingFactory};
    pub use crate::driver::HeadlessTextureDriver;
    pub use crate::factory::{GlTextureImageBackingFactory, ImageBackingRequest};
    pub use crate::usage::SharedImageUsage;
    pub use lumen_core::{Mailbox, MailboxGenerator, SharedImageFormat, Size, SurfaceHandle};
}
