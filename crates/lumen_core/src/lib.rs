//! # lumen_core - Shared Compositor Value Types
//!
//! Plain value types shared by the smoothness tracker and the shared-image
//! backing factories:
//! - **Timing**: monotonic `TimeTicks` and per-frame `FrameArgs`
//! - **Naming**: `Mailbox` identifiers for shared images
//! - **Formats**: single- and multi-planar pixel formats, sizes
//! - **Image metadata**: color space, surface origin, alpha handling
//!
//! Nothing in here owns a resource or talks to a driver.

pub mod format;
pub mod id;
pub mod image;
pub mod time;

pub use format::*;
pub use id::*;
pub use image::*;
pub use time::*;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::format::{MultiPlaneFormat, ResourceFormat, SharedImageFormat, Size};
    pub use crate::id::{Mailbox, MailboxGenerator};
    pub use crate::image::{AlphaType, ColorSpace, SurfaceHandle, SurfaceOrigin};
    pub use crate::time::{BeginFrameId, FrameArgs, TimeTicks};
}
