//! Factory selection
//!
//! A request is offered to each registered factory in turn; the first one
//! that admits it creates the backing.

use crate::backing::{SharedImageBacking, SharedImageDesc};
use crate::error::{SharedImageError, SharedImageResult};
use crate::factory::{GlTextureImageBackingFactory, ImageBackingRequest};
use lumen_core::SurfaceHandle;

/// Shared image backing factory trait
pub trait SharedImageBackingFactory: Send + Sync {
    /// Factory name for logs
    fn name(&self) -> &'static str;

    /// Whether this factory can create the requested backing
    fn is_supported(&self, request: &ImageBackingRequest, pixel_data: &[u8]) -> bool;

    /// Create a backing with undefined content
    fn create_shared_image(
        &self,
        desc: &SharedImageDesc,
        surface_handle: SurfaceHandle,
    ) -> SharedImageResult<Box<dyn SharedImageBacking>>;

    /// Create a backing initialized with `pixel_data`
    fn create_shared_image_with_data(
        &self,
        desc: &SharedImageDesc,
        pixel_data: &[u8],
    ) -> SharedImageResult<Box<dyn SharedImageBacking>>;
}

impl SharedImageBackingFactory for GlTextureImageBackingFactory {
    fn name(&self) -> &'static str {
        "GlTextureImageBackingFactory"
    }

    fn is_supported(&self, request: &ImageBackingRequest, pixel_data: &[u8]) -> bool {
        GlTextureImageBackingFactory::is_supported(self, request, pixel_data)
    }

    fn create_shared_image(
        &self,
        desc: &SharedImageDesc,
        surface_handle: SurfaceHandle,
    ) -> SharedImageResult<Box<dyn SharedImageBacking>> {
        let backing = GlTextureImageBackingFactory::create_shared_image(self, desc, surface_handle)?;
        Ok(Box::new(backing))
    }

    fn create_shared_image_with_data(
        &self,
        desc: &SharedImageDesc,
        pixel_data: &[u8],
    ) -> SharedImageResult<Box<dyn SharedImageBacking>> {
        let backing =
            GlTextureImageBackingFactory::create_shared_image_with_data(self, desc, pixel_data)?;
        Ok(Box::new(backing))
    }
}

/// Ordered list of factories tried for each request
#[derive(Default)]
pub struct FactoryChain {
    factories: Vec<Box<dyn SharedImageBackingFactory>>,
}

impl FactoryChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory after the existing ones
    pub fn push(&mut self, factory: Box<dyn SharedImageBackingFactory>) {
        log::debug!("Registered shared image factory {}", factory.name());
        self.factories.push(factory);
    }

    pub fn with(mut self, factory: Box<dyn SharedImageBackingFactory>) -> Self {
        self.push(factory);
        self
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// First factory admitting `request`
    pub fn find(
        &self,
        request: &ImageBackingRequest,
        pixel_data: &[u8],
    ) -> Option<&dyn SharedImageBackingFactory> {
        self.factories
            .iter()
            .map(|factory| factory.as_ref())
            .find(|factory| factory.is_supported(request, pixel_data))
    }

    /// Create `desc` with the first factory admitting it.
    ///
    /// Only the call context of `request` (thread safety, client memory,
    /// consumer backend) is used. Format, size and usage are always taken
    /// from `desc`, so the factory checks exactly what it creates.
    pub fn create_shared_image(
        &self,
        request: &ImageBackingRequest,
        desc: &SharedImageDesc,
        surface_handle: SurfaceHandle,
    ) -> SharedImageResult<Box<dyn SharedImageBacking>> {
        let factory = self.select(request, desc, &[])?;
        factory.create_shared_image(desc, surface_handle)
    }

    /// Create `desc` with initial content using the first factory admitting it
    pub fn create_shared_image_with_data(
        &self,
        request: &ImageBackingRequest,
        desc: &SharedImageDesc,
        pixel_data: &[u8],
    ) -> SharedImageResult<Box<dyn SharedImageBacking>> {
        let factory = self.select(request, desc, pixel_data)?;
        factory.create_shared_image_with_data(desc, pixel_data)
    }

    fn select(
        &self,
        request: &ImageBackingRequest,
        desc: &SharedImageDesc,
        pixel_data: &[u8],
    ) -> SharedImageResult<&dyn SharedImageBackingFactory> {
        let checked = request.for_desc(desc);
        if checked != *request {
            log::debug!(
                "Request for {} {} replaced by {} {} usage {} from the descriptor",
                request.format,
                request.size,
                checked.format,
                checked.size,
                checked.usage
            );
        }
        let request = &checked;
        match self.find(request, pixel_data) {
            Some(factory) => {
                log::trace!("Using {} for {} {}", factory.name(), request.format, request.size);
                Ok(factory)
            }
            None => {
                log::warn!(
                    "No factory for {} {} with usage {}",
                    request.format,
                    request.size,
                    request.usage
                );
                Err(SharedImageError::unsupported(
                    request.format,
                    format!("no factory among {} admits the request", self.factories.len()),
                ))
            }
        }
    }
}

impl std::fmt::Debug for FactoryChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.factories.iter().map(|factory| factory.name()))
            .finish()
    }
}
