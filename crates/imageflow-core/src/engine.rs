//! Container engine abstraction
//!
//! The release pipeline talks to the container daemon only through this
//! trait. The Docker implementation lives in the `imageflow` binary crate;
//! tests use the mockall-generated `MockContainerEngine` (`mock` feature).

use crate::error::EngineResult;
use crate::model::{
    ContainerHandle, ContainerSpec, ContainerSummary, ImageHandle, RegistryCredentials,
};
use async_trait::async_trait;
use std::path::Path;

#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Every `repo:tag` known to the local image store.
    async fn list_image_tags(&self) -> EngineResult<Vec<String>>;

    /// Look up a local image by reference.
    async fn inspect_image(&self, reference: &str) -> EngineResult<ImageHandle>;

    /// Pull an image from its registry.
    async fn pull_image(&self, reference: &str) -> EngineResult<ImageHandle>;

    /// Build an image from a Dockerfile location and tag it as `tag`.
    async fn build_image(&self, dockerfile_location: &Path, tag: &str)
    -> EngineResult<ImageHandle>;

    /// Add `repository:tag` to an existing local image.
    async fn tag_image(&self, source: &str, repository: &str, tag: &str) -> EngineResult<()>;

    /// Push `repository:tag` to its registry.
    async fn push_image(
        &self,
        repository: &str,
        tag: &str,
        credentials: &RegistryCredentials,
    ) -> EngineResult<()>;

    /// All containers, running or stopped.
    async fn list_containers(&self) -> EngineResult<Vec<ContainerSummary>>;

    /// Stop a container by id or name. Already stopped is not an error.
    async fn stop_container(&self, id: &str) -> EngineResult<()>;

    async fn remove_container(&self, id: &str) -> EngineResult<()>;

    /// Create and start a detached container.
    async fn run_container(&self, spec: &ContainerSpec) -> EngineResult<ContainerHandle>;

    async fn login(&self, credentials: &RegistryCredentials) -> EngineResult<()>;
}
