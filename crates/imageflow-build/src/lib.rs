//! imageflow image build and publishing
//!
//! Version-gated release steps on top of [`imageflow_core::ContainerEngine`]:
//! resolving the latest local version, acquiring the base image, building the
//! candidate and publishing it to a registry.

pub mod acquirer;
pub mod builder;
pub mod context;
pub mod error;
pub mod progress;
pub mod publisher;
pub mod resolver;

pub use acquirer::ImageAcquirer;
pub use builder::ReleaseBuilder;
pub use context::ContextBuilder;
pub use error::{BuildError, BuildResult, PublishError};
pub use progress::BuildProgress;
pub use publisher::{PublishOutcome, RegistryPublisher};
pub use resolver::{VersionResolver, latest_in_tags};
