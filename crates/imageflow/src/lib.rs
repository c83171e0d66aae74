//! imageflow: version-gated release of a single container image
//!
//! Pulls the base image, builds `MY_IMAGE_NAME:<tag>` only when the tag is
//! newer than every local version, publishes it to the registry and relaunches
//! the named container from it.

pub mod docker;
pub mod logging;
pub mod pipeline;

pub use docker::DockerEngine;
pub use pipeline::{
    PipelineError, PipelineOptions, PipelineReport, ReleaseContext, run_pipeline,
};
