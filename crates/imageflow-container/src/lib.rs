//! Named container slot management for imageflow
//!
//! [`ContainerReplacer`] keeps at most one container under a fixed name and
//! [`spec_to_container_config`] turns a [`imageflow_core::ContainerSpec`] into
//! Docker API parameters.

pub mod converter;
pub mod error;
pub mod replacer;

pub use converter::spec_to_container_config;
pub use error::{ContainerError, Result, engine_error};
pub use replacer::{ContainerReplacer, SlotState};
