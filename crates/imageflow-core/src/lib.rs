//! imageflow core
//!
//! バージョン比較、リリースパイプラインのドメインモデル、
//! およびコンテナエンジン抽象（`ContainerEngine`）を提供します。

pub mod engine;
pub mod error;
pub mod model;
pub mod version;

pub use engine::ContainerEngine;
#[cfg(feature = "mock")]
pub use engine::MockContainerEngine;
pub use error::{EngineError, EngineResult, VersionError};
pub use model::{
    AccessMode, BuildRequest, ContainerHandle, ContainerSpec, ContainerSummary, ImageHandle,
    ImageRef, PortBinding, PublishTarget, RegistryCredentials, VolumeBinding, normalize_reference,
    split_reference,
};
pub use version::{ImageVersion, is_valid_upgrade};
