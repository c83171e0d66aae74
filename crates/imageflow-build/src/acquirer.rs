//! ベースイメージの取得
//!
//! ローカルに存在すればそれを使い、なければ pull します。リトライはしません。

use crate::error::{BuildError, Result};
use imageflow_core::{ContainerEngine, EngineError, ImageHandle, normalize_reference};

pub struct ImageAcquirer<'a, E: ?Sized> {
    engine: &'a E,
}

impl<'a, E: ContainerEngine + ?Sized> ImageAcquirer<'a, E> {
    pub fn new(engine: &'a E) -> Self {
        Self { engine }
    }

    /// ベースイメージがローカルにあることを保証する
    pub async fn ensure_base_image(&self, name: &str) -> Result<ImageHandle> {
        let reference = normalize_reference(name);
        let pull_failed = |cause: EngineError| BuildError::PullFailed {
            name: reference.clone(),
            cause,
        };

        let tags = self.engine.list_image_tags().await.map_err(pull_failed)?;

        if tags.iter().any(|tag| *tag == reference) {
            tracing::info!("Image already exists, skip pulling: {}", reference);
            return self
                .engine
                .inspect_image(&reference)
                .await
                .map_err(pull_failed);
        }

        tracing::info!("Image not found, pulling: {}", reference);
        let image = self
            .engine
            .pull_image(&reference)
            .await
            .map_err(pull_failed)?;
        tracing::info!("Image successfully pulled: {}", reference);

        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageflow_core::MockContainerEngine;

    fn handle(reference: &str) -> ImageHandle {
        ImageHandle {
            id: "sha256:base".to_string(),
            reference: reference.to_string(),
        }
    }

    #[tokio::test]
    async fn test_cached_image_is_not_pulled() {
        let mut engine = MockContainerEngine::new();
        engine
            .expect_list_image_tags()
            .returning(|| Ok(vec!["python:3.11".to_string()]));
        engine
            .expect_inspect_image()
            .withf(|reference| reference == "python:3.11")
            .times(1)
            .returning(|reference| Ok(handle(reference)));
        engine.expect_pull_image().never();

        let image = ImageAcquirer::new(&engine)
            .ensure_base_image("python:3.11")
            .await
            .unwrap();
        assert_eq!(image.reference, "python:3.11");
    }

    #[tokio::test]
    async fn test_missing_image_is_pulled() {
        let mut engine = MockContainerEngine::new();
        engine
            .expect_list_image_tags()
            .returning(|| Ok(vec!["python:3.10".to_string()]));
        engine
            .expect_pull_image()
            .withf(|reference| reference == "python:3.11")
            .times(1)
            .returning(|reference| Ok(handle(reference)));

        let image = ImageAcquirer::new(&engine)
            .ensure_base_image("python:3.11")
            .await
            .unwrap();
        assert_eq!(image.reference, "python:3.11");
    }

    #[tokio::test]
    async fn test_untagged_name_matches_latest() {
        let mut engine = MockContainerEngine::new();
        engine
            .expect_list_image_tags()
            .returning(|| Ok(vec!["ubuntu:latest".to_string()]));
        engine
            .expect_inspect_image()
            .withf(|reference| reference == "ubuntu:latest")
            .returning(|reference| Ok(handle(reference)));
        engine.expect_pull_image().never();

        assert!(
            ImageAcquirer::new(&engine)
                .ensure_base_image("ubuntu")
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_pull_failure_is_fatal() {
        let mut engine = MockContainerEngine::new();
        engine.expect_list_image_tags().returning(|| Ok(vec![]));
        engine
            .expect_pull_image()
            .times(1)
            .returning(|reference| Err(EngineError::NotFound(reference.to_string())));

        match ImageAcquirer::new(&engine)
            .ensure_base_image("nonexistent/image:v1")
            .await
        {
            Err(BuildError::PullFailed { name, .. }) => {
                assert_eq!(name, "nonexistent/image:v1");
            }
            other => panic!("Expected PullFailed, got {:?}", other),
        }
    }
}
