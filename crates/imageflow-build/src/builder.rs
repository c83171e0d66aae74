use crate::error::{BuildError, Result};
use crate::resolver::VersionResolver;
use imageflow_core::{BuildRequest, ContainerEngine, ImageHandle, ImageVersion, is_valid_upgrade};

/// バージョン検証付きのイメージビルド
pub struct ReleaseBuilder<'a, E: ?Sized> {
    engine: &'a E,
}

impl<'a, E: ContainerEngine + ?Sized> ReleaseBuilder<'a, E> {
    pub fn new(engine: &'a E) -> Self {
        Self { engine }
    }

    /// 候補バージョンが既存の最新より新しいか検証し、最新バージョンを返す
    pub async fn check_version(&self, request: &BuildRequest) -> Result<ImageVersion> {
        let latest = VersionResolver::new(self.engine)
            .latest_version(&request.image_name)
            .await?;

        if !is_valid_upgrade(request.candidate_version, latest) {
            return Err(BuildError::InvalidVersion {
                candidate: request.candidate_version,
                latest,
            });
        }

        Ok(latest)
    }

    /// イメージをビルドし、検証に使った最新バージョンと合わせて返す
    ///
    /// バージョンが不正な場合はビルドバックエンドに触れる前に失敗します。
    pub async fn build(&self, request: &BuildRequest) -> Result<(ImageHandle, ImageVersion)> {
        let latest = self.check_version(request).await?;

        let tag = request.image_ref().reference();
        tracing::info!("Building image: {} (latest: {})", tag, latest);
        tracing::debug!("Dockerfile location: {}", request.dockerfile_path.display());

        let image = self
            .engine
            .build_image(&request.dockerfile_path, &tag)
            .await
            .map_err(|cause| BuildError::BuildFailed { cause })?;

        tracing::info!("Successfully built: {}", tag);
        Ok((image, latest))
    }
}
