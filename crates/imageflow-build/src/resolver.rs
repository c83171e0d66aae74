//! 最新バージョンの解決
//!
//! ローカルのイメージ一覧から、指定したイメージ名の系譜（lineage）における
//! 最大の `vMAJOR.MINOR` を求めます。結果はキャッシュせず、毎回エンジンに問い合わせます。

use crate::error::{BuildError, Result};
use imageflow_core::{ContainerEngine, ImageVersion, split_reference};

pub struct VersionResolver<'a, E: ?Sized> {
    engine: &'a E,
}

impl<'a, E: ContainerEngine + ?Sized> VersionResolver<'a, E> {
    pub fn new(engine: &'a E) -> Self {
        Self { engine }
    }

    /// `image_name` の最新バージョン（該当なしなら `v0.0`）
    pub async fn latest_version(&self, image_name: &str) -> Result<ImageVersion> {
        let tags = self
            .engine
            .list_image_tags()
            .await
            .map_err(BuildError::LineageUnavailable)?;

        let latest = latest_in_tags(image_name, &tags)?;
        tracing::debug!("Latest version of {}: {}", image_name, latest);
        Ok(latest)
    }
}

/// タグ一覧から `image_name` の最大バージョンを求める
///
/// 名前が一致するタグのバージョンが解析できない場合はエラー
/// （系譜の破損を黙って無視しない）。
pub fn latest_in_tags<S: AsRef<str>>(image_name: &str, tags: &[S]) -> Result<ImageVersion> {
    let mut latest = ImageVersion::ZERO;

    for reference in tags {
        let (repo, tag) = split_reference(reference.as_ref());
        if repo != image_name {
            continue;
        }

        let tag = tag.unwrap_or_default();
        let version: ImageVersion = tag.parse().map_err(|source| BuildError::CorruptedLineage {
            image: image_name.to_string(),
            tag: tag.to_string(),
            source,
        })?;

        // 辞書式で厳密に大きい場合のみ更新
        if version > latest {
            latest = version;
        }
    }

    Ok(latest)
}
