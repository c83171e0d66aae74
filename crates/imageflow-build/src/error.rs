use imageflow_core::{EngineError, ImageVersion, VersionError};
use thiserror::Error;

/// ベースイメージ取得・ビルドの致命的エラー
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Failed to pull image '{name}': {cause}")]
    PullFailed {
        name: String,
        #[source]
        cause: EngineError,
    },

    #[error(
        "Invalid image version '{candidate}' given, new version should be higher than the latest one '{latest}'"
    )]
    InvalidVersion {
        candidate: ImageVersion,
        latest: ImageVersion,
    },

    #[error("Build failed: {cause}")]
    BuildFailed {
        #[source]
        cause: EngineError,
    },

    #[error("Image '{image}' has a malformed version tag '{tag}': {source}")]
    CorruptedLineage {
        image: String,
        tag: String,
        #[source]
        source: VersionError,
    },

    #[error("Failed to list local images: {0}")]
    LineageUnavailable(#[source] EngineError),
}

impl BuildError {
    /// ユーザー向けの分かりやすいエラーメッセージ
    pub fn user_message(&self) -> String {
        match self {
            BuildError::InvalidVersion { candidate, latest } => {
                format!(
                    "バージョン {} は公開できません（最新: {}）\n\
                     \n\
                     解決方法:\n\
                     1. {} より大きいバージョンを --tag に指定してください\n\
                     2. v0.0 は公開できません",
                    candidate, latest, latest
                )
            }
            BuildError::CorruptedLineage { image, tag, .. } => {
                format!(
                    "イメージ '{}' に不正なタグ '{}' が存在します\n\
                     \n\
                     vMAJOR.MINOR 形式以外のタグを削除してください:\n\
                        docker rmi {}:{}",
                    image, tag, image, tag
                )
            }
            BuildError::BuildFailed { cause } => {
                format!(
                    "ビルドに失敗しました: {}\n\
                     \n\
                     Dockerfileの内容を確認してください。",
                    cause
                )
            }
            _ => format!("{}", self),
        }
    }
}

/// レジストリ公開の失敗（致命的ではない）
///
/// [`crate::PublishOutcome::Skipped`] の中でのみ扱われ、パイプラインを止めません。
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Login to {registry} failed: {cause}")]
    LoginFailed {
        registry: String,
        #[source]
        cause: EngineError,
    },

    #[error("Failed to tag {local} as {target}: {cause}")]
    TagFailed {
        local: String,
        target: String,
        #[source]
        cause: EngineError,
    },

    #[error("Failed to push {target}: {cause}")]
    PushFailed {
        target: String,
        #[source]
        cause: EngineError,
    },
}

pub type Result<T> = std::result::Result<T, BuildError>;
pub type BuildResult<T> = Result<T>;
