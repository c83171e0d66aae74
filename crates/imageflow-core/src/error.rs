use std::path::PathBuf;
use thiserror::Error;

/// バージョン文字列の解析エラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid image version '{input}': {reason}")]
pub struct VersionError {
    pub input: String,
    pub reason: &'static str,
}

impl VersionError {
    pub(crate) fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}

/// コンテナエンジン操作のエラー
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(
        "Dockerに接続できません: {0}\n\nヒント:\n  • Dockerが起動しているか確認してください\n  • docker ps コマンドが正常に動作するか確認してください"
    )]
    Connection(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Docker API error: {0}")]
    Api(String),

    #[error("{operation} failed: {message}")]
    Stream {
        operation: &'static str,
        message: String,
    },

    #[error("Dockerfile not found: {0}")]
    DockerfileNotFound(PathBuf),

    #[error("Login to {registry} rejected: {message}")]
    LoginRejected { registry: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
