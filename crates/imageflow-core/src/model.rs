//! リリースパイプラインのドメインモデル

use crate::version::ImageVersion;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// イメージ参照（名前 + バージョン）
///
/// 同じ `name` を持つ ImageRef の集合がその名前の「系譜（lineage）」になります。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef {
    pub name: String,
    pub version: ImageVersion,
}

impl ImageRef {
    pub fn new(name: impl Into<String>, version: ImageVersion) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }

    /// `name:vX.Y` 形式の参照
    pub fn reference(&self) -> String {
        format!("{}:{}", self.name, self.version)
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.version)
    }
}

/// ビルド要求（1 回の実行につき 1 つ）
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub image_name: String,
    pub candidate_version: ImageVersion,
    pub dockerfile_path: PathBuf,
}

impl BuildRequest {
    pub fn image_ref(&self) -> ImageRef {
        ImageRef::new(self.image_name.clone(), self.candidate_version)
    }
}

/// レジストリへのプッシュ先（`account/image_name:version`）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishTarget {
    pub account: String,
    pub image_name: String,
    pub version: ImageVersion,
}

impl PublishTarget {
    pub fn repository(&self) -> String {
        format!("{}/{}", self.account, self.image_name)
    }

    pub fn reference(&self) -> String {
        format!("{}:{}", self.repository(), self.version)
    }

    /// ローカルでビルドされたイメージの参照
    pub fn local_reference(&self) -> String {
        format!("{}:{}", self.image_name, self.version)
    }
}

/// レジストリ認証情報
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct RegistryCredentials {
    pub username: String,
    pub password: String,
    pub email: String,
    pub registry: String,
}

impl fmt::Debug for RegistryCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryCredentials")
            .field("username", &self.username)
            .field("password", &"********")
            .field("email", &self.email)
            .field("registry", &self.registry)
            .finish()
    }
}

/// ボリュームのアクセスモード
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    ReadOnly,
    ReadWrite,
}

impl AccessMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::ReadOnly => "ro",
            AccessMode::ReadWrite => "rw",
        }
    }
}

/// コンテナポート → ホストポートのバインディング
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortBinding {
    pub container_port: u16,
    pub host_ip: String,
    pub host_port: u16,
}

impl PortBinding {
    /// Docker API のキー形式（`8888/tcp`）
    pub fn container_key(&self) -> String {
        format!("{}/tcp", self.container_port)
    }
}

/// ホストパス → コンテナパスのマウント
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeBinding {
    pub host: PathBuf,
    pub container: PathBuf,
    pub mode: AccessMode,
}

impl VolumeBinding {
    /// `host:container:mode` 形式の bind 指定
    pub fn bind_spec(&self) -> String {
        format!(
            "{}:{}:{}",
            self.host.display(),
            self.container.display(),
            self.mode.as_str()
        )
    }
}

/// 名前付きスロットで起動するコンテナの定義
///
/// 同じ `name` を持つコンテナは常に高々 1 つです。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSpec {
    pub name: String,
    pub image: ImageRef,
    pub port_bindings: Vec<PortBinding>,
    pub volume_bindings: Vec<VolumeBinding>,
    pub command: Vec<String>,
    pub stdin_open: bool,
    pub tty: bool,
}

/// エンジンが返すイメージのハンドル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHandle {
    pub id: String,
    pub reference: String,
}

/// エンジンが返すコンテナのハンドル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHandle {
    pub id: String,
    pub name: String,
}

/// コンテナ一覧の 1 行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSummary {
    pub id: String,
    pub name: String,
    pub running: bool,
}

/// `repo:tag` をリポジトリとタグに分離
///
/// # Examples
/// - `myimage:v1.0` -> `("myimage", Some("v1.0"))`
/// - `localhost:5000/app` -> `("localhost:5000/app", None)`
/// - `localhost:5000/app:dev` -> `("localhost:5000/app", Some("dev"))`
pub fn split_reference(reference: &str) -> (&str, Option<&str>) {
    if let Some((repo, tag)) = reference.rsplit_once(':') {
        // `/` を含む場合はレジストリのポート番号
        if !tag.contains('/') {
            return (repo, Some(tag));
        }
    }
    (reference, None)
}

/// タグが省略されていれば `:latest` を補う
pub fn normalize_reference(reference: &str) -> String {
    match split_reference(reference) {
        (_, Some(_)) => reference.to_string(),
        (repo, None) => format!("{}:latest", repo),
    }
}
