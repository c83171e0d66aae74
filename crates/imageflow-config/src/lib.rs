//! imageflow の設定
//!
//! `config.json` を型付きの [`ReleaseConfig`] に読み込み、
//! 読み込み時点ですべてのフィールドを検証します。

pub mod error;

pub use error::*;

use imageflow_core::RegistryCredentials;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

/// 設定ファイルパスを直接指定する環境変数
pub const CONFIG_PATH_ENV: &str = "IMAGEFLOW_CONFIG_PATH";

const CONFIG_FILE_NAME: &str = "config.json";

/// 区切り線の長さとして受け付ける範囲
const SEPARATOR_REPEAT_RANGE: std::ops::RangeInclusive<usize> = 1..=200;

/// パイプライン全体の設定
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseConfig {
    #[serde(rename = "GENERAL")]
    pub general: GeneralConfig,

    #[serde(rename = "DOCKER_HUB_SECRET")]
    pub registry: RegistryCredentials,

    #[serde(rename = "DOCKER_CONTAINER_CONFIG")]
    pub container: ContainerConfig,

    #[serde(rename = "LOGGING", default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct GeneralConfig {
    /// 事前に用意するベースイメージ（例: `jupyter/pyspark-notebook:latest`）
    pub base_image_name: String,
    /// Dockerfile、または Dockerfile を含むディレクトリ
    pub dockerfile_location: PathBuf,
    /// ビルドするイメージ名（タグなし）
    pub my_image_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct ContainerConfig {
    pub name: String,
    #[serde(deserialize_with = "deserialize_port")]
    pub port_on_host_jupyter_notebook: u16,
    #[serde(deserialize_with = "deserialize_port")]
    pub port_on_host_spark_ui: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "UPPERCASE", default)]
pub struct LoggingConfig {
    /// `RUST_LOG` 未設定時のログレベル
    pub level: LogLevel,
    pub separator_char: String,
    pub separator_num_repeat: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            separator_char: "=".to_string(),
            separator_num_repeat: 60,
        }
    }
}

impl LoggingConfig {
    /// ステージ区切り線
    pub fn separator(&self) -> String {
        self.separator_char.repeat(self.separator_num_repeat)
    }

    /// tracing の filter directive
    pub fn filter_directive(&self) -> &'static str {
        self.level.as_directive()
    }
}

/// ログレベル（`WARNING` `CRITICAL` などの表記も受け付ける）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, <LogLevel as TryFrom<String>>::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" | "critical" => Ok(LogLevel::Error),
            _ => Err(format!(
                "unknown log level '{}' (expected trace, debug, info, warning, error or critical)",
                value
            )),
        }
    }
}

/// ポートは数値でも文字列でも指定できる
fn deserialize_port<'de, D>(deserializer: D) -> std::result::Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PortValue {
        Number(u64),
        Text(String),
    }

    let port = match PortValue::deserialize(deserializer)? {
        PortValue::Number(n) => u16::try_from(n).ok(),
        PortValue::Text(s) => s.trim().parse::<u16>().ok(),
    };

    match port {
        Some(p) if p != 0 => Ok(p),
        _ => Err(D::Error::custom(
            "expected a port number between 1 and 65535",
        )),
    }
}

impl ReleaseConfig {
    /// JSON 文字列から読み込み、検証まで行う
    pub fn from_json(content: &str, path: &Path) -> Result<Self> {
        let config: ReleaseConfig =
            serde_json::from_str(content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// 空文字列やポート重複などを検出
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("GENERAL.BASE_IMAGE_NAME", self.general.base_image_name.as_str()),
            ("GENERAL.MY_IMAGE_NAME", self.general.my_image_name.as_str()),
            ("DOCKER_HUB_SECRET.USERNAME", self.registry.username.as_str()),
            ("DOCKER_HUB_SECRET.PASSWORD", self.registry.password.as_str()),
            ("DOCKER_HUB_SECRET.REGISTRY", self.registry.registry.as_str()),
            ("DOCKER_CONTAINER_CONFIG.NAME", self.container.name.as_str()),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must not be empty".to_string(),
                });
            }
        }

        if self.general.dockerfile_location.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "GENERAL.DOCKERFILE_LOCATION",
                reason: "must not be empty".to_string(),
            });
        }

        // ビルドするイメージ名はタグを含まない
        if self.general.my_image_name.contains(':') || self.general.my_image_name.contains('/') {
            return Err(ConfigError::Invalid {
                field: "GENERAL.MY_IMAGE_NAME",
                reason: format!(
                    "'{}' must be a bare image name without registry or tag",
                    self.general.my_image_name
                ),
            });
        }

        if self.container.port_on_host_jupyter_notebook == self.container.port_on_host_spark_ui {
            return Err(ConfigError::Invalid {
                field: "DOCKER_CONTAINER_CONFIG.PORT_ON_HOST_SPARK_UI",
                reason: format!(
                    "host port {} is already bound to the notebook port",
                    self.container.port_on_host_spark_ui
                ),
            });
        }

        if self.logging.separator_char.is_empty() {
            return Err(ConfigError::Invalid {
                field: "LOGGING.SEPARATOR_CHAR",
                reason: "must not be empty".to_string(),
            });
        }

        if !SEPARATOR_REPEAT_RANGE.contains(&self.logging.separator_num_repeat) {
            return Err(ConfigError::Invalid {
                field: "LOGGING.SEPARATOR_NUM_REPEAT",
                reason: format!(
                    "{} is out of range ({}..={})",
                    self.logging.separator_num_repeat,
                    SEPARATOR_REPEAT_RANGE.start(),
                    SEPARATOR_REPEAT_RANGE.end()
                ),
            });
        }

        Ok(())
    }
}

/// 設定ファイルを読み込む
pub fn load_config(path: &Path) -> Result<ReleaseConfig> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    ReleaseConfig::from_json(&content, path)
}

/// 設定ファイルを探す
///
/// 以下の優先順位で検索:
/// 1. 明示的な指定（`--config`）
/// 2. 環境変数 IMAGEFLOW_CONFIG_PATH
/// 3. カレントディレクトリ: config.json
/// 4. ./.imageflow/config.json
/// 5. ~/.config/imageflow/config.json (グローバル設定)
pub fn find_config_file(explicit: Option<&Path>) -> Result<PathBuf> {
    // 1. 明示的な指定は存在しなければエラー
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
        return Err(ConfigError::ExplicitPathNotFound(path.to_path_buf()));
    }

    // 2. 環境変数で直接指定
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::ExplicitPathNotFound(path));
    }

    let current_dir = std::env::current_dir()?;

    // 3. カレントディレクトリ
    let path = current_dir.join(CONFIG_FILE_NAME);
    if path.exists() {
        return Ok(path);
    }

    // 4. ./.imageflow/
    let path = current_dir.join(".imageflow").join(CONFIG_FILE_NAME);
    if path.exists() {
        return Ok(path);
    }

    // 5. グローバル設定ファイル
    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("imageflow").join(CONFIG_FILE_NAME);
        if global_config.exists() {
            return Ok(global_config);
        }
    }

    Err(ConfigError::ConfigFileNotFound)
}

/// ボリュームマウント元となるホームディレクトリ
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or(ConfigError::HomeDirNotFound)
}
