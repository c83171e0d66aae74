//! リリースパイプライン
//!
//! ベースイメージ取得 → ビルド → 公開 → コンテナ置き換え を順番に実行します。
//! 取得・ビルド・置き換えの失敗はパイプラインを中断しますが、公開の失敗は
//! ログに残すだけで次に進みます（`--require-push` 指定時を除く）。

use crate::logging::stage_banner;
use colored::Colorize;
use imageflow_build::{
    BuildError, ImageAcquirer, PublishError, PublishOutcome, RegistryPublisher, ReleaseBuilder,
};
use imageflow_config::ReleaseConfig;
use imageflow_container::{ContainerError, ContainerReplacer};
use imageflow_core::{
    AccessMode, BuildRequest, ContainerEngine, ContainerHandle, ContainerSpec, ImageHandle,
    ImageRef, ImageVersion, PortBinding, VolumeBinding,
};
use std::path::PathBuf;
use thiserror::Error;

/// Jupyter Notebook のコンテナポート
pub const NOTEBOOK_PORT: u16 = 8888;
/// Spark UI のコンテナポート
pub const SPARK_UI_PORT: u16 = 4040;
/// ホスト側のバインドアドレス
pub const HOST_IP: &str = "127.0.0.1";
/// コンテナ内の AWS 認証情報ディレクトリ
pub const AWS_CREDENTIALS_MOUNT: &str = "/root/.aws";
/// コンテナの起動コマンド
pub const START_COMMAND: &str = "/home/jupyter/jupyter_start.sh";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error("イメージの公開が必須ですが、公開できませんでした: {0}")]
    PublishRequired(#[source] PublishError),
}

impl PipelineError {
    /// ユーザー向けの分かりやすいエラーメッセージ
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::Build(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

/// 1回の実行で共有する状態
pub struct ReleaseContext<E> {
    pub engine: E,
    pub config: ReleaseConfig,
    pub home_dir: PathBuf,
}

impl<E: ContainerEngine> ReleaseContext<E> {
    pub fn new(engine: E, config: ReleaseConfig, home_dir: PathBuf) -> Self {
        Self {
            engine,
            config,
            home_dir,
        }
    }

    pub fn build_request(&self, candidate: ImageVersion) -> BuildRequest {
        BuildRequest {
            image_name: self.config.general.my_image_name.clone(),
            candidate_version: candidate,
            dockerfile_path: self.config.general.dockerfile_location.clone(),
        }
    }

    /// 起動するコンテナの定義
    pub fn container_spec(&self, version: ImageVersion) -> ContainerSpec {
        let container = &self.config.container;

        ContainerSpec {
            name: container.name.clone(),
            image: ImageRef::new(self.config.general.my_image_name.clone(), version),
            port_bindings: vec![
                PortBinding {
                    container_port: NOTEBOOK_PORT,
                    host_ip: HOST_IP.to_string(),
                    host_port: container.port_on_host_jupyter_notebook,
                },
                PortBinding {
                    container_port: SPARK_UI_PORT,
                    host_ip: HOST_IP.to_string(),
                    host_port: container.port_on_host_spark_ui,
                },
            ],
            volume_bindings: vec![VolumeBinding {
                host: self.home_dir.join(".aws"),
                container: PathBuf::from(AWS_CREDENTIALS_MOUNT),
                mode: AccessMode::ReadOnly,
            }],
            command: vec![START_COMMAND.to_string()],
            stdin_open: true,
            tty: true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub candidate: ImageVersion,
    /// 既存コンテナを置き換える（false なら名前の衝突はエラー）
    pub restart: bool,
    /// 公開のスキップをエラーにする
    pub require_push: bool,
    /// バージョン検証のみ行い、エンジンの状態を変更しない
    pub dry_run: bool,
}

impl PipelineOptions {
    pub fn new(candidate: ImageVersion) -> Self {
        Self {
            candidate,
            restart: true,
            require_push: false,
            dry_run: false,
        }
    }
}

/// パイプラインの実行結果
#[derive(Debug)]
pub struct PipelineReport {
    pub latest: ImageVersion,
    pub candidate: ImageVersion,
    pub image: Option<ImageHandle>,
    pub publish: Option<PublishOutcome>,
    pub container: Option<ContainerHandle>,
}

impl PipelineReport {
    fn planned(latest: ImageVersion, candidate: ImageVersion) -> Self {
        Self {
            latest,
            candidate,
            image: None,
            publish: None,
            container: None,
        }
    }
}

pub async fn run_pipeline<E: ContainerEngine>(
    ctx: &ReleaseContext<E>,
    options: PipelineOptions,
) -> Result<PipelineReport, PipelineError> {
    let engine = &ctx.engine;
    let config = &ctx.config;
    let logging = &config.logging;
    let request = ctx.build_request(options.candidate);

    if options.dry_run {
        stage_banner(logging, "Dry run");
        let latest = ReleaseBuilder::new(engine).check_version(&request).await?;
        print_plan(ctx, &request, latest);
        return Ok(PipelineReport::planned(latest, options.candidate));
    }

    stage_banner(logging, "Pulling the base image");
    ImageAcquirer::new(engine)
        .ensure_base_image(&config.general.base_image_name)
        .await?;

    stage_banner(logging, "Building the image");
    let (image, latest) = ReleaseBuilder::new(engine).build(&request).await?;

    stage_banner(logging, "Pushing the image");
    let outcome = RegistryPublisher::new(engine)
        .publish(&request.image_name, options.candidate, &config.registry)
        .await;

    let outcome = match outcome {
        PublishOutcome::Skipped(error) if options.require_push => {
            return Err(PipelineError::PublishRequired(error));
        }
        PublishOutcome::Skipped(error) => {
            eprintln!(
                "{} イメージの公開をスキップしました: {}",
                "⚠".yellow(),
                error
            );
            PublishOutcome::Skipped(error)
        }
        published => published,
    };

    stage_banner(logging, "Starting the container");
    let spec = ctx.container_spec(options.candidate);
    let container = ContainerReplacer::new(engine)
        .replace(&spec, options.restart)
        .await?;

    println!(
        "{} {} を起動しました (notebook: http://{}:{}, spark ui: http://{}:{})",
        "✓".green(),
        container.name.cyan(),
        HOST_IP,
        config.container.port_on_host_jupyter_notebook,
        HOST_IP,
        config.container.port_on_host_spark_ui,
    );

    Ok(PipelineReport {
        latest,
        candidate: options.candidate,
        image: Some(image),
        publish: Some(outcome),
        container: Some(container),
    })
}

fn print_plan<E: ContainerEngine>(
    ctx: &ReleaseContext<E>,
    request: &BuildRequest,
    latest: ImageVersion,
) {
    let config = &ctx.config;
    println!("{}", "実行計画:".bold());
    println!("  ベースイメージ: {}", config.general.base_image_name.cyan());
    println!(
        "  ビルド:         {} (最新: {})",
        request.image_ref().to_string().cyan(),
        latest
    );
    println!(
        "  公開:           {}/{}:{}",
        config.registry.username, request.image_name, request.candidate_version
    );
    println!("  コンテナ:       {}", config.container.name.cyan());
}
