//! bollard による [`ContainerEngine`] の実装

use async_trait::async_trait;
use colored::Colorize;
use futures_util::stream::StreamExt;
use imageflow_build::{BuildProgress, ContextBuilder};
use imageflow_container::{engine_error, spec_to_container_config};
use imageflow_core::{
    ContainerEngine, ContainerHandle, ContainerSpec, ContainerSummary, EngineError, EngineResult,
    ImageHandle, RegistryCredentials, split_reference,
};
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;

/// ローカルの Docker デーモン
pub struct DockerEngine {
    docker: bollard::Docker,
}

impl DockerEngine {
    pub fn new(docker: bollard::Docker) -> Self {
        Self { docker }
    }

    /// Docker接続を初期化（エラーハンドリング付き）
    pub async fn connect() -> anyhow::Result<Self> {
        let result = match bollard::Docker::connect_with_local_defaults() {
            Ok(docker) => docker.ping().await.map(|_| docker),
            Err(e) => Err(e),
        };

        match result {
            Ok(docker) => Ok(Self::new(docker)),
            Err(e) => {
                eprintln!();
                eprintln!("{}", "✗ Docker接続エラー".red().bold());
                eprintln!();
                eprintln!("{}", "原因:".yellow());
                eprintln!("  {}", e);
                eprintln!();
                eprintln!("{}", "解決方法:".yellow());
                eprintln!("  • Dockerが起動しているか確認してください");
                eprintln!("  • docker ps コマンドが正常に動作するか確認してください");
                Err(anyhow::anyhow!("Docker接続に失敗しました"))
            }
        }
    }

    fn credentials(credentials: &RegistryCredentials) -> bollard::auth::DockerCredentials {
        bollard::auth::DockerCredentials {
            username: Some(credentials.username.clone()),
            password: Some(credentials.password.clone()),
            email: Some(credentials.email.clone()),
            serveraddress: Some(credentials.registry.clone()),
            ..Default::default()
        }
    }
}

#[async_trait]
impl ContainerEngine for DockerEngine {
    async fn list_image_tags(&self) -> EngineResult<Vec<String>> {
        #[allow(deprecated)]
        let options = bollard::image::ListImagesOptions::<String> {
            all: false,
            ..Default::default()
        };

        #[allow(deprecated)]
        let images = self
            .docker
            .list_images(Some(options))
            .await
            .map_err(engine_error)?;

        // <none>:<none> はタグなしのダングリングイメージ
        Ok(images
            .into_iter()
            .flat_map(|image| image.repo_tags)
            .filter(|tag| tag != "<none>:<none>")
            .collect())
    }

    async fn inspect_image(&self, reference: &str) -> EngineResult<ImageHandle> {
        let image = self
            .docker
            .inspect_image(reference)
            .await
            .map_err(engine_error)?;

        Ok(ImageHandle {
            id: image.id.unwrap_or_default(),
            reference: reference.to_string(),
        })
    }

    async fn pull_image(&self, reference: &str) -> EngineResult<ImageHandle> {
        let (image_name, tag) = split_reference(reference);

        println!("  ↓ イメージをダウンロード中: {}", reference.cyan());

        #[allow(deprecated)]
        let options = bollard::image::CreateImageOptions {
            from_image: image_name,
            tag: tag.unwrap_or("latest"),
            ..Default::default()
        };

        #[allow(deprecated)]
        let mut stream = self.docker.create_image(Some(options), None, None);

        while let Some(info) = stream.next().await {
            match info {
                Ok(bollard::models::CreateImageInfo {
                    status: Some(status),
                    progress: Some(progress),
                    ..
                }) => {
                    print!("\r  ↓ {}: {}", status, progress);
                }
                Ok(bollard::models::CreateImageInfo {
                    status: Some(status),
                    ..
                }) => {
                    print!("\r  ↓ {}                    ", status);
                }
                Err(e) => {
                    println!();
                    return Err(engine_error(e));
                }
                _ => {}
            }
        }

        println!();
        println!("  ✓ イメージのダウンロード完了");

        self.inspect_image(reference).await
    }

    async fn build_image(&self, dockerfile_location: &Path, tag: &str) -> EngineResult<ImageHandle> {
        let (context_path, dockerfile_path) = ContextBuilder::resolve_paths(dockerfile_location)?;
        let context_data = ContextBuilder::create_context(&context_path, &dockerfile_path)?;

        #[allow(deprecated)]
        let options = bollard::image::BuildImageOptions {
            dockerfile: "Dockerfile",
            t: tag,
            rm: true,      // 中間コンテナを削除
            forcerm: true, // ビルド失敗時も中間コンテナを削除
            ..Default::default()
        };

        use bytes::Bytes;
        use http_body_util::{Either, Full};
        let body = Full::new(Bytes::from(context_data));
        let mut stream = self
            .docker
            .build_image(options, None, Some(Either::Left(body)));

        let progress = BuildProgress::new(tag);

        while let Some(msg) = stream.next().await {
            let output = match msg {
                Ok(output) => output,
                Err(e) => {
                    progress.finish_error(&e.to_string());
                    return Err(engine_error(e));
                }
            };

            if let Some(line) = output.stream.as_deref() {
                progress.step(line);
                tracing::debug!("{}", line.trim_end());
            }

            let failure = output.error.or_else(|| {
                output
                    .error_detail
                    .map(|detail| detail.message.unwrap_or_else(|| "Unknown build error".to_string()))
            });
            if let Some(message) = failure {
                progress.finish_error(&message);
                return Err(EngineError::Stream {
                    operation: "build",
                    message,
                });
            }
        }

        progress.finish_success();
        self.inspect_image(tag).await
    }

    async fn tag_image(&self, source: &str, repository: &str, tag: &str) -> EngineResult<()> {
        #[allow(deprecated)]
        let options = bollard::image::TagImageOptions {
            repo: repository,
            tag,
        };

        #[allow(deprecated)]
        let result = self.docker.tag_image(source, Some(options)).await;

        result.map_err(engine_error)
    }

    async fn push_image(
        &self,
        repository: &str,
        tag: &str,
        credentials: &RegistryCredentials,
    ) -> EngineResult<()> {
        #[allow(deprecated)]
        let options = bollard::image::PushImageOptions::<String> {
            tag: tag.to_string(),
        };

        println!("  → {}:{}", repository.cyan(), tag);

        #[allow(deprecated)]
        let mut stream = self.docker.push_image(
            repository,
            Some(options),
            Some(Self::credentials(credentials)),
        );

        let mut error_message: Option<String> = None;

        while let Some(result) = stream.next().await {
            match result {
                Ok(info) => {
                    if let Some(err) = info.error {
                        error_message = Some(err);
                    } else if let Some(status) = info.status {
                        tracing::debug!("push: {}", status);
                    }
                }
                Err(e) => return Err(engine_error(e)),
            }
        }

        match error_message {
            Some(message) => Err(EngineError::Stream {
                operation: "push",
                message,
            }),
            None => Ok(()),
        }
    }

    async fn list_containers(&self) -> EngineResult<Vec<ContainerSummary>> {
        #[allow(deprecated)]
        let options = bollard::container::ListContainersOptions::<String> {
            all: true,
            ..Default::default()
        };

        #[allow(deprecated)]
        let containers = self
            .docker
            .list_containers(Some(options))
            .await
            .map_err(engine_error)?;

        Ok(containers
            .into_iter()
            .flat_map(|container| {
                let id = container.id.unwrap_or_default();
                let state = container.state.map(|state| state.to_string());
                let running = is_running(state.as_deref());
                container
                    .names
                    .unwrap_or_default()
                    .into_iter()
                    .map(move |name| ContainerSummary {
                        id: id.clone(),
                        name: name.trim_start_matches('/').to_string(),
                        running,
                    })
            })
            .collect())
    }

    async fn stop_container(&self, id: &str) -> EngineResult<()> {
        match self
            .docker
            .stop_container(id, None::<bollard::query_parameters::StopContainerOptions>)
            .await
        {
            Ok(_) => Ok(()),
            // 既に停止済み
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 304, ..
            }) => Ok(()),
            Err(e) => Err(engine_error(e)),
        }
    }

    async fn remove_container(&self, id: &str) -> EngineResult<()> {
        self.docker
            .remove_container(
                id,
                Some(bollard::query_parameters::RemoveContainerOptions {
                    force: true,
                    ..Default::default()
                }),
            )
            .await
            .map_err(engine_error)
    }

    async fn run_container(&self, spec: &ContainerSpec) -> EngineResult<ContainerHandle> {
        let (container_config, create_options) = spec_to_container_config(spec);

        let created = self
            .docker
            .create_container(Some(create_options), container_config)
            .await
            .map_err(engine_error)?;

        self.docker
            .start_container(
                &spec.name,
                None::<bollard::query_parameters::StartContainerOptions>,
            )
            .await
            .map_err(engine_error)?;

        Ok(ContainerHandle {
            id: created.id,
            name: spec.name.clone(),
        })
    }

    /// bollard にログイン API がないため `docker login` を使用
    async fn login(&self, credentials: &RegistryCredentials) -> EngineResult<()> {
        let mut child = tokio::process::Command::new("docker")
            .arg("login")
            .arg("--username")
            .arg(&credentials.username)
            .arg("--password-stdin")
            .arg(&credentials.registry)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(credentials.password.as_bytes()).await?;
        }

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            return Err(EngineError::LoginRejected {
                registry: credentials.registry.clone(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

/// 一時停止中のコンテナは起動中として扱わない
fn is_running(state: Option<&str>) -> bool {
    state == Some("running")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_running_state_counts_as_running() {
        assert!(is_running(Some("running")));
        assert!(!is_running(Some("paused")));
        assert!(!is_running(Some("exited")));
        assert!(!is_running(Some("created")));
        assert!(!is_running(None));
    }

    #[tokio::test]
    #[ignore] // Docker接続が必要なため、通常のテストではスキップ
    async fn test_pulled_image_is_listed() {
        let engine = DockerEngine::connect().await.unwrap();
        engine.pull_image("alpine:latest").await.unwrap();

        let tags = engine.list_image_tags().await.unwrap();
        assert!(tags.iter().any(|tag| tag == "alpine:latest"));
        assert!(tags.iter().all(|tag| tag != "<none>:<none>"));
    }
}
