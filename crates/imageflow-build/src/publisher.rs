//! レジストリへの公開
//!
//! ビルドしたイメージを `account/image_name:version` としてタグ付けし、プッシュします。
//! ここでの失敗はログに残すだけで、パイプラインを止めません
//! （レジストリ障害でローカル起動が妨げられないようにするため）。

use crate::error::PublishError;
use imageflow_core::{ContainerEngine, ImageVersion, PublishTarget, RegistryCredentials};

/// 公開結果
#[derive(Debug)]
pub enum PublishOutcome {
    /// プッシュ完了（完全なイメージ参照）
    Published { reference: String },
    /// 公開をスキップ（致命的ではない）
    Skipped(PublishError),
}

impl PublishOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, PublishOutcome::Published { .. })
    }
}

/// イメージ公開を実行するハンドラ
pub struct RegistryPublisher<'a, E: ?Sized> {
    engine: &'a E,
}

impl<'a, E: ContainerEngine + ?Sized> RegistryPublisher<'a, E> {
    pub fn new(engine: &'a E) -> Self {
        Self { engine }
    }

    /// ログイン → タグ付け → プッシュ
    ///
    /// ログインに成功した場合のみプッシュを試みます。
    pub async fn publish(
        &self,
        image_name: &str,
        version: ImageVersion,
        credentials: &RegistryCredentials,
    ) -> PublishOutcome {
        let target = PublishTarget {
            account: credentials.username.clone(),
            image_name: image_name.to_string(),
            version,
        };

        tracing::info!("Logging in to {}...", credentials.registry);
        if let Err(cause) = self.engine.login(credentials).await {
            let error = PublishError::LoginFailed {
                registry: credentials.registry.clone(),
                cause,
            };
            tracing::error!("{}; skip pushing the image", error);
            return PublishOutcome::Skipped(error);
        }
        tracing::info!("Logged in to {} successfully", credentials.registry);

        let local = target.local_reference();
        let repository = target.repository();
        let tag = version.to_string();

        if let Err(cause) = self.engine.tag_image(&local, &repository, &tag).await {
            let error = PublishError::TagFailed {
                local,
                target: target.reference(),
                cause,
            };
            tracing::error!("{}", error);
            return PublishOutcome::Skipped(error);
        }
        tracing::debug!("Tagged {} as {}", local, target.reference());

        if let Err(cause) = self.engine.push_image(&repository, &tag, credentials).await {
            let error = PublishError::PushFailed {
                target: target.reference(),
                cause,
            };
            tracing::error!("{}", error);
            return PublishOutcome::Skipped(error);
        }

        tracing::info!("Image successfully pushed: {}", target.reference());
        PublishOutcome::Published {
            reference: target.reference(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imageflow_core::{EngineError, MockContainerEngine};
    use mockall::Sequence;

    fn credentials() -> RegistryCredentials {
        RegistryCredentials {
            username: "octo".to_string(),
            password: "secret".to_string(),
            email: "octo@example.com".to_string(),
            registry: "docker.io".to_string(),
        }
    }

    #[tokio::test]
    async fn test_publish_logs_in_tags_and_pushes() {
        let mut engine = MockContainerEngine::new();
        let mut seq = Sequence::new();

        engine
            .expect_login()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        engine
            .expect_tag_image()
            .withf(|source, repo, tag| {
                source == "app:v1.1" && repo == "octo/app" && tag == "v1.1"
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));
        engine
            .expect_push_image()
            .withf(|repo, tag, creds| {
                repo == "octo/app" && tag == "v1.1" && creds.username == "octo"
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(()));

        let outcome = RegistryPublisher::new(&engine)
            .publish("app", ImageVersion::new(1, 1), &credentials())
            .await;

        match outcome {
            PublishOutcome::Published { reference } => {
                assert_eq!(reference, "octo/app:v1.1");
            }
            other => panic!("Expected Published, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_login_failure_skips_push() {
        let mut engine = MockContainerEngine::new();
        engine.expect_login().times(1).returning(|creds| {
            Err(EngineError::LoginRejected {
                registry: creds.registry.clone(),
                message: "unauthorized: incorrect username or password".to_string(),
            })
        });
        engine.expect_tag_image().never();
        engine.expect_push_image().never();

        let outcome = RegistryPublisher::new(&engine)
            .publish("app", ImageVersion::new(1, 1), &credentials())
            .await;

        assert!(!outcome.is_published());
        assert!(matches!(
            outcome,
            PublishOutcome::Skipped(PublishError::LoginFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_tag_failure_is_not_fatal() {
        let mut engine = MockContainerEngine::new();
        engine.expect_login().returning(|_| Ok(()));
        engine
            .expect_tag_image()
            .returning(|source, _, _| Err(EngineError::NotFound(source.to_string())));
        engine.expect_push_image().never();

        let outcome = RegistryPublisher::new(&engine)
            .publish("app", ImageVersion::new(1, 1), &credentials())
            .await;

        assert!(matches!(
            outcome,
            PublishOutcome::Skipped(PublishError::TagFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_push_failure_is_not_fatal() {
        let mut engine = MockContainerEngine::new();
        engine.expect_login().returning(|_| Ok(()));
        engine.expect_tag_image().returning(|_, _, _| Ok(()));
        engine.expect_push_image().returning(|_, _, _| {
            Err(EngineError::Stream {
                operation: "push",
                message: "denied: requested access to the resource is denied".to_string(),
            })
        });

        let outcome = RegistryPublisher::new(&engine)
            .publish("app", ImageVersion::new(1, 1), &credentials())
            .await;

        match outcome {
            PublishOutcome::Skipped(PublishError::PushFailed { target, .. }) => {
                assert_eq!(target, "octo/app:v1.1");
            }
            other => panic!("Expected PushFailed, got {:?}", other),
        }
    }
}
