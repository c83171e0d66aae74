//! モックエンジンを使ったパイプライン全体のテスト

use imageflow::{PipelineError, PipelineOptions, ReleaseContext, run_pipeline};
use imageflow_build::{BuildError, PublishError, PublishOutcome};
use imageflow_config::ReleaseConfig;
use imageflow_container::ContainerError;
use imageflow_core::{
    ContainerHandle, ContainerSummary, EngineError, ImageHandle, ImageVersion,
    MockContainerEngine,
};
use mockall::Sequence;
use std::path::{Path, PathBuf};

const CONFIG: &str = r#"{
    "GENERAL": {
        "BASE_IMAGE_NAME": "jupyter/pyspark-notebook",
        "DOCKERFILE_LOCATION": "./docker",
        "MY_IMAGE_NAME": "my-spark"
    },
    "DOCKER_HUB_SECRET": {
        "USERNAME": "octo",
        "PASSWORD": "secret",
        "EMAIL": "octo@example.com",
        "REGISTRY": "docker.io"
    },
    "DOCKER_CONTAINER_CONFIG": {
        "NAME": "notebook",
        "PORT_ON_HOST_JUPYTER_NOTEBOOK": 18888,
        "PORT_ON_HOST_SPARK_UI": 14040
    }
}"#;

fn context(engine: MockContainerEngine) -> ReleaseContext<MockContainerEngine> {
    let config = ReleaseConfig::from_json(CONFIG, Path::new("config.json")).unwrap();
    ReleaseContext::new(engine, config, PathBuf::from("/home/octo"))
}

fn image(reference: &str) -> ImageHandle {
    ImageHandle {
        id: format!("sha256:{}", reference),
        reference: reference.to_string(),
    }
}

/// ベースイメージと my-spark:v2.0 がローカルにある状態
fn engine_with_local_images() -> MockContainerEngine {
    let mut engine = MockContainerEngine::new();
    engine.expect_list_image_tags().returning(|| {
        Ok(vec![
            "jupyter/pyspark-notebook:latest".to_string(),
            "my-spark:v2.0".to_string(),
        ])
    });
    engine
        .expect_inspect_image()
        .returning(|reference| Ok(image(reference)));
    engine
}

fn expect_successful_build(engine: &mut MockContainerEngine) {
    engine
        .expect_build_image()
        .withf(|path, tag| path == Path::new("./docker") && tag == "my-spark:v2.1")
        .times(1)
        .returning(|_, tag| Ok(image(tag)));
}

fn expect_launch(engine: &mut MockContainerEngine) {
    engine
        .expect_run_container()
        .withf(|spec| {
            let ports: Vec<_> = spec
                .port_bindings
                .iter()
                .map(|p| (p.container_port, p.host_ip.as_str(), p.host_port))
                .collect();
            spec.name == "notebook"
                && spec.image.reference() == "my-spark:v2.1"
                && ports == vec![(8888, "127.0.0.1", 18888), (4040, "127.0.0.1", 14040)]
        })
        .times(1)
        .returning(|spec| {
            Ok(ContainerHandle {
                id: "new-container".to_string(),
                name: spec.name.clone(),
            })
        });
}

#[tokio::test]
async fn test_release_into_empty_slot() {
    let mut engine = engine_with_local_images();
    engine.expect_pull_image().never();
    expect_successful_build(&mut engine);

    let mut seq = Sequence::new();
    engine
        .expect_login()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    engine
        .expect_tag_image()
        .withf(|source, repo, tag| {
            source == "my-spark:v2.1" && repo == "octo/my-spark" && tag == "v2.1"
        })
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(()));
    engine
        .expect_push_image()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_, _, _| Ok(()));

    engine.expect_list_containers().returning(|| Ok(vec![]));
    engine.expect_stop_container().never();
    engine.expect_remove_container().never();
    expect_launch(&mut engine);

    let ctx = context(engine);
    let report = run_pipeline(&ctx, PipelineOptions::new(ImageVersion::new(2, 1)))
        .await
        .unwrap();

    assert_eq!(report.latest, ImageVersion::new(2, 0));
    assert_eq!(report.image.unwrap().reference, "my-spark:v2.1");
    assert!(report.publish.unwrap().is_published());
    assert_eq!(report.container.unwrap().name, "notebook");
}

#[tokio::test]
async fn test_login_failure_still_launches_container() {
    let mut engine = engine_with_local_images();
    expect_successful_build(&mut engine);
    engine.expect_login().returning(|creds| {
        Err(EngineError::LoginRejected {
            registry: creds.registry.clone(),
            message: "unauthorized".to_string(),
        })
    });
    engine.expect_tag_image().never();
    engine.expect_push_image().never();
    engine.expect_list_containers().returning(|| Ok(vec![]));
    expect_launch(&mut engine);

    let ctx = context(engine);
    let report = run_pipeline(&ctx, PipelineOptions::new(ImageVersion::new(2, 1)))
        .await
        .unwrap();

    assert!(matches!(
        report.publish,
        Some(PublishOutcome::Skipped(PublishError::LoginFailed { .. }))
    ));
    assert!(report.container.is_some());
}

#[tokio::test]
async fn test_require_push_escalates_skipped_publish() {
    let mut engine = engine_with_local_images();
    expect_successful_build(&mut engine);
    engine.expect_login().returning(|_| Ok(()));
    engine.expect_tag_image().returning(|_, _, _| Ok(()));
    engine.expect_push_image().returning(|_, _, _| {
        Err(EngineError::Stream {
            operation: "push",
            message: "denied".to_string(),
        })
    });
    engine.expect_list_containers().never();
    engine.expect_run_container().never();

    let ctx = context(engine);
    let options = PipelineOptions {
        require_push: true,
        ..PipelineOptions::new(ImageVersion::new(2, 1))
    };

    assert!(matches!(
        run_pipeline(&ctx, options).await,
        Err(PipelineError::PublishRequired(PublishError::PushFailed { .. }))
    ));
}

#[tokio::test]
async fn test_stale_version_aborts_before_build() {
    let mut engine = engine_with_local_images();
    engine.expect_build_image().never();
    engine.expect_login().never();
    engine.expect_run_container().never();

    let ctx = context(engine);
    let result = run_pipeline(&ctx, PipelineOptions::new(ImageVersion::new(2, 0))).await;

    match result {
        Err(PipelineError::Build(BuildError::InvalidVersion { candidate, latest })) => {
            assert_eq!(candidate, ImageVersion::new(2, 0));
            assert_eq!(latest, ImageVersion::new(2, 0));
        }
        other => panic!("Expected InvalidVersion, got {:?}", other),
    }
}

#[tokio::test]
async fn test_pull_failure_aborts_pipeline() {
    let mut engine = MockContainerEngine::new();
    engine.expect_list_image_tags().returning(|| Ok(vec![]));
    engine
        .expect_pull_image()
        .returning(|reference| Err(EngineError::NotFound(reference.to_string())));
    engine.expect_build_image().never();
    engine.expect_run_container().never();

    let ctx = context(engine);
    let result = run_pipeline(&ctx, PipelineOptions::new(ImageVersion::new(0, 1))).await;

    assert!(matches!(
        result,
        Err(PipelineError::Build(BuildError::PullFailed { .. }))
    ));
}

#[tokio::test]
async fn test_no_restart_conflict_leaves_running_container() {
    let mut engine = engine_with_local_images();
    expect_successful_build(&mut engine);
    engine.expect_login().returning(|_| Ok(()));
    engine.expect_tag_image().returning(|_, _, _| Ok(()));
    engine.expect_push_image().returning(|_, _, _| Ok(()));
    engine.expect_list_containers().returning(|| {
        Ok(vec![ContainerSummary {
            id: "old-container".to_string(),
            name: "notebook".to_string(),
            running: true,
        }])
    });
    engine.expect_stop_container().never();
    engine.expect_remove_container().never();
    engine.expect_run_container().never();

    let ctx = context(engine);
    let options = PipelineOptions {
        restart: false,
        ..PipelineOptions::new(ImageVersion::new(2, 1))
    };

    assert!(matches!(
        run_pipeline(&ctx, options).await,
        Err(PipelineError::Container(ContainerError::NameConflict { .. }))
    ));
}
