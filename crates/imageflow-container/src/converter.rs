//! ContainerSpec から Docker API パラメータへの変換

use bollard::container::{Config, CreateContainerOptions};
use bollard::models::{HostConfig, PortBinding};
use imageflow_core::ContainerSpec;
use std::collections::HashMap;

/// ContainerSpecをDockerのコンテナ設定に変換
pub fn spec_to_container_config(
    spec: &ContainerSpec,
) -> (Config<String>, CreateContainerOptions<String>) {
    // ポートバインディングの設定
    let mut port_bindings = HashMap::new();
    let mut exposed_ports = HashMap::new();

    for binding in &spec.port_bindings {
        let container_port = binding.container_key();

        exposed_ports.insert(container_port.clone(), HashMap::new());
        port_bindings.insert(
            container_port,
            Some(vec![PortBinding {
                host_ip: Some(binding.host_ip.clone()),
                host_port: Some(binding.host_port.to_string()),
            }]),
        );
    }

    // ボリュームバインディング（指定順を維持）
    let binds: Vec<String> = spec
        .volume_bindings
        .iter()
        .map(|v| v.bind_spec())
        .collect();

    let host_config = Some(HostConfig {
        port_bindings: Some(port_bindings),
        binds: Some(binds),
        ..Default::default()
    });

    // 対話用フラグ（デタッチ起動だが stdin と TTY は確保する）
    let config = Config {
        image: Some(spec.image.reference()),
        exposed_ports: Some(exposed_ports),
        host_config,
        cmd: if spec.command.is_empty() {
            None
        } else {
            Some(spec.command.clone())
        },
        open_stdin: Some(spec.stdin_open),
        tty: Some(spec.tty),
        attach_stdin: Some(false),
        attach_stdout: Some(false),
        attach_stderr: Some(false),
        ..Default::default()
    };

    let options = CreateContainerOptions {
        name: spec.name.clone(),
        platform: None,
    };

    (config, options)
}
