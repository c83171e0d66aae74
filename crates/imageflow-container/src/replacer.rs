//! 名前付きコンテナスロットの置き換え
//!
//! 同じ名前のコンテナは常に高々 1 つ。既存のコンテナがある場合は
//! 停止 → 削除 → 起動 の順に置き換えます。途中で失敗した場合、
//! スロットは古いコンテナが部分的に解体された状態のまま残ります。
//!
//! スロットの確認から起動までの間に別のプロセスが同名のコンテナを
//! 作成しても検出・排他はしません。その場合は起動時の名前衝突として
//! [`ContainerError::RunFailed`] になります。

use crate::error::{ContainerError, Result};
use imageflow_core::{ContainerEngine, ContainerHandle, ContainerSpec, ContainerSummary};

/// スロットの現在の状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotState {
    /// 同名のコンテナなし
    Absent,
    /// 同名のコンテナが起動中
    RunningOld { id: String },
    /// 同名のコンテナが停止状態で残っている
    StoppedOld { id: String },
}

impl SlotState {
    fn from_summaries(name: &str, containers: &[ContainerSummary]) -> Self {
        match containers.iter().find(|c| c.name == name) {
            None => SlotState::Absent,
            Some(c) if c.running => SlotState::RunningOld { id: c.id.clone() },
            Some(c) => SlotState::StoppedOld { id: c.id.clone() },
        }
    }

    pub fn is_occupied(&self) -> bool {
        !matches!(self, SlotState::Absent)
    }
}

pub struct ContainerReplacer<'a, E: ?Sized> {
    engine: &'a E,
}

impl<'a, E: ContainerEngine + ?Sized> ContainerReplacer<'a, E> {
    pub fn new(engine: &'a E) -> Self {
        Self { engine }
    }

    /// 現在のスロット状態をエンジンに問い合わせる
    pub async fn inspect_slot(&self, name: &str) -> Result<SlotState> {
        let containers = self
            .engine
            .list_containers()
            .await
            .map_err(ContainerError::SlotUnavailable)?;
        Ok(SlotState::from_summaries(name, &containers))
    }

    /// `spec` でスロットを置き換えて起動する
    ///
    /// `restart` が false の場合、既存コンテナがあれば何も変更せず
    /// [`ContainerError::NameConflict`] を返します。
    pub async fn replace(&self, spec: &ContainerSpec, restart: bool) -> Result<ContainerHandle> {
        let name = spec.name.as_str();
        let state = self.inspect_slot(name).await?;
        tracing::debug!("Slot '{}' state: {:?}", name, state);

        if state.is_occupied() && !restart {
            tracing::error!("A container named '{}' already exists", name);
            return Err(ContainerError::NameConflict {
                name: name.to_string(),
            });
        }

        match &state {
            SlotState::Absent => {}
            SlotState::RunningOld { id } => {
                tracing::info!("Stopping the existing container: {}", name);
                self.engine
                    .stop_container(id)
                    .await
                    .map_err(|cause| replace_failed(name, cause))?;
                tracing::info!("Removing the existing container: {}", name);
                self.engine
                    .remove_container(id)
                    .await
                    .map_err(|cause| replace_failed(name, cause))?;
            }
            SlotState::StoppedOld { id } => {
                tracing::info!("Removing the stopped container: {}", name);
                self.engine
                    .remove_container(id)
                    .await
                    .map_err(|cause| replace_failed(name, cause))?;
            }
        }

        tracing::info!("Starting container {} from {}", name, spec.image);
        let handle = self
            .engine
            .run_container(spec)
            .await
            .map_err(|cause| ContainerError::RunFailed {
                name: name.to_string(),
                cause,
            })?;
        tracing::info!("Container started: {} ({})", handle.name, handle.id);

        Ok(handle)
    }
}

fn replace_failed(name: &str, cause: imageflow_core::EngineError) -> ContainerError {
    ContainerError::ReplaceFailed {
        name: name.to_string(),
        cause,
    }
}
