use imageflow_core::EngineError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContainerError {
    #[error(
        "コンテナ名 '{name}' は既に使用されています\n\nヒント:\n  • --no-restart を外すと既存のコンテナを置き換えます\n  • 手動で削除する場合: docker rm -f {name}"
    )]
    NameConflict { name: String },

    #[error("既存のコンテナ '{name}' の置き換えに失敗しました: {cause}")]
    ReplaceFailed {
        name: String,
        #[source]
        cause: EngineError,
    },

    #[error("コンテナ '{name}' の起動に失敗しました: {cause}")]
    RunFailed {
        name: String,
        #[source]
        cause: EngineError,
    },

    #[error("コンテナ一覧を取得できません: {0}")]
    SlotUnavailable(#[source] EngineError),
}

/// bollard のエラーをエンジンエラーに変換
pub fn engine_error(err: bollard::errors::Error) -> EngineError {
    match &err {
        bollard::errors::Error::DockerResponseServerError {
            status_code: 404,
            message,
        } => EngineError::NotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code: 409,
            message,
        } => EngineError::Conflict(message.clone()),
        _ => {
            // 接続エラーの可能性をチェック
            let err_str = err.to_string();
            if err_str.contains("Connection refused")
                || err_str.contains("No such file or directory")
            {
                EngineError::Connection(err_str)
            } else {
                EngineError::Api(err_str)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ContainerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_status_codes() {
        let not_found = bollard::errors::Error::DockerResponseServerError {
            status_code: 404,
            message: "No such container: notebook".to_string(),
        };
        assert!(matches!(engine_error(not_found), EngineError::NotFound(m) if m.contains("notebook")));

        let conflict = bollard::errors::Error::DockerResponseServerError {
            status_code: 409,
            message: "name is already in use".to_string(),
        };
        assert!(matches!(engine_error(conflict), EngineError::Conflict(_)));

        let server = bollard::errors::Error::DockerResponseServerError {
            status_code: 500,
            message: "boom".to_string(),
        };
        assert!(matches!(engine_error(server), EngineError::Api(_)));
    }

    #[test]
    fn test_name_conflict_message_names_the_slot() {
        let err = ContainerError::NameConflict {
            name: "notebook".to_string(),
        };
        assert!(err.to_string().contains("'notebook'"));
    }
}
