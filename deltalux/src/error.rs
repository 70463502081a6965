use thiserror::Error;

#[derive(Error, Debug)]
pub enum GroupError {
    #[error("configuration error: {0}")]
    Config(#[from] deltalux_model::ConfigError),

    #[error("invalid config entry: {0}")]
    Json(#[from] serde_json::Error),

    #[error("group worker is not running")]
    ChannelClosed,
}

impl From<deltalux_sync::SyncError> for GroupError {
    fn from(err: deltalux_sync::SyncError) -> Self {
        match err {
            deltalux_sync::SyncError::ChannelClosed => GroupError::ChannelClosed,
        }
    }
}
