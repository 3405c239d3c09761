use thiserror::Error;

/// 快照读写错误
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("读写快照文件失败：{0}")]
    Io(#[from] std::io::Error),
    #[error("快照JSON（反）序列化失败：{0}")]
    Json(#[from] serde_json::Error),
    #[error("快照二进制（反）序列化失败：{0}")]
    Bincode(#[from] bincode::Error),
}
