use crate::memory::MemoryError;
use crate::nn::GraphError;
use thiserror::Error;

/// 训练循环的错误
#[derive(Debug, Error)]
pub enum TrainError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Memory(#[from] MemoryError),
    #[error("解析训练配置失败：{0}")]
    Config(#[from] serde_json::Error),
    #[error("读取训练配置失败：{0}")]
    Io(#[from] std::io::Error),
    #[error("训练配置无效：{0}")]
    InvalidConfig(String),
}
