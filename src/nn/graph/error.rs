/*
 * @Author       : 老董
 * @Date         : 2026-01-27
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-16
 * @Description  : Graph 模块的错误类型
 */

use crate::errors::TensorError;
use crate::nn::NodeId;
use thiserror::Error;

/// Graph 操作错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("节点{0}不存在")]
    NodeNotFound(NodeId),
    #[error("{0}")]
    InvalidOperation(String),
    #[error("{message}：预期形状{expected:?}，实际形状{got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
        message: String,
    },
    #[error("{0}")]
    ComputationError(String),
    #[error("{0}")]
    DuplicateNodeName(String),
    #[error("参数{0}被重复登记")]
    DuplicateParameter(NodeId),
    /// 梯度累积完毕后的钩子返回了错误，本次反向传播随之中止
    #[error("节点{node}的梯度钩子执行失败：{message}")]
    HookFailed { node: NodeId, message: String },
    #[error(transparent)]
    Tensor(#[from] TensorError),
}
