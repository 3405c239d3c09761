/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 内存记账与分配历史记录（仿 PyTorch 的 `torch.cuda.memory`）
 *
 * - 记账（始终开启）：`Tracked`/`MemoryBlock` 在创建时记一次分配、在 drop 时记一次释放，
 *   据此维护当前占用与峰值占用；
 * - 记录（按需开启）：`record_memory_history` 打开后，每次分配/释放都会追加到事件日志，
 *   `snapshot()` 可随时抽取日志，并可序列化到文件供离线查看。
 *
 * 状态是线程局部的：每个线程相当于一块独立的“设备”。
 */

mod block;
mod error;
mod recorder;
mod snapshot;

pub use block::{MemoryBlock, Tracked};
pub use error::MemoryError;
pub use recorder::{
    RecordMode, RecordingGuard, is_recording, max_memory_allocated, memory_allocated,
    record_memory_history, reset_peak_memory_stats, snapshot,
};
pub use snapshot::{CallSite, EventAction, LiveBlock, MemoryEvent, MemorySnapshot, TimelinePoint};

use serde::{Deserialize, Serialize};
use std::fmt;

/// 内存块的用途分类，对应训练时内存占用的几个组成部分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// 模型参数（P）
    Parameter,
    /// 输入数据
    Input,
    /// 前向传播中保存、供反向传播使用的中间值（A）
    Activation,
    /// 梯度（G）
    Gradient,
    /// 优化器状态，如 Adam 的一阶、二阶矩估计（O）
    OptimizerState,
    /// 计算过程中短暂存在的中间张量
    Temporary,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Parameter => "参数",
            Self::Input => "输入",
            Self::Activation => "激活值",
            Self::Gradient => "梯度",
            Self::OptimizerState => "优化器状态",
            Self::Temporary => "临时张量",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests;
