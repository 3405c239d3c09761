/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 训练循环：常规循环与“更新合并进反向传播”的循环，及其内存分析窗口
 *
 * 常规循环每次迭代：前向 → 反向（所有参数的梯度同时驻留）→ `step()` → `zero_grad()`；
 * 合并循环每次迭代只有前向与反向，参数在反向传播中由各自的钩子更新并释放梯度。
 * `compare`在同一个模型上先后跑两种循环，各自记录一段分配历史，便于对比峰值占用。
 */

mod batch;
mod config;
mod error;
mod model;
mod profile;
mod session;

pub use batch::{BatchSource, RandomBatches};
pub use config::{ModelConfig, TrainConfig};
pub use error::TrainError;
pub use model::Mlp;
pub use profile::{Comparison, RunReport, compare, profile, run_baseline, run_fused};
pub use session::{Session, fused_train_step, train_step};

#[cfg(test)]
mod tests;
