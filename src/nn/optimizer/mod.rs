/*
 * @Author       : 老董
 * @Date         : 2025-07-24 16:00:00
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-16
 * @Description  : 优化器模块，实现 PyTorch 风格的梯度优化算法
 *
 * - `Optimizer`（`SGD`/`Adam`）：常规用法，反向传播结束后一次`step()`更新全部参数；
 * - `OptimizerDict`：每个参数一条`UpdateRule`，借助梯度累积完毕钩子在反向传播中逐个更新。
 */

mod config;
mod core;
mod per_param;
mod rule;

pub use config::{AdamConfig, OptimizerConfig, SgdConfig};
pub use core::{Adam, Optimizer, SGD};
pub use per_param::OptimizerDict;
pub use rule::{AdamRule, SgdRule, UpdateRule};
