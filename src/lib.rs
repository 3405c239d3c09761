//! # Step In Backward
//!
//! 用纯rust实现“把优化器的更新合并进反向传播”这一省内存的训练技巧：
//! 反向传播中每个参数的梯度一累积完毕，就立即用该参数自己的更新规则更新参数并释放梯度，
//! 从而避免所有参数的梯度同时驻留内存。
//!
//! - [`tensor`]：基于`ndarray`的稠密`f32`张量；
//! - [`nn`]：计算图、前向/反向传播、参数钩子、`Linear`层与优化器；
//! - [`memory`]：内存记账、分配历史记录与快照；
//! - [`train`]：常规训练循环与合并更新的训练循环，以及分析窗口。
//!

pub mod errors;
pub mod memory;
pub mod nn;
pub mod tensor;
pub mod train;
pub mod utils;
