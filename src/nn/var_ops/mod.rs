/*
 * @Author       : 老董
 * @Date         : 2026-01-09
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-16
 * @Description  : Var 扩展 trait 模块
 *
 * 按功能领域组织 Var 的扩展方法，用户按需 import。
 *
 * # 模块结构
 * - `activation`: 激活函数（relu, sigmoid, tanh）
 * - `loss`: 损失函数（mse_loss）
 * - `matrix`: 矩阵运算与归约（matmul, sum）
 *
 * # 使用示例
 * ```ignore
 * use step_in_backward::nn::{Var, VarActivationOps, VarLossOps, VarMatrixOps};
 *
 * let h = x.matmul(&w)?.tanh()?;
 * let loss = h.mse_loss(&target)?;
 * let total = h.sum()?;
 * ```
 */

mod activation;
mod loss;
mod matrix;

pub use activation::VarActivationOps;
pub use loss::VarLossOps;
pub use matrix::VarMatrixOps;
