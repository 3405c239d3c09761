/*
 * @Author       : 老董
 * @Date         : 2026-01-09
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-16
 * @Description  : Module trait 定义
 */

use super::Var;

/// 模块 trait
///
/// # 设计原则
/// - `forward()` **不是** trait 方法（签名各异）
/// - `new()` **不是** trait 方法（参数各异）
/// - `parameters()` 返回 `Vec<Var>`（签名一致，放入 trait）
/// - 由于 Var 携带图引用，`forward()` 不需要 `&Graph` 参数
///
/// # 使用示例
///
/// ```ignore
/// use step_in_backward::nn::{Graph, Linear, Module, Var, VarActivationOps};
///
/// struct TwoLayer {
///     fc1: Linear,
///     fc2: Linear,
/// }
///
/// impl TwoLayer {
///     fn forward(&self, x: &Var) -> Result<Var, GraphError> {
///         let h = self.fc1.forward(x)?.relu()?;
///         self.fc2.forward(&h)
///     }
/// }
///
/// impl Module for TwoLayer {
///     fn parameters(&self) -> Vec<Var> {
///         [self.fc1.parameters(), self.fc2.parameters()].concat()
///     }
/// }
/// ```
pub trait Module {
    /// 获取所有可训练参数
    ///
    /// 用于：
    /// - 优化器需要知道要更新哪些参数
    /// - 逐参数优化器（`OptimizerDict`）据此为每个参数建立一个更新规则
    fn parameters(&self) -> Vec<Var>;

    /// 获取参数数量
    fn num_params(&self) -> usize {
        self.parameters().len()
    }
}
