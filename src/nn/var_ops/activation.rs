/*
 * @Author       : 老董
 * @Date         : 2026-01-09
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-16
 * @Description  : Var 激活函数扩展 trait
 */

use crate::nn::{GraphError, Var};

/// 激活函数扩展 trait
///
/// # 使用示例
/// ```ignore
/// use step_in_backward::nn::{Var, VarActivationOps};
///
/// let h = x.relu()?.sigmoid()?;
/// ```
pub trait VarActivationOps {
    /// `ReLU` 激活：max(0, x)
    fn relu(&self) -> Result<Var, GraphError>;

    /// Sigmoid 激活：1 / (1 + exp(-x))
    fn sigmoid(&self) -> Result<Var, GraphError>;

    /// Tanh 激活：(exp(x) - exp(-x)) / (exp(x) + exp(-x))
    fn tanh(&self) -> Result<Var, GraphError>;
}

impl VarActivationOps for Var {
    fn relu(&self) -> Result<Var, GraphError> {
        self.unary_op(|g, x| g.new_relu_node(x, None))
    }

    fn sigmoid(&self) -> Result<Var, GraphError> {
        self.unary_op(|g, x| g.new_sigmoid_node(x, None))
    }

    fn tanh(&self) -> Result<Var, GraphError> {
        self.unary_op(|g, x| g.new_tanh_node(x, None))
    }
}
