/*
 * @Author       : 老董
 * @Date         : 2026-01-09
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-16
 * @Description  : Var 损失函数扩展 trait
 */

use crate::nn::{GraphError, Var};

/// 损失函数扩展 trait
pub trait VarLossOps {
    /// 均方误差：mean((self - target)²)，输出[1, 1]
    fn mse_loss(&self, target: &Var) -> Result<Var, GraphError>;
}

impl VarLossOps for Var {
    fn mse_loss(&self, target: &Var) -> Result<Var, GraphError> {
        self.binary_op(target, "MSE损失计算", |g, input, target| {
            g.new_mse_loss_node(input, target, None)
        })
    }
}
