/*
 * @Author       : 老董
 * @Date         : 2026-01-09
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-16
 * @Description  : Var 矩阵运算扩展 trait
 */

use crate::nn::{GraphError, Var};

/// 矩阵运算扩展 trait
pub trait VarMatrixOps {
    /// 矩阵乘法：[m, k] @ [k, n] = [m, n]
    fn matmul(&self, other: &Var) -> Result<Var, GraphError>;

    /// 所有元素求和，输出[1, 1]
    fn sum(&self) -> Result<Var, GraphError>;
}

impl VarMatrixOps for Var {
    fn matmul(&self, other: &Var) -> Result<Var, GraphError> {
        self.binary_op(other, "矩阵乘法", |g, a, b| g.new_mat_mul_node(a, b, None))
    }

    fn sum(&self) -> Result<Var, GraphError> {
        self.unary_op(|g, x| g.new_sum_node(x, None))
    }
}
