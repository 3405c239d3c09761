mod activation;
mod add;
mod mat_mul;
mod multiply;
mod subtract;
mod sum;

pub(in crate::nn) use activation::{ReLU, Sigmoid, Tanh};
pub(in crate::nn) use add::Add;
pub(in crate::nn) use mat_mul::MatMul;
pub(in crate::nn) use multiply::Multiply;
pub(in crate::nn) use subtract::Subtract;
pub(in crate::nn) use sum::Sum;

use crate::nn::GraphError;
use crate::tensor::Tensor;

/// 逐元素二元算子的输出形状（NumPy 广播规则）
fn broadcast_output_shape(
    node_type: &str,
    a: &[usize],
    b: &[usize],
) -> Result<Vec<usize>, GraphError> {
    Tensor::broadcast_shape(a, b).ok_or_else(|| GraphError::ShapeMismatch {
        expected: a.to_vec(),
        got: b.to_vec(),
        message: format!("{node_type}节点的两个父节点形状无法广播"),
    })
}

/// 广播的逆操作：把梯度沿被广播的维度求和，还原到父节点的形状
fn reduce_grad_to(grad: &Tensor, parent: &Tensor) -> Result<Tensor, GraphError> {
    Ok(grad.sum_to_shape(parent.shape())?)
}
