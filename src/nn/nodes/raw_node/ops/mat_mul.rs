use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{TraitNode, check_parent_count};
use crate::tensor::Tensor;

/// 矩阵乘法节点：[m, k] @ [k, n] = [m, n]
#[derive(Clone)]
pub(in crate::nn) struct MatMul {
    shape: Vec<usize>,
}

impl MatMul {
    pub(in crate::nn) fn new(parents: &[&[usize]]) -> Result<Self, GraphError> {
        check_parent_count("MatMul", parents, 2)?;
        let (a, b) = (parents[0], parents[1]);
        if a.len() != 2 || b.len() != 2 || a[1] != b[0] {
            return Err(GraphError::ShapeMismatch {
                expected: vec![a.get(1).copied().unwrap_or(0), b.get(1).copied().unwrap_or(0)],
                got: b.to_vec(),
                message: format!(
                    "MatMul节点的第一个父节点（形状{a:?}）的列数须等于第二个父节点的行数"
                ),
            });
        }
        Ok(Self {
            shape: vec![a[0], b[1]],
        })
    }
}

impl TraitNode for MatMul {
    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parents[0].mat_mul(parents[1])?)
    }

    fn calc_grad_to_parent(
        &self,
        index: usize,
        parents: &[&Tensor],
        _value: &Tensor,
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        // C = A @ B：∂L/∂A = ∂L/∂C @ Bᵀ，∂L/∂B = Aᵀ @ ∂L/∂C
        let grad = if index == 0 {
            upstream_grad.mat_mul(&parents[1].transpose())?
        } else {
            parents[0].transpose().mat_mul(upstream_grad)?
        };
        Ok(grad)
    }
}
