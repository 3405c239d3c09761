use super::{broadcast_output_shape, reduce_grad_to};
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{TraitNode, check_parent_count};
use crate::tensor::Tensor;

/// 加法节点：a + b（支持广播，如 [batch, out] + [1, out] 的偏置加法）
#[derive(Clone)]
pub(in crate::nn) struct Add {
    shape: Vec<usize>,
}

impl Add {
    pub(in crate::nn) fn new(parents: &[&[usize]]) -> Result<Self, GraphError> {
        check_parent_count("Add", parents, 2)?;
        Ok(Self {
            shape: broadcast_output_shape("Add", parents[0], parents[1])?,
        })
    }
}

impl TraitNode for Add {
    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parents[0] + parents[1])
    }

    fn calc_grad_to_parent(
        &self,
        index: usize,
        parents: &[&Tensor],
        _value: &Tensor,
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        // ∂(a+b)/∂a = ∂(a+b)/∂b = 1
        reduce_grad_to(upstream_grad, parents[index])
    }
}
