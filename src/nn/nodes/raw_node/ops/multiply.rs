use super::{broadcast_output_shape, reduce_grad_to};
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{TraitNode, check_parent_count};
use crate::tensor::Tensor;

/// 逐元素乘法节点：a ⊙ b（支持广播）
#[derive(Clone)]
pub(in crate::nn) struct Multiply {
    shape: Vec<usize>,
}

impl Multiply {
    pub(in crate::nn) fn new(parents: &[&[usize]]) -> Result<Self, GraphError> {
        check_parent_count("Multiply", parents, 2)?;
        Ok(Self {
            shape: broadcast_output_shape("Multiply", parents[0], parents[1])?,
        })
    }
}

impl TraitNode for Multiply {
    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parents[0] * parents[1])
    }

    fn calc_grad_to_parent(
        &self,
        index: usize,
        parents: &[&Tensor],
        _value: &Tensor,
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        // ∂(a⊙b)/∂a = b，∂(a⊙b)/∂b = a
        let other = parents[1 - index];
        reduce_grad_to(&(upstream_grad * other), parents[index])
    }
}
