use super::{broadcast_output_shape, reduce_grad_to};
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{TraitNode, check_parent_count};
use crate::tensor::Tensor;

/// 减法节点：a - b（支持广播）
#[derive(Clone)]
pub(in crate::nn) struct Subtract {
    shape: Vec<usize>,
}

impl Subtract {
    pub(in crate::nn) fn new(parents: &[&[usize]]) -> Result<Self, GraphError> {
        check_parent_count("Subtract", parents, 2)?;
        Ok(Self {
            shape: broadcast_output_shape("Subtract", parents[0], parents[1])?,
        })
    }
}

impl TraitNode for Subtract {
    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parents[0] - parents[1])
    }

    fn calc_grad_to_parent(
        &self,
        index: usize,
        parents: &[&Tensor],
        _value: &Tensor,
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        let grad = reduce_grad_to(upstream_grad, parents[index])?;
        Ok(if index == 0 { grad } else { -grad })
    }
}
