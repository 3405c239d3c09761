use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{TraitNode, check_parent_count};
use crate::tensor::Tensor;

/// 求和节点：把父节点所有元素加起来，输出[1, 1]的标量
#[derive(Clone)]
pub(in crate::nn) struct Sum {
    shape: Vec<usize>,
}

impl Sum {
    pub(in crate::nn) fn new(parents: &[&[usize]]) -> Result<Self, GraphError> {
        check_parent_count("Sum", parents, 1)?;
        Ok(Self { shape: vec![1, 1] })
    }
}

impl TraitNode for Sum {
    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parents[0].sum())
    }

    fn calc_grad_to_parent(
        &self,
        _index: usize,
        parents: &[&Tensor],
        _value: &Tensor,
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        Ok(&Tensor::ones(parents[0].shape()) * upstream_grad)
    }
}
