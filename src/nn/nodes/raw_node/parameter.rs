use super::TraitNode;
use super::input::check_leaf_shape;
use crate::nn::GraphError;

/// 参数节点：可训练的叶子节点，反向传播时累积梯度，并可登记梯度累积完毕后的钩子
#[derive(Clone)]
pub(in crate::nn) struct Parameter {
    shape: Vec<usize>,
}

impl Parameter {
    pub(in crate::nn) fn new(shape: &[usize]) -> Result<Self, GraphError> {
        check_leaf_shape("参数", shape)?;
        Ok(Self {
            shape: shape.to_vec(),
        })
    }
}

impl TraitNode for Parameter {
    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }
}
