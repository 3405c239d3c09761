use super::TraitNode;
use crate::nn::GraphError;

/// 输入节点：数据由外部通过 set_value 提供，不参与求导
#[derive(Clone)]
pub(in crate::nn) struct Input {
    shape: Vec<usize>,
}

impl Input {
    pub(in crate::nn) fn new(shape: &[usize]) -> Result<Self, GraphError> {
        check_leaf_shape("输入", shape)?;
        Ok(Self {
            shape: shape.to_vec(),
        })
    }
}

impl TraitNode for Input {
    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }
}

/// 叶子节点只支持2阶张量（全连接网络的[batch, features]与权重[in, out]）
pub(super) fn check_leaf_shape(kind: &str, shape: &[usize]) -> Result<(), GraphError> {
    if shape.len() != 2 || shape.contains(&0) {
        return Err(GraphError::InvalidOperation(format!(
            "{kind}节点的形状必须是2维且各维度大于0，但收到{shape:?}"
        )));
    }
    Ok(())
}
