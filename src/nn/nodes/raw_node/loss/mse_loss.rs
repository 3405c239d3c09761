use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{TraitNode, check_parent_count};
use crate::tensor::Tensor;

/// MSE（均方误差）损失节点
///
/// ## 公式
/// `MSE = mean((input - target)^2)`
///
/// ## 梯度
/// - `∂L/∂input = 2 * (input - target) / N`
/// - `∂L/∂target = -2 * (input - target) / N`
///
/// ## 输出
/// - 标量损失值 [1, 1]
#[derive(Clone)]
pub(in crate::nn) struct MSELoss {
    shape: Vec<usize>,
}

impl MSELoss {
    pub(in crate::nn) fn new(parents: &[&[usize]]) -> Result<Self, GraphError> {
        check_parent_count("MSELoss", parents, 2)?;
        if parents[0] != parents[1] {
            return Err(GraphError::ShapeMismatch {
                expected: parents[0].to_vec(),
                got: parents[1].to_vec(),
                message: "MSELoss的预测值与目标值形状必须相同".to_string(),
            });
        }
        Ok(Self { shape: vec![1, 1] })
    }
}

impl TraitNode for MSELoss {
    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok((parents[0] - parents[1]).square().mean())
    }

    fn calc_grad_to_parent(
        &self,
        index: usize,
        parents: &[&Tensor],
        _value: &Tensor,
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        let n = parents[0].size() as f32;
        let grad = (parents[0] - parents[1]) * (2.0 / n) * upstream_grad;
        Ok(if index == 0 { grad } else { -grad })
    }
}
