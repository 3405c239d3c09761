/*
 * @Author       : 老董
 * @Date         : 2024-01-31 20:23:53
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-16
 * @Description  : 各类节点的计算逻辑。节点本身不持有值和梯度（由`NodeHandle`持有并记账），
 *                 只根据父节点的值算出本节点的值，以及根据上游梯度算出对各父节点的梯度贡献
 */

mod input;
mod loss;
mod ops;
mod parameter;

pub(in crate::nn) use input::Input;
pub(in crate::nn) use loss::MSELoss;
pub(in crate::nn) use ops::*;
pub(in crate::nn) use parameter::Parameter;

use crate::nn::GraphError;
use crate::tensor::Tensor;
use enum_dispatch::enum_dispatch;

#[enum_dispatch]
#[derive(Clone)]
pub(in crate::nn) enum NodeType {
    Input(Input),
    Parameter(Parameter),
    /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓算子↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
    Add(Add),
    Subtract(Subtract),
    Multiply(Multiply),
    MatMul(MatMul),
    Sigmoid(Sigmoid),
    Tanh(Tanh),
    ReLU(ReLU),
    Sum(Sum),
    /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑算子↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/
    MSELoss(MSELoss),
}

impl NodeType {
    pub(in crate::nn) const fn type_name(&self) -> &'static str {
        match self {
            Self::Input(_) => "Input",
            Self::Parameter(_) => "Parameter",
            Self::Add(_) => "Add",
            Self::Subtract(_) => "Subtract",
            Self::Multiply(_) => "Multiply",
            Self::MatMul(_) => "MatMul",
            Self::Sigmoid(_) => "Sigmoid",
            Self::Tanh(_) => "Tanh",
            Self::ReLU(_) => "ReLU",
            Self::Sum(_) => "Sum",
            Self::MSELoss(_) => "MSELoss",
        }
    }
}

#[enum_dispatch(NodeType)]
pub(in crate::nn) trait TraitNode {
    /// 节点值的形状，在创建节点时即已确定
    fn value_expected_shape(&self) -> &[usize];

    /// 根据父节点的值计算本节点的值（调用前所有父节点的值都已算好）
    fn calc_value_by_parents(&self, _parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Err(GraphError::InvalidOperation(
            "叶子节点的值应通过 set_value 设置，而非由父节点计算".to_string(),
        ))
    }

    /// 计算本节点对第`index`个父节点的梯度贡献（VJP）。
    /// `value`是本节点前向时算出的值，`upstream_grad`是损失对本节点的梯度
    fn calc_grad_to_parent(
        &self,
        _index: usize,
        _parents: &[&Tensor],
        _value: &Tensor,
        _upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        Err(GraphError::InvalidOperation(
            "叶子节点没有父节点，不该被要求向父节点传播梯度".to_string(),
        ))
    }
}

/// 校验父节点个数，供各算子的构造函数使用
pub(in crate::nn) fn check_parent_count(
    node_type: &str,
    parents: &[&[usize]],
    expected: usize,
) -> Result<(), GraphError> {
    if parents.len() != expected {
        return Err(GraphError::InvalidOperation(format!(
            "{node_type}节点需要{expected}个父节点，实际为{}个",
            parents.len()
        )));
    }
    Ok(())
}
