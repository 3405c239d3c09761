use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{TraitNode, check_parent_count};
use crate::tensor::Tensor;

/// Sigmoid 激活函数节点
///
/// forward: sigmoid(x) = 1 / (1 + e^(-x))
/// backward: d(sigmoid)/dx = sigmoid(x) * (1 - sigmoid(x))
#[derive(Clone)]
pub(in crate::nn) struct Sigmoid {
    shape: Vec<usize>,
}

/// Tanh 激活函数节点
///
/// backward: d(tanh)/dx = 1 - tanh²(x)
#[derive(Clone)]
pub(in crate::nn) struct Tanh {
    shape: Vec<usize>,
}

/// ReLU 激活函数节点，x = 0 处的导数取 0
#[derive(Clone)]
pub(in crate::nn) struct ReLU {
    shape: Vec<usize>,
}

macro_rules! impl_unary_new {
    ($($node:ident),+) => {
        $(
            impl $node {
                pub(in crate::nn) fn new(parents: &[&[usize]]) -> Result<Self, GraphError> {
                    check_parent_count(stringify!($node), parents, 1)?;
                    Ok(Self {
                        shape: parents[0].to_vec(),
                    })
                }
            }
        )+
    };
}

impl_unary_new!(Sigmoid, Tanh, ReLU);

impl TraitNode for Sigmoid {
    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parents[0].sigmoid())
    }

    fn calc_grad_to_parent(
        &self,
        _index: usize,
        _parents: &[&Tensor],
        value: &Tensor,
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        let local_grad = value * &(1.0 - value);
        Ok(upstream_grad * &local_grad)
    }
}

impl TraitNode for Tanh {
    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parents[0].tanh())
    }

    fn calc_grad_to_parent(
        &self,
        _index: usize,
        _parents: &[&Tensor],
        value: &Tensor,
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        let local_grad = 1.0 - &value.square();
        Ok(upstream_grad * &local_grad)
    }
}

impl TraitNode for ReLU {
    fn value_expected_shape(&self) -> &[usize] {
        &self.shape
    }

    fn calc_value_by_parents(&self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Ok(parents[0].relu())
    }

    fn calc_grad_to_parent(
        &self,
        _index: usize,
        parents: &[&Tensor],
        _value: &Tensor,
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        Ok(upstream_grad * &parents[0].step())
    }
}
