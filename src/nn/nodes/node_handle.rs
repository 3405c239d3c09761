/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 节点句柄：节点类型 + 被记账的值/梯度
 */

use super::NodeId;
use super::raw_node::{NodeType, TraitNode};
use crate::memory::{Category, Tracked};
use crate::nn::GraphError;
use crate::nn::graph::ParamSlot;
use crate::tensor::Tensor;
use std::fmt;

pub(in crate::nn) struct NodeHandle {
    id: NodeId,
    name: String,
    raw_node: NodeType,
    value: Option<Tracked>,
    /// 梯度在首次累加时才分配
    grad: Option<Tracked>,
}

impl NodeHandle {
    pub(in crate::nn) fn new<T: Into<NodeType>>(raw_node: T) -> Self {
        Self {
            id: NodeId(0),
            name: String::new(),
            raw_node: raw_node.into(),
            value: None,
            grad: None,
        }
    }

    pub(in crate::nn) fn bind_id_and_name(&mut self, id: NodeId, name: &str) {
        self.id = id;
        self.name = name.to_string();
    }

    pub(in crate::nn) const fn id(&self) -> NodeId {
        self.id
    }

    pub(in crate::nn) fn name(&self) -> &str {
        &self.name
    }

    pub(in crate::nn) const fn node_type(&self) -> &NodeType {
        &self.raw_node
    }

    pub(in crate::nn) fn value_expected_shape(&self) -> &[usize] {
        self.raw_node.value_expected_shape()
    }

    pub(in crate::nn) const fn is_parameter(&self) -> bool {
        matches!(self.raw_node, NodeType::Parameter(_))
    }

    pub(in crate::nn) const fn is_input(&self) -> bool {
        matches!(self.raw_node, NodeType::Input(_))
    }

    /// 输入和参数是叶子节点，其值由外部设置而非前向计算
    pub(in crate::nn) const fn is_leaf(&self) -> bool {
        self.is_parameter() || self.is_input()
    }

    const fn value_category(&self) -> Category {
        match self.raw_node {
            NodeType::Parameter(_) => Category::Parameter,
            NodeType::Input(_) => Category::Input,
            _ => Category::Activation,
        }
    }

    // ========== 值 ==========

    pub(in crate::nn) fn value(&self) -> Option<&Tensor> {
        self.value.as_ref().map(Tracked::tensor)
    }

    pub(in crate::nn) const fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// 由用户设置叶子节点的值，形状须与创建时一致
    pub(in crate::nn) fn set_value(&mut self, value: Option<&Tensor>) -> Result<(), GraphError> {
        if !self.is_leaf() {
            return Err(GraphError::InvalidOperation(format!(
                "{self}的值由前向传播计算，不应被手动设置"
            )));
        }
        match value {
            None => self.value = None,
            Some(value) => {
                if value.shape() != self.value_expected_shape() {
                    return Err(GraphError::ShapeMismatch {
                        expected: self.value_expected_shape().to_vec(),
                        got: value.shape().to_vec(),
                        message: format!("{self}的新值形状不符"),
                    });
                }
                self.store_value(value.clone());
            }
        }
        Ok(())
    }

    /// 写入值，大小不变时沿用已有的内存块
    #[track_caller]
    pub(in crate::nn) fn store_value(&mut self, value: Tensor) {
        let category = self.value_category();
        if let Some(tracked) = self.value.as_mut() {
            tracked.replace(value, &self.name);
        } else {
            self.value = Some(Tracked::new(value, category, &self.name));
        }
    }

    pub(in crate::nn) fn clear_value(&mut self) {
        self.value = None;
    }

    /// 根据父节点的值计算本节点的值
    pub(in crate::nn) fn calc_value_by_parents(
        &self,
        parents: &[&Tensor],
    ) -> Result<Tensor, GraphError> {
        self.raw_node.calc_value_by_parents(parents)
    }

    /// 计算对第`index`个父节点的梯度贡献
    pub(in crate::nn) fn calc_grad_to_parent(
        &self,
        index: usize,
        parents: &[&Tensor],
        upstream_grad: &Tensor,
    ) -> Result<Tensor, GraphError> {
        let value = self.value().ok_or_else(|| {
            GraphError::ComputationError(format!(
                "{self}没有值，无法计算梯度。若需多次反向传播，请使用 retain_graph"
            ))
        })?;
        self.raw_node
            .calc_grad_to_parent(index, parents, value, upstream_grad)
    }

    // ========== 梯度 ==========

    pub(in crate::nn) fn grad(&self) -> Option<&Tensor> {
        self.grad.as_ref().map(Tracked::tensor)
    }

    pub(in crate::nn) const fn has_grad(&self) -> bool {
        self.grad.is_some()
    }

    /// 把一份梯度贡献累加到本节点。首次累加时直接接管该张量作为梯度缓冲
    #[track_caller]
    pub(in crate::nn) fn accumulate_grad(
        &mut self,
        contribution: Tensor,
    ) -> Result<(), GraphError> {
        if contribution.shape() != self.value_expected_shape() {
            return Err(GraphError::ShapeMismatch {
                expected: self.value_expected_shape().to_vec(),
                got: contribution.shape().to_vec(),
                message: format!("{self}收到的梯度形状不符"),
            });
        }
        let label = format!("{}.grad", self.name);
        if let Some(grad) = self.grad.as_mut() {
            let contribution = Tracked::new(contribution, Category::Temporary, &label);
            *grad.tensor_mut() += contribution.tensor();
        } else {
            self.grad = Some(Tracked::new(contribution, Category::Gradient, &label));
        }
        Ok(())
    }

    pub(in crate::nn) fn clear_grad(&mut self) {
        self.grad = None;
    }

    /// 参数节点的可变视图，供钩子与更新规则使用；非参数或尚无值时返回 None
    pub(in crate::nn) fn param_slot(&mut self) -> Option<ParamSlot<'_>> {
        if !self.is_parameter() {
            return None;
        }
        let value = self.value.as_mut()?;
        Some(ParamSlot::new(self.id, &self.name, value, &mut self.grad))
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "节点[id={}, name={}, type={}]",
            self.id.0,
            self.name,
            self.raw_node.type_name()
        )
    }
}
