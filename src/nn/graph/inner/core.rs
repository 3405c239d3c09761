/*
 * @Author       : 老董
 * @Date         : 2026-01-27
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-16
 * @Description  : GraphInner 核心操作 + 前向传播
 */

use super::super::error::GraphError;
use super::super::hooks::ParamSlot;
use super::GraphInner;
use crate::nn::NodeId;
use crate::nn::nodes::NodeHandle;
use crate::tensor::Tensor;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::{HashMap, HashSet};

impl GraphInner {
    // ========== 创建 ==========

    pub fn new() -> Self {
        Self::with_name_and_rng("default_graph", StdRng::from_entropy())
    }

    /// 创建一个带固定种子的计算图（确保可重复性）
    pub fn new_with_seed(seed: u64) -> Self {
        Self::with_name_and_rng("default_graph", StdRng::seed_from_u64(seed))
    }

    pub fn with_name(name: &str) -> Self {
        Self::with_name_and_rng(name, StdRng::from_entropy())
    }

    fn with_name_and_rng(name: &str, rng: StdRng) -> Self {
        Self {
            name: name.to_string(),
            nodes: HashMap::new(),
            forward_edges: HashMap::new(),
            backward_edges: HashMap::new(),
            last_backward_pass_id: 0,
            next_id: 0,
            rng,
            hooks: HashMap::new(),
            next_hook_id: 0,
        }
    }

    // ========== 基础访问器 ==========

    /// 设置/重置图的随机种子
    pub fn set_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub(in crate::nn) const fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn nodes_count(&self) -> usize {
        self.nodes.len()
    }

    pub const fn last_backward_pass_id(&self) -> u64 {
        self.last_backward_pass_id
    }

    pub(in crate::nn) fn get_node(&self, id: NodeId) -> Result<&NodeHandle, GraphError> {
        self.nodes.get(&id).ok_or(GraphError::NodeNotFound(id))
    }

    pub(in crate::nn) fn get_node_mut(
        &mut self,
        id: NodeId,
    ) -> Result<&mut NodeHandle, GraphError> {
        self.nodes.get_mut(&id).ok_or(GraphError::NodeNotFound(id))
    }

    pub fn get_node_parents(&self, id: NodeId) -> Result<Vec<NodeId>, GraphError> {
        // 先检查节点是否存在
        let _ = self.get_node(id)?;
        Ok(self.backward_edges.get(&id).cloned().unwrap_or_default())
    }

    pub fn get_node_children(&self, id: NodeId) -> Result<Vec<NodeId>, GraphError> {
        let _ = self.get_node(id)?;
        Ok(self.forward_edges.get(&id).cloned().unwrap_or_default())
    }

    pub fn get_node_name(&self, id: NodeId) -> Result<&str, GraphError> {
        Ok(self.get_node(id)?.name())
    }

    pub fn get_node_value_expected_shape(&self, id: NodeId) -> Result<&[usize], GraphError> {
        Ok(self.get_node(id)?.value_expected_shape())
    }

    pub fn has_node_value(&self, id: NodeId) -> Result<bool, GraphError> {
        Ok(self.get_node(id)?.has_value())
    }

    pub fn get_node_value(&self, id: NodeId) -> Result<Option<&Tensor>, GraphError> {
        Ok(self.get_node(id)?.value())
    }

    pub fn set_node_value(&mut self, id: NodeId, value: Option<&Tensor>) -> Result<(), GraphError> {
        self.get_node_mut(id)?.set_value(value)
    }

    pub fn get_node_grad(&self, id: NodeId) -> Result<Option<&Tensor>, GraphError> {
        let node = self.get_node(id)?;
        // 输入节点不应该有梯度
        if node.is_input() {
            return Err(GraphError::InvalidOperation(format!(
                "输入{node}不应该有梯度"
            )));
        }
        Ok(node.grad())
    }

    pub fn is_parameter(&self, id: NodeId) -> Result<bool, GraphError> {
        Ok(self.get_node(id)?.is_parameter())
    }

    /// 获取所有可训练的参数节点（按创建顺序）
    pub fn get_trainable_nodes(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|(_, node)| node.is_parameter())
            .map(|(&id, _)| id)
            .collect();
        ids.sort();
        ids
    }

    /// 以参数视图访问某个参数节点，供优化器在反向传播之外更新参数
    pub fn with_param_slot<R>(
        &mut self,
        id: NodeId,
        f: impl FnOnce(&mut ParamSlot<'_>) -> Result<R, GraphError>,
    ) -> Result<R, GraphError> {
        let node = self.get_node_mut(id)?;
        if !node.is_parameter() {
            return Err(GraphError::InvalidOperation(format!("{node}不是参数节点")));
        }
        let message = format!("{node}没有值");
        let mut slot = node
            .param_slot()
            .ok_or(GraphError::ComputationError(message))?;
        f(&mut slot)
    }

    // ========== ID/名称生成 ==========

    pub(in crate::nn::graph) const fn generate_valid_node_id(&mut self) -> NodeId {
        // 先递增再返回，所以第一个节点 ID 是 1
        self.next_id += 1;
        NodeId(self.next_id)
    }

    pub(in crate::nn::graph) fn check_duplicate_node_name(
        &self,
        name: &str,
    ) -> Result<(), GraphError> {
        if self.nodes.values().any(|node| node.name() == name) {
            return Err(GraphError::DuplicateNodeName(format!(
                "节点{}在图{}中重复",
                name,
                self.name()
            )));
        }
        Ok(())
    }

    pub(in crate::nn::graph) fn generate_valid_new_node_name(
        &self,
        base_name: &str,
        node_type: &str,
    ) -> Result<String, GraphError> {
        if !base_name.is_empty() {
            self.check_duplicate_node_name(base_name)?;
            return Ok(base_name.to_string());
        }

        let mut counter = 1;
        loop {
            let name = format!("{node_type}_{counter}");
            if self.check_duplicate_node_name(&name).is_ok() {
                return Ok(name);
            }
            counter += 1;
        }
    }

    // ========== 前向传播 ==========

    /// 前向传播：按拓扑顺序重新计算`node_id`及其所有非叶子祖先节点的值
    pub fn forward(&mut self, node_id: NodeId) -> Result<(), GraphError> {
        for id in self.ancestors_in_topological_order(node_id)? {
            let node = self.get_node(id)?;
            if node.is_leaf() {
                if node.has_value() {
                    continue;
                }
                return Err(GraphError::InvalidOperation(format!(
                    "{node}是输入/参数类型，其值应通过 set_value 设置，而非通过父节点前向传播计算"
                )));
            }

            let value = {
                let parents = self
                    .backward_edges
                    .get(&id)
                    .map(Vec::as_slice)
                    .unwrap_or_default()
                    .iter()
                    .map(|&parent_id| {
                        let parent = self.get_node(parent_id)?;
                        parent.value().ok_or_else(|| {
                            GraphError::ComputationError(format!(
                                "{node}的父节点{parent}没有值。不该触及本错误，否则说明crate代码有问题"
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                node.calc_value_by_parents(&parents)?
            };
            self.get_node_mut(id)?.store_value(value);
        }
        Ok(())
    }

    /// `node_id`及其所有祖先，父节点总排在子节点之前
    pub(in crate::nn::graph) fn ancestors_in_topological_order(
        &self,
        node_id: NodeId,
    ) -> Result<Vec<NodeId>, GraphError> {
        fn dfs(
            graph: &GraphInner,
            node_id: NodeId,
            visited: &mut HashSet<NodeId>,
            result: &mut Vec<NodeId>,
        ) -> Result<(), GraphError> {
            if !visited.insert(node_id) {
                return Ok(());
            }
            for parent_id in graph.get_node_parents(node_id)? {
                dfs(graph, parent_id, visited, result)?;
            }
            result.push(node_id);
            Ok(())
        }

        let mut result = Vec::new();
        dfs(self, node_id, &mut HashSet::new(), &mut result)?;
        Ok(result)
    }

    /// 释放中间节点的值和梯度（输入与参数保留）
    pub(in crate::nn::graph) fn release_intermediate_results(&mut self) {
        for node in self.nodes.values_mut().filter(|node| !node.is_leaf()) {
            node.clear_value();
            node.clear_grad();
        }
    }

    /// 释放所有非参数节点的梯度
    pub(in crate::nn::graph) fn reset_intermediate_grad(&mut self) {
        for node in self.nodes.values_mut().filter(|node| !node.is_parameter()) {
            node.clear_grad();
        }
    }

    // ========== 梯度清理 ==========

    /// 清除单个节点的梯度
    pub fn clear_node_grad(&mut self, node_id: NodeId) -> Result<(), GraphError> {
        self.get_node_mut(node_id)?.clear_grad();
        Ok(())
    }

    /// 释放所有节点的梯度（PyTorch 风格，等价于 set_to_none=True）
    pub fn zero_grad(&mut self) {
        for node in self.nodes.values_mut() {
            node.clear_grad();
        }
    }
}
