/*
 * @Author       : 老董
 * @Date         : 2026-01-27
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-16
 * @Description  : GraphInner VJP 反向传播
 *
 * 调度方式：先统计损失子图中每个节点有多少条“消费边”（其子节点中需要梯度的那些），
 * 再从损失出发，每处理完一个节点就把它对父节点的梯度贡献累加上去并将计数减一；
 * 计数归零说明该节点的梯度已累积完毕，才把它放入待处理队列。
 * 因此参数节点出队时，它的梯度必然已经完整，此时调用其钩子，且每次反向传播只调用一次。
 *
 * 每个中间节点处理完即释放其梯度；若未指定 retain_graph，同时释放其前向值（激活值）。
 */

use super::super::error::GraphError;
use super::GraphInner;
use crate::nn::NodeId;
use crate::tensor::Tensor;
use std::collections::{HashMap, HashSet, VecDeque};

impl GraphInner {
    // ========== VJP 反向传播核心 ==========

    /// 反向传播，完成后释放中间结果
    pub fn backward(&mut self, loss: NodeId) -> Result<f32, GraphError> {
        self.backward_ex(loss, false)
    }

    /// 反向传播（扩展版本）
    ///
    /// # 参数
    /// - `retain_graph`: 为 true 时保留中间节点的值，以便再次反向传播
    ///
    /// # 返回
    /// 损失的标量值
    pub fn backward_ex(&mut self, loss: NodeId, retain_graph: bool) -> Result<f32, GraphError> {
        let loss_node = self.get_node(loss)?;
        let loss_value = loss_node.value().ok_or_else(|| {
            GraphError::ComputationError(format!("损失{loss_node}没有值，请先执行 forward"))
        })?;
        if loss_value.size() != 1 {
            return Err(GraphError::InvalidOperation(format!(
                "反向传播要求损失为标量 [1, 1]，但得到 {:?}",
                loss_value.shape()
            )));
        }
        let loss_scalar = loss_value.number().ok_or_else(|| {
            GraphError::ComputationError(format!(
                "无法从损失节点获取标量值，形状: {:?}",
                loss_value.shape()
            ))
        })?;

        let result = self.backward_vjp_core(loss, retain_graph);

        // 出错中止时同样清理，保证每个中间节点至多持有一份梯度
        self.reset_intermediate_grad();
        if !retain_graph {
            self.release_intermediate_results();
        }
        result?;

        self.last_backward_pass_id += 1;
        Ok(loss_scalar)
    }

    fn backward_vjp_core(&mut self, loss_id: NodeId, retain_graph: bool) -> Result<(), GraphError> {
        let topo_order = self.ancestors_in_topological_order(loss_id)?;
        let requires_grad = self.requires_grad_map(&topo_order)?;
        if !requires_grad.get(&loss_id).copied().unwrap_or(false) {
            return Err(GraphError::InvalidOperation(
                "损失不依赖任何参数，无法反向传播".to_string(),
            ));
        }
        let mut pending = self.pending_consumer_counts(&topo_order, &requires_grad)?;

        let loss_shape = self.get_node(loss_id)?.value_expected_shape().to_vec();
        self.get_node_mut(loss_id)?
            .accumulate_grad(Tensor::ones(&loss_shape))?;

        let mut fired = HashSet::new();
        let mut ready = VecDeque::from([loss_id]);
        while let Some(node_id) = ready.pop_front() {
            if self.get_node(node_id)?.is_parameter() {
                self.run_post_accumulate_hooks(node_id)?;
                fired.insert(node_id);
                continue;
            }

            let contributions = self.calc_grads_to_parents(node_id, &requires_grad)?;

            let node = self.get_node_mut(node_id)?;
            node.clear_grad();
            if !retain_graph {
                node.clear_value();
            }

            for (parent_id, grad) in contributions {
                self.get_node_mut(parent_id)?.accumulate_grad(grad)?;
                let count = pending.entry(parent_id).or_insert(0);
                *count = count.saturating_sub(1);
                if *count == 0 {
                    ready.push_back(parent_id);
                }
            }
        }

        let unfired: Vec<NodeId> = self
            .hooks
            .iter()
            .filter(|(id, hooks)| !hooks.is_empty() && !fired.contains(*id))
            .map(|(&id, _)| id)
            .collect();
        if !unfired.is_empty() {
            tracing::debug!("参数{unfired:?}本次反向传播未收到梯度，其钩子未被调用");
        }
        Ok(())
    }

    /// 子图中每个节点是否需要梯度：参数需要；输入不需要；算子只要有一个父节点需要即需要
    fn requires_grad_map(
        &self,
        topo_order: &[NodeId],
    ) -> Result<HashMap<NodeId, bool>, GraphError> {
        let mut requires_grad = HashMap::with_capacity(topo_order.len());
        for &id in topo_order {
            let node = self.get_node(id)?;
            let flag = if node.is_parameter() {
                true
            } else if node.is_input() {
                false
            } else {
                self.get_node_parents(id)?
                    .iter()
                    .any(|parent| requires_grad.get(parent).copied().unwrap_or(false))
            };
            requires_grad.insert(id, flag);
        }
        Ok(requires_grad)
    }

    /// 每个需要梯度的节点尚未送达的梯度贡献个数（同一父节点被引用多次时按次计数）
    fn pending_consumer_counts(
        &self,
        topo_order: &[NodeId],
        requires_grad: &HashMap<NodeId, bool>,
    ) -> Result<HashMap<NodeId, usize>, GraphError> {
        let mut pending = HashMap::new();
        for &id in topo_order {
            if !requires_grad[&id] || self.get_node(id)?.is_leaf() {
                continue;
            }
            for parent_id in self.get_node_parents(id)? {
                if requires_grad[&parent_id] {
                    *pending.entry(parent_id).or_insert(0) += 1;
                }
            }
        }
        Ok(pending)
    }

    /// 计算`node_id`对每个需要梯度的父节点的梯度贡献
    fn calc_grads_to_parents(
        &self,
        node_id: NodeId,
        requires_grad: &HashMap<NodeId, bool>,
    ) -> Result<Vec<(NodeId, Tensor)>, GraphError> {
        let node = self.get_node(node_id)?;
        let upstream_grad = node.grad().ok_or_else(|| {
            GraphError::ComputationError(format!(
                "{node}没有梯度。不该触及本错误，否则说明crate代码有问题"
            ))
        })?;

        let parent_ids = self.get_node_parents(node_id)?;
        let parent_values = parent_ids
            .iter()
            .map(|&parent_id| {
                let parent = self.get_node(parent_id)?;
                parent.value().ok_or_else(|| {
                    GraphError::ComputationError(format!(
                        "{parent}没有值，无法计算{node}的梯度。若需多次反向传播，请使用 retain_graph"
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut grads = Vec::with_capacity(parent_ids.len());
        for (index, &parent_id) in parent_ids.iter().enumerate() {
            if requires_grad[&parent_id] {
                let grad = node.calc_grad_to_parent(index, &parent_values, upstream_grad)?;
                grads.push((parent_id, grad));
            }
        }
        Ok(grads)
    }

    /// 依次调用参数节点上的钩子
    fn run_post_accumulate_hooks(&mut self, node_id: NodeId) -> Result<(), GraphError> {
        let Some(hooks) = self.hooks.get_mut(&node_id) else {
            return Ok(());
        };
        let node = self
            .nodes
            .get_mut(&node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?;
        let mut slot = node.param_slot().ok_or_else(|| {
            GraphError::ComputationError(format!("参数{node_id}没有值"))
        })?;
        for (_, hook) in hooks.iter_mut() {
            hook(&mut slot).map_err(|e| {
                tracing::warn!("参数{node_id}的梯度钩子返回错误，反向传播中止：{e}");
                GraphError::HookFailed {
                    node: node_id,
                    message: e.to_string(),
                }
            })?;
        }
        Ok(())
    }
}
