/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 逐参数优化器字典：把优化器的更新合并进反向传播
 *
 * 每个参数独占一条`UpdateRule`。调用`register_hooks`后，反向传播中某个参数的梯度
 * 一旦累积完毕，其钩子就立即用对应规则更新该参数并释放梯度。这样梯度不会在
 * 所有参数上同时驻留，训练循环里也不再需要`step()`/`zero_grad()`。
 */

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use super::config::{AdamConfig, OptimizerConfig, SgdConfig};
use super::rule::{AdamRule, SgdRule, UpdateRule};
use crate::nn::graph::GraphInner;
use crate::nn::{Graph, GraphError, HookHandle, NodeId, ParamSlot, Var};

/// 参数 → 更新规则 的映射。构建后结构不再变化，只有各条规则的内部状态会变
///
/// # 使用示例
/// ```ignore
/// let dict = Rc::new(OptimizerDict::adam(&graph, &model.parameters(), &AdamConfig::default())?);
/// let _handles = dict.register_hooks()?;
///
/// // 训练循环：只需前向与反向
/// loss.backward()?;
/// ```
pub struct OptimizerDict {
    /// 只弱引用计算图：钩子闭包持有本字典，字典不能反过来延长图的生命周期
    graph: Weak<RefCell<GraphInner>>,
    rules: HashMap<NodeId, RefCell<Box<dyn UpdateRule>>>,
    /// 参数的登记顺序
    order: Vec<NodeId>,
}

impl OptimizerDict {
    /// 用`factory`为每个参数各建一条规则。
    /// 参数重复、不是参数节点或不属于`graph`时报错
    pub fn new<F>(graph: &Graph, params: &[Var], mut factory: F) -> Result<Self, GraphError>
    where
        F: FnMut(&Var) -> Box<dyn UpdateRule>,
    {
        let mut rules = HashMap::with_capacity(params.len());
        let mut order = Vec::with_capacity(params.len());
        for param in params {
            let node_id = param.node_id();
            if !graph.ptr_eq(&param.get_graph()) {
                return Err(GraphError::InvalidOperation(format!(
                    "节点{node_id}不属于图{}",
                    graph.inner().name()
                )));
            }
            if !param.is_parameter()? {
                return Err(GraphError::InvalidOperation(format!(
                    "节点{}不是参数，不能交给优化器",
                    param.name()?
                )));
            }
            if rules.contains_key(&node_id) {
                return Err(GraphError::DuplicateParameter(node_id));
            }
            rules.insert(node_id, RefCell::new(factory(param)));
            order.push(node_id);
        }
        tracing::debug!("为{}个参数各建立了一条独立的更新规则", order.len());
        Ok(Self {
            graph: Rc::downgrade(&graph.inner_rc()),
            rules,
            order,
        })
    }

    pub fn sgd(graph: &Graph, params: &[Var], config: &SgdConfig) -> Result<Self, GraphError> {
        Self::new(graph, params, |_| Box::new(SgdRule::new(config.clone())))
    }

    /// 逐参数 Adam。每条规则只处理一个参数，`config.foreach`在这里不起作用
    pub fn adam(graph: &Graph, params: &[Var], config: &AdamConfig) -> Result<Self, GraphError> {
        Self::new(graph, params, |_| Box::new(AdamRule::new(config.clone())))
    }

    pub fn from_config(
        graph: &Graph,
        params: &[Var],
        config: &OptimizerConfig,
    ) -> Result<Self, GraphError> {
        config.build_dict(graph, params)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, node_id: NodeId) -> bool {
        self.rules.contains_key(&node_id)
    }

    /// 按登记顺序返回所有参数的 ID
    pub fn param_ids(&self) -> &[NodeId] {
        &self.order
    }

    /// 某个参数已实际更新的次数
    pub fn step_count(&self, node_id: NodeId) -> Option<u64> {
        self.rules
            .get(&node_id)
            .map(|rule| rule.borrow().step_count())
    }

    /// 学习率（取第一条规则的；字典为空时为 None）
    pub fn learning_rate(&self) -> Option<f32> {
        let first = self.order.first()?;
        self.rules.get(first).map(|rule| rule.borrow().learning_rate())
    }

    pub fn set_learning_rate(&self, lr: f32) {
        for rule in self.rules.values() {
            rule.borrow_mut().set_learning_rate(lr);
        }
    }

    pub fn reset(&self) {
        for rule in self.rules.values() {
            rule.borrow_mut().reset();
        }
    }

    /// 用参数自己的规则更新它，然后释放其梯度。钩子里调用的就是本方法
    pub fn step_param(&self, slot: &mut ParamSlot<'_>) -> Result<(), GraphError> {
        let rule = self.rules.get(&slot.id()).ok_or_else(|| {
            GraphError::InvalidOperation(format!("参数{}不在优化器字典中", slot.name()))
        })?;
        rule.borrow_mut().apply(slot)?;
        slot.clear_grad();
        Ok(())
    }

    /// 在每个参数上登记梯度累积完毕钩子。返回的句柄可用于注销钩子；
    /// 丢弃句柄不会注销钩子
    pub fn register_hooks(self: &Rc<Self>) -> Result<Vec<HookHandle>, GraphError> {
        let graph = self.graph.upgrade().map(Graph::from_rc).ok_or_else(|| {
            GraphError::InvalidOperation("计算图已被释放，无法登记钩子".to_string())
        })?;
        let handles = self
            .order
            .iter()
            .map(|&node_id| {
                let dict = Rc::clone(self);
                graph
                    .wrap_node_id(node_id)?
                    .register_post_accumulate_grad_hook(move |slot| dict.step_param(slot))
            })
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!("已在{}个参数上登记了优化器钩子", handles.len());
        Ok(handles)
    }
}

impl fmt::Debug for OptimizerDict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptimizerDict")
            .field("params", &self.order)
            .finish_non_exhaustive()
    }
}
