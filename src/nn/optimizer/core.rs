/*
 * @Author       : 老董
 * @Date         : 2026-01-17
 * @LastEditTime : 2026-10-16
 * @Description  : Optimizer API - PyTorch 风格
 *
 * 核心特性：
 * - Optimizer 持有 Rc<RefCell<GraphInner>> 引用
 * - params 存储 Vec<Var>
 * - 一次`step()`更新所有绑定的参数，梯度由`zero_grad()`统一释放
 * - 每个参数的数值更新委托给各自的`UpdateRule`
 */

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::config::{AdamConfig, SgdConfig};
use super::rule::{AdamRule, SgdRule, UpdateRule};
use crate::nn::graph::GraphInner;
use crate::nn::{Graph, GraphError, NodeId, Var};
use crate::tensor::Tensor;

/// Optimizer trait（PyTorch 风格）
///
/// # 设计要点
/// - Optimizer 绑定特定参数（通过 Var）
/// - `backward()` 计算所有参数的梯度（由 Var 调用）
/// - `step()` 只更新 Optimizer 绑定的参数
///
/// # 使用示例
/// ```ignore
/// let mut optimizer = SGD::new(&graph, &model.parameters(), 0.01);
///
/// // 训练循环
/// loss.backward()?;
/// optimizer.step()?;
/// optimizer.zero_grad()?;
///
/// // 或者一步完成
/// let loss_val = optimizer.minimize(&loss)?;
/// ```
pub trait Optimizer {
    /// 释放所有参数的梯度（置为 None）
    fn zero_grad(&mut self) -> Result<(), GraphError>;

    /// 更新参数（只更新 Optimizer 绑定且有梯度的参数）
    fn step(&mut self) -> Result<(), GraphError>;

    /// 一步完成训练：`zero_grad` → backward(ensure-forward) → step
    ///
    /// # 返回
    /// loss 的标量值
    fn minimize(&mut self, loss: &Var) -> Result<f32, GraphError> {
        self.zero_grad()?;
        let loss_val = loss.backward()?;
        self.step()?;
        Ok(loss_val)
    }

    /// 获取学习率
    fn learning_rate(&self) -> f32;

    /// 设置学习率
    fn set_learning_rate(&mut self, lr: f32);

    /// 重置累积状态（如 Adam 的动量）
    fn reset(&mut self);
}

/// 为每个参数建一条更新规则
fn rules_for<R>(params: &[Var], build: impl Fn() -> R) -> HashMap<NodeId, R> {
    params
        .iter()
        .map(|param| (param.node_id(), build()))
        .collect()
}

fn clear_grads(graph: &RefCell<GraphInner>, params: &[Var]) -> Result<(), GraphError> {
    let mut g = graph.borrow_mut();
    for param in params {
        g.clear_node_grad(param.node_id())?;
    }
    Ok(())
}

/// SGD 优化器（PyTorch 风格）
///
/// 随机梯度下降：θ = θ - α * ∇θ（可选动量与权重衰减）
///
/// # 使用示例
/// ```ignore
/// let mut optimizer = SGD::new(&graph, &model.parameters(), 0.01);
/// loss.backward()?;
/// optimizer.step()?;
/// optimizer.zero_grad()?;
/// ```
pub struct SGD {
    /// 图引用
    graph: Rc<RefCell<GraphInner>>,
    /// 要优化的参数
    params: Vec<Var>,
    config: SgdConfig,
    rules: HashMap<NodeId, SgdRule>,
}

impl SGD {
    /// 创建新的 SGD 优化器
    ///
    /// # 参数
    /// - `graph`: 图句柄
    /// - `params`: 要优化的参数 Var 列表
    /// - `lr`: 学习率
    pub fn new(graph: &Graph, params: &[Var], lr: f32) -> Self {
        Self::with_config(
            graph,
            params,
            SgdConfig {
                lr,
                ..SgdConfig::default()
            },
        )
    }

    pub fn with_config(graph: &Graph, params: &[Var], config: SgdConfig) -> Self {
        let rules = rules_for(params, || SgdRule::new(config.clone()));
        Self {
            graph: graph.inner_rc(),
            params: params.to_vec(),
            config,
            rules,
        }
    }

    /// 获取优化器绑定的参数列表
    pub fn params(&self) -> &[Var] {
        &self.params
    }

    /// 获取指定参数的动量缓冲（未启用动量或尚未更新过时为 None）
    pub fn get_momentum_buffer(&self, param: &Var) -> Option<&Tensor> {
        self.rules.get(&param.node_id())?.momentum_buffer()
    }
}

impl Optimizer for SGD {
    fn zero_grad(&mut self) -> Result<(), GraphError> {
        clear_grads(&self.graph, &self.params)
    }

    fn step(&mut self) -> Result<(), GraphError> {
        let mut g = self.graph.borrow_mut();
        for param in &self.params {
            let node_id = param.node_id();
            let rule = self
                .rules
                .entry(node_id)
                .or_insert_with(|| SgdRule::new(self.config.clone()));
            g.with_param_slot(node_id, |slot| rule.apply(slot))?;
        }
        Ok(())
    }

    fn learning_rate(&self) -> f32 {
        self.config.lr
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.config.lr = lr;
        for rule in self.rules.values_mut() {
            rule.set_learning_rate(lr);
        }
    }

    fn reset(&mut self) {
        for rule in self.rules.values_mut() {
            rule.reset();
        }
    }
}

/// Adam 优化器（PyTorch 风格）
///
/// Adam: Adaptive Moment Estimation
/// - m = β1 * m + (1 - β1) * g
/// - v = β2 * v + (1 - β2) * g²
/// - θ = θ - α * `m_hat` / (√`v_hat` + ε)
///
/// `foreach = true`（默认）时一次`step()`先为全部参数算出更新量再统一应用，
/// 这期间所有参数的更新量同时驻留内存。
///
/// # 使用示例
/// ```ignore
/// let mut optimizer = Adam::new(&graph, &model.parameters(), 0.001);
/// loss.backward()?;
/// optimizer.step()?;
/// optimizer.zero_grad()?;
/// ```
pub struct Adam {
    /// 图引用
    graph: Rc<RefCell<GraphInner>>,
    /// 要优化的参数
    params: Vec<Var>,
    config: AdamConfig,
    /// 每个参数的矩估计与时间步（按 `NodeId` 索引）
    rules: HashMap<NodeId, AdamRule>,
}

impl Adam {
    /// 创建新的 Adam 优化器
    ///
    /// # 参数
    /// - `graph`: 图句柄
    /// - `params`: 要优化的参数 Var 列表
    /// - `lr`: 学习率
    pub fn new(graph: &Graph, params: &[Var], lr: f32) -> Self {
        Self::with_config(
            graph,
            params,
            AdamConfig {
                lr,
                ..AdamConfig::default()
            },
        )
    }

    /// 创建带完整配置的 Adam 优化器
    pub fn with_config(graph: &Graph, params: &[Var], config: AdamConfig) -> Self {
        let rules = rules_for(params, || AdamRule::new(config.clone()));
        Self {
            graph: graph.inner_rc(),
            params: params.to_vec(),
            config,
            rules,
        }
    }

    /// 获取优化器绑定的参数列表
    pub fn params(&self) -> &[Var] {
        &self.params
    }

    /// 获取指定参数的动量状态（一阶矩 m）
    pub fn get_momentum(&self, param: &Var) -> Option<&Tensor> {
        self.rules.get(&param.node_id())?.exp_avg()
    }

    /// 获取指定参数的速度状态（二阶矩 v）
    pub fn get_velocity(&self, param: &Var) -> Option<&Tensor> {
        self.rules.get(&param.node_id())?.exp_avg_sq()
    }

    /// 获取指定参数已更新的步数
    pub fn timestep(&self, param: &Var) -> u64 {
        self.rules
            .get(&param.node_id())
            .map_or(0, |rule| rule.step_count())
    }

    /// 多张量模式：先为所有参数算出更新量，再统一作用到参数上
    fn step_foreach(&mut self) -> Result<(), GraphError> {
        let mut g = self.graph.borrow_mut();
        let mut updates = Vec::with_capacity(self.params.len());
        for param in &self.params {
            let node_id = param.node_id();
            let rule = self
                .rules
                .entry(node_id)
                .or_insert_with(|| AdamRule::new(self.config.clone()));
            if let Some(update) = g.with_param_slot(node_id, |slot| rule.compute_update(slot))? {
                updates.push((node_id, update));
            }
        }
        for (node_id, update) in updates {
            g.with_param_slot(node_id, |slot| {
                *slot.value_mut() -= update.tensor();
                Ok(())
            })?;
        }
        Ok(())
    }
}

impl Optimizer for Adam {
    fn zero_grad(&mut self) -> Result<(), GraphError> {
        clear_grads(&self.graph, &self.params)
    }

    fn step(&mut self) -> Result<(), GraphError> {
        if self.config.foreach {
            return self.step_foreach();
        }
        let mut g = self.graph.borrow_mut();
        for param in &self.params {
            let node_id = param.node_id();
            let rule = self
                .rules
                .entry(node_id)
                .or_insert_with(|| AdamRule::new(self.config.clone()));
            g.with_param_slot(node_id, |slot| rule.apply(slot))?;
        }
        Ok(())
    }

    fn learning_rate(&self) -> f32 {
        self.config.lr
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.config.lr = lr;
        for rule in self.rules.values_mut() {
            rule.set_learning_rate(lr);
        }
    }

    fn reset(&mut self) {
        for rule in self.rules.values_mut() {
            rule.reset();
        }
    }
}
