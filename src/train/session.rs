/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 训练会话（模型、输入节点与损失节点）及单步训练
 */

use super::{Mlp, TrainConfig, TrainError};
use crate::nn::{Graph, Module, Optimizer, Var, VarMatrixOps};
use crate::tensor::Tensor;

/// 一次建好的计算图：输入 → 模型 → `sum()`得到的标量损失。
/// 每次迭代只需换入新的批次再反向传播
pub struct Session {
    graph: Graph,
    model: Mlp,
    input: Var,
    loss: Var,
}

impl Session {
    pub fn new(config: &TrainConfig) -> Result<Self, TrainError> {
        config.validate()?;
        let graph = Graph::new_with_seed(config.seed);
        let model = Mlp::new(&graph, &config.model)?;
        let input = graph.input_shape(&config.input_shape(), Some("input"))?;
        let loss = model.forward(&input)?.sum()?;
        tracing::debug!(
            "训练会话已建立：{}个参数张量，输入形状{:?}",
            model.num_params(),
            config.input_shape()
        );
        Ok(Self {
            graph,
            model,
            input,
            loss,
        })
    }

    pub const fn graph(&self) -> &Graph {
        &self.graph
    }

    pub const fn model(&self) -> &Mlp {
        &self.model
    }

    pub fn parameters(&self) -> Vec<Var> {
        self.model.parameters()
    }

    pub const fn loss(&self) -> &Var {
        &self.loss
    }

    /// 换入一个批次
    pub fn feed(&self, batch: &Tensor) -> Result<(), TrainError> {
        self.input.set_value(batch)?;
        Ok(())
    }
}

/// 常规的一步训练：前向与反向 → `step()` → `zero_grad()`，返回损失
pub fn train_step(
    session: &Session,
    optimizer: &mut dyn Optimizer,
    batch: &Tensor,
) -> Result<f32, TrainError> {
    session.feed(batch)?;
    let loss = session.loss().backward()?;
    optimizer.step()?;
    optimizer.zero_grad()?;
    Ok(loss)
}

/// 更新合并进反向传播后的一步训练：只有前向与反向。
/// 参数须已通过`OptimizerDict::register_hooks`登记了更新钩子
pub fn fused_train_step(session: &Session, batch: &Tensor) -> Result<f32, TrainError> {
    session.feed(batch)?;
    Ok(session.loss().backward()?)
}
