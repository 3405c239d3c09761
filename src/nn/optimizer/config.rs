/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 优化器超参数配置（可从 JSON 读取）
 */

use super::{Adam, Optimizer, OptimizerDict, SGD};
use crate::nn::{Graph, GraphError, Var};
use serde::{Deserialize, Serialize};

/// SGD 超参数，对应 `torch.optim.SGD`（dampening = 0，不使用 nesterov）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SgdConfig {
    pub lr: f32,
    pub momentum: f32,
    pub weight_decay: f32,
}

impl Default for SgdConfig {
    fn default() -> Self {
        Self {
            lr: 0.01,
            momentum: 0.0,
            weight_decay: 0.0,
        }
    }
}

impl SgdConfig {
    pub fn validate(&self) -> Result<(), GraphError> {
        check_positive("学习率", self.lr)?;
        check_non_negative("momentum", self.momentum)?;
        check_non_negative("weight_decay", self.weight_decay)
    }
}

/// Adam 超参数，对应 `torch.optim.Adam`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdamConfig {
    pub lr: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub eps: f32,
    pub weight_decay: f32,
    /// 为 true 时，整体优化器的`step()`先为所有参数算出更新量再统一应用（多张量实现，
    /// 更快但会同时驻留所有参数的临时更新量）；为 false 时逐个参数算完即应用。
    /// 逐参数优化器（`OptimizerDict`）总是逐个参数更新，不受此项影响
    pub foreach: bool,
}

impl Default for AdamConfig {
    fn default() -> Self {
        Self {
            lr: 1e-3,
            beta1: 0.9,
            beta2: 0.999,
            eps: 1e-8,
            weight_decay: 0.0,
            foreach: true,
        }
    }
}

impl AdamConfig {
    pub fn validate(&self) -> Result<(), GraphError> {
        check_positive("学习率", self.lr)?;
        check_positive("eps", self.eps)?;
        check_non_negative("weight_decay", self.weight_decay)?;
        for (name, beta) in [("beta1", self.beta1), ("beta2", self.beta2)] {
            if !(0.0..1.0).contains(&beta) {
                return Err(GraphError::InvalidOperation(format!(
                    "{name}须在[0, 1)之间，实际为{beta}"
                )));
            }
        }
        Ok(())
    }
}

/// 优化器种类及其超参数
///
/// JSON 形如 `{"kind": "adam", "lr": 0.001}`，缺省字段取默认值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptimizerConfig {
    Sgd(SgdConfig),
    Adam(AdamConfig),
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::Adam(AdamConfig::default())
    }
}

impl OptimizerConfig {
    pub fn validate(&self) -> Result<(), GraphError> {
        match self {
            Self::Sgd(config) => config.validate(),
            Self::Adam(config) => config.validate(),
        }
    }

    pub const fn learning_rate(&self) -> f32 {
        match self {
            Self::Sgd(config) => config.lr,
            Self::Adam(config) => config.lr,
        }
    }

    /// 构建一个统管所有参数的优化器（常规训练循环用）
    pub fn build(&self, graph: &Graph, params: &[Var]) -> Result<Box<dyn Optimizer>, GraphError> {
        self.validate()?;
        Ok(match self {
            Self::Sgd(config) => Box::new(SGD::with_config(graph, params, config.clone())),
            Self::Adam(config) => Box::new(Adam::with_config(graph, params, config.clone())),
        })
    }

    /// 构建逐参数优化器字典（把更新合并进反向传播时用）
    pub fn build_dict(&self, graph: &Graph, params: &[Var]) -> Result<OptimizerDict, GraphError> {
        self.validate()?;
        match self {
            Self::Sgd(config) => OptimizerDict::sgd(graph, params, config),
            Self::Adam(config) => OptimizerDict::adam(graph, params, config),
        }
    }
}

fn check_positive(name: &str, value: f32) -> Result<(), GraphError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(GraphError::InvalidOperation(format!(
            "{name}须为正数，实际为{value}"
        )))
    }
}

fn check_non_negative(name: &str, value: f32) -> Result<(), GraphError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(GraphError::InvalidOperation(format!(
            "{name}须为非负数，实际为{value}"
        )))
    }
}
