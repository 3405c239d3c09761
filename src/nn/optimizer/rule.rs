/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 单个参数的更新规则
 *
 * 一条`UpdateRule`只负责一个参数：它独占该参数的优化器状态（动量、矩估计等），
 * 拿到参数视图`ParamSlot`后就地更新参数值。整体优化器（`SGD`/`Adam`）和
 * 逐参数优化器字典（`OptimizerDict`）共用这里的数值实现。
 */

use super::config::{AdamConfig, SgdConfig};
use crate::memory::{Category, Tracked};
use crate::nn::{GraphError, ParamSlot};
use crate::tensor::Tensor;

/// 单个参数的更新规则
pub trait UpdateRule {
    /// 用`slot`中的梯度更新参数值；参数没有梯度时什么也不做。
    /// 本方法不释放梯度，释放与否由调用方决定
    fn apply(&mut self, slot: &mut ParamSlot<'_>) -> Result<(), GraphError>;

    fn learning_rate(&self) -> f32;

    fn set_learning_rate(&mut self, lr: f32);

    /// 丢弃累积的状态（动量、矩估计、步数）
    fn reset(&mut self);

    /// 已实际执行的更新次数（不含因无梯度而跳过的调用）
    fn step_count(&self) -> u64;
}

/// 随机梯度下降：θ = θ - lr * d，其中 d = g + wd * θ，启用动量时 d 取动量缓冲 b = μ * b + d
#[derive(Debug)]
pub struct SgdRule {
    config: SgdConfig,
    momentum_buffer: Option<Tracked>,
    steps: u64,
}

impl SgdRule {
    pub const fn new(config: SgdConfig) -> Self {
        Self {
            config,
            momentum_buffer: None,
            steps: 0,
        }
    }

    pub const fn config(&self) -> &SgdConfig {
        &self.config
    }

    pub fn momentum_buffer(&self) -> Option<&Tensor> {
        self.momentum_buffer.as_ref().map(Tracked::tensor)
    }
}

impl UpdateRule for SgdRule {
    fn apply(&mut self, slot: &mut ParamSlot<'_>) -> Result<(), GraphError> {
        let update = {
            let Some(grad) = slot.grad() else {
                return Ok(());
            };
            let mut direction = grad.clone();
            if self.config.weight_decay != 0.0 {
                direction += &(slot.value() * self.config.weight_decay);
            }
            if self.config.momentum != 0.0 {
                // 首次更新时动量缓冲直接取当前方向
                if let Some(buffer) = self.momentum_buffer.as_mut() {
                    let buffer = buffer.tensor_mut();
                    *buffer *= self.config.momentum;
                    *buffer += &direction;
                    direction = buffer.clone();
                } else {
                    let label = format!("{}.momentum_buffer", slot.name());
                    self.momentum_buffer = Some(Tracked::new(
                        direction.clone(),
                        Category::OptimizerState,
                        &label,
                    ));
                }
            }
            Tracked::new(
                direction * self.config.lr,
                Category::Temporary,
                &format!("{}.update", slot.name()),
            )
        };
        *slot.value_mut() -= update.tensor();
        self.steps += 1;
        Ok(())
    }

    fn learning_rate(&self) -> f32 {
        self.config.lr
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.config.lr = lr;
    }

    fn reset(&mut self) {
        self.momentum_buffer = None;
        self.steps = 0;
    }

    fn step_count(&self) -> u64 {
        self.steps
    }
}

/// Adam：
/// - m = β1 * m + (1 - β1) * g
/// - v = β2 * v + (1 - β2) * g²
/// - θ = θ - lr * `m_hat` / (√`v_hat` + ε)
///
/// 一阶、二阶矩在首次更新时才分配（惰性初始化），步数按参数各自计数
#[derive(Debug)]
pub struct AdamRule {
    config: AdamConfig,
    exp_avg: Option<Tracked>,
    exp_avg_sq: Option<Tracked>,
    t: u64,
}

impl AdamRule {
    pub const fn new(config: AdamConfig) -> Self {
        Self {
            config,
            exp_avg: None,
            exp_avg_sq: None,
            t: 0,
        }
    }

    pub const fn config(&self) -> &AdamConfig {
        &self.config
    }

    /// 一阶矩估计 m
    pub fn exp_avg(&self) -> Option<&Tensor> {
        self.exp_avg.as_ref().map(Tracked::tensor)
    }

    /// 二阶矩估计 v
    pub fn exp_avg_sq(&self) -> Option<&Tensor> {
        self.exp_avg_sq.as_ref().map(Tracked::tensor)
    }

    /// 更新矩估计并算出本步的更新量（尚未作用到参数上）。参数没有梯度时返回 None
    ///
    /// 整体 Adam 在`foreach`模式下先为所有参数调用本方法，再统一减去更新量
    pub fn compute_update(&mut self, slot: &ParamSlot<'_>) -> Result<Option<Tracked>, GraphError> {
        let Some(grad) = slot.grad() else {
            return Ok(None);
        };
        let AdamConfig {
            lr,
            beta1,
            beta2,
            eps,
            weight_decay,
            ..
        } = self.config;

        let grad = if weight_decay == 0.0 {
            grad.clone()
        } else {
            grad + &(slot.value() * weight_decay)
        };
        self.t += 1;

        let exp_avg = self.exp_avg.get_or_insert_with(|| {
            let label = format!("{}.exp_avg", slot.name());
            Tracked::new(Tensor::zeros_like(&grad), Category::OptimizerState, &label)
        });
        let m = exp_avg.tensor_mut();
        *m *= beta1;
        *m += &(&grad * (1.0 - beta1));

        let exp_avg_sq = self.exp_avg_sq.get_or_insert_with(|| {
            let label = format!("{}.exp_avg_sq", slot.name());
            Tracked::new(Tensor::zeros_like(&grad), Category::OptimizerState, &label)
        });
        let v = exp_avg_sq.tensor_mut();
        *v *= beta2;
        *v += &(grad.square() * (1.0 - beta2));

        // 偏差修正
        let t = i32::try_from(self.t).unwrap_or(i32::MAX);
        let m_hat = exp_avg.tensor() / (1.0 - beta1.powi(t));
        let v_hat = exp_avg_sq.tensor() / (1.0 - beta2.powi(t));
        let update = &m_hat / &(v_hat.sqrt() + eps) * lr;

        Ok(Some(Tracked::new(
            update,
            Category::Temporary,
            &format!("{}.update", slot.name()),
        )))
    }
}

impl UpdateRule for AdamRule {
    fn apply(&mut self, slot: &mut ParamSlot<'_>) -> Result<(), GraphError> {
        if let Some(update) = self.compute_update(slot)? {
            *slot.value_mut() -= update.tensor();
        }
        Ok(())
    }

    fn learning_rate(&self) -> f32 {
        self.config.lr
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.config.lr = lr;
    }

    fn reset(&mut self) {
        self.exp_avg = None;
        self.exp_avg_sq = None;
        self.t = 0;
    }

    fn step_count(&self) -> u64 {
        self.t
    }
}
