/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 多层感知机
 */

use super::ModelConfig;
use crate::nn::{Graph, GraphError, Linear, Module, Var, VarActivationOps};
use std::iter;

/// 多层感知机：若干 Linear 层，相邻两层之间接 ReLU，最后一层不接激活
pub struct Mlp {
    layers: Vec<Linear>,
}

impl Mlp {
    /// 按配置创建各层，层名依次为`fc1`、`fc2`...
    pub fn new(graph: &Graph, config: &ModelConfig) -> Result<Self, GraphError> {
        let dims: Vec<usize> = iter::once(config.input_features)
            .chain(config.hidden.iter().copied())
            .chain(iter::once(config.output_features))
            .collect();
        let layers = dims
            .windows(2)
            .enumerate()
            .map(|(i, pair)| Linear::new(graph, pair[0], pair[1], true, &format!("fc{}", i + 1)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { layers })
    }

    pub fn forward(&self, x: &Var) -> Result<Var, GraphError> {
        let mut h = x.clone();
        for (i, layer) in self.layers.iter().enumerate() {
            h = layer.forward(&h)?;
            if i + 1 < self.layers.len() {
                h = h.relu()?;
            }
        }
        Ok(h)
    }

    pub fn layers(&self) -> &[Linear] {
        &self.layers
    }
}

impl Module for Mlp {
    fn parameters(&self) -> Vec<Var> {
        self.layers.iter().flat_map(Module::parameters).collect()
    }
}
