/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 训练配置（可从 JSON 读取，缺省字段取默认值）
 */

use super::TrainError;
use crate::nn::OptimizerConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 多层感知机的结构：`input_features` → `hidden`... → `output_features`，隐藏层之间用 ReLU
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub input_features: usize,
    pub hidden: Vec<usize>,
    pub output_features: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            input_features: 512,
            hidden: vec![512, 512],
            output_features: 128,
        }
    }
}

/// 训练配置
///
/// # 示例
/// ```json
/// {
///   "seed": 7,
///   "batch_size": 1,
///   "iterations": 3,
///   "model": { "input_features": 256, "hidden": [256, 256], "output_features": 16 },
///   "optimizer": { "kind": "adam", "lr": 0.001, "foreach": true }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// 参数初始化与假数据共用的随机种子
    pub seed: u64,
    pub batch_size: usize,
    /// 每个分析窗口内的迭代次数
    pub iterations: usize,
    pub model: ModelConfig,
    pub optimizer: OptimizerConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            batch_size: 1,
            iterations: 3,
            model: ModelConfig::default(),
            optimizer: OptimizerConfig::default(),
        }
    }
}

impl TrainConfig {
    pub fn from_json_str(json: &str) -> Result<Self, TrainError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, TrainError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), TrainError> {
        let invalid = |message: &str| Err(TrainError::InvalidConfig(message.to_string()));
        if self.batch_size == 0 {
            return invalid("batch_size 须大于0");
        }
        if self.iterations == 0 {
            return invalid("iterations 须大于0");
        }
        let model = &self.model;
        if model.input_features == 0 || model.output_features == 0 {
            return invalid("输入、输出特征数须大于0");
        }
        if model.hidden.contains(&0) {
            return invalid("隐藏层宽度须大于0");
        }
        self.optimizer
            .validate()
            .map_err(|e| TrainError::InvalidConfig(e.to_string()))
    }

    /// 输入批次的形状 [batch_size, input_features]
    pub fn input_shape(&self) -> [usize; 2] {
        [self.batch_size, self.model.input_features]
    }
}
