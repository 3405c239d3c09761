/*
 * @Author       : 老董
 * @Date         : 2023-08-17 17:24:24
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-16
 * @Description  : 张量（Tensor）：基于`ndarray`的`f32`动态维度数组。
 *                 计算图中的节点值、梯度以及优化器状态都以张量为载体；
 *                 张量本身不做内存记账，记账由`crate::memory::Tracked`负责。
 */

use ndarray::{Array, ArrayD, IxDyn};
use rand::Rng;
use rand::distributions::{Distribution, Uniform};

use crate::errors::{ComparisonOperator, TensorError};

mod ops {
    pub mod arith;
    pub mod math;
}
mod property;

#[cfg(test)]
mod tests;

/// 定义张量的结构体。其可以是标量、向量、矩阵或更高维度的数组。
/// 注：只要通Tensor初始化的都是张量（即使标量也是张量）；
/// 而通常意义上的数字（类型为usize、i32、f64等）就只是纯数（number），在这里不被认为是张量。
#[derive(Debug, Clone)]
pub struct Tensor {
    data: ArrayD<f32>,
}

impl Tensor {
    /// 创建一个张量。`data`的长度必须和`shape`中所有元素的乘积相等，否则panic。
    /// 需要显式处理错误时请用[`Tensor::try_new`]。
    pub fn new(data: &[f32], shape: &[usize]) -> Self {
        Self::try_new(data, shape).unwrap_or_else(|e| panic!("{e}"))
    }

    /// 创建一个张量，形状与数据长度不符时返回错误
    pub fn try_new(data: &[f32], shape: &[usize]) -> Result<Self, TensorError> {
        if shape.iter().any(|&d| d == 0) {
            return Err(TensorError::ValueMustSatisfyComparison {
                value_name: "形状中的每个维度".to_string(),
                operator: ComparisonOperator::GreaterOrEqual,
                threshold: 1,
            });
        }
        let data = Array::from_shape_vec(IxDyn(shape), data.to_vec()).map_err(|_| {
            TensorError::DataShapeMismatch {
                shape: shape.to_vec(),
                data_len: data.len(),
            }
        })?;
        Ok(Self { data })
    }

    pub fn zeros(shape: &[usize]) -> Self {
        Self {
            data: ArrayD::zeros(IxDyn(shape)),
        }
    }

    pub fn ones(shape: &[usize]) -> Self {
        Self {
            data: ArrayD::ones(IxDyn(shape)),
        }
    }

    /// 所有元素均为`value`的张量
    pub fn full(value: f32, shape: &[usize]) -> Self {
        Self {
            data: ArrayD::from_elem(IxDyn(shape), value),
        }
    }

    /// 形状与`other`相同的全零张量
    pub fn zeros_like(other: &Self) -> Self {
        Self::zeros(other.shape())
    }

    /// 创建一个随机张量，其值在[min, max)的区间内均匀分布
    pub fn uniform_with_rng<R: Rng + ?Sized>(
        min: f32,
        max: f32,
        shape: &[usize],
        rng: &mut R,
    ) -> Self {
        let uniform = Uniform::new(min, max);
        let len = shape.iter().product::<usize>();
        let data = (0..len).map(|_| uniform.sample(rng)).collect::<Vec<_>>();
        Self::new(&data, shape)
    }

    /// 创建一个服从正态分布的随机张量（Box-Muller变换）
    pub fn normal_with_rng<R: Rng + ?Sized>(
        mean: f32,
        std_dev: f32,
        shape: &[usize],
        rng: &mut R,
    ) -> Self {
        // 下限取EPSILON，避免ln(0)
        let uniform = Uniform::new(f32::EPSILON, 1.0);
        let data_len = shape.iter().product::<usize>();
        let mut data = Vec::with_capacity(data_len);

        while data.len() < data_len {
            let u1 = uniform.sample(rng);
            let u2 = uniform.sample(rng);
            let r = (-2.0 * u1.ln()).sqrt();
            let theta = 2.0 * std::f32::consts::PI * u2;
            data.push(mean + std_dev * r * theta.cos());
            if data.len() < data_len {
                data.push(mean + std_dev * r * theta.sin());
            }
        }

        Self::new(&data, shape)
    }

    pub(crate) const fn from_array(data: ArrayD<f32>) -> Self {
        Self { data }
    }
}
