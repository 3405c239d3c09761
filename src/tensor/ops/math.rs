/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 矩阵乘法、激活函数及归约运算。反向传播中对广播的逆操作（`sum_to_shape`）也在此
 */

use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;
use ndarray::{Axis, Ix2};

impl Tensor {
    /// 实现矩阵乘法。只接受2阶张量，且前一个张量的列数（col）须等于后一个张量的行数（row）
    pub fn mat_mul(&self, other: &Self) -> Result<Self, TensorError> {
        for tensor in [self, other] {
            if tensor.dimension() != 2 {
                return Err(TensorError::DimensionMismatch {
                    expected: 2,
                    got: tensor.dimension(),
                });
            }
        }
        let shape_error = || TensorError::OperatorError {
            operator: Operator::MatMul,
            tensor1_shape: self.shape().to_vec(),
            tensor2_shape: other.shape().to_vec(),
        };
        if self.shape()[1] != other.shape()[0] {
            return Err(shape_error());
        }
        let lhs = self
            .data
            .view()
            .into_dimensionality::<Ix2>()
            .map_err(|_| shape_error())?;
        let rhs = other
            .data
            .view()
            .into_dimensionality::<Ix2>()
            .map_err(|_| shape_error())?;
        Ok(Self::from_array(lhs.dot(&rhs).into_dyn()))
    }

    /// 转置（反转所有维度）。返回的张量为标准内存布局
    pub fn transpose(&self) -> Self {
        Self::from_array(self.data.t().as_standard_layout().to_owned())
    }

    /// 对每个元素应用`f`
    pub fn map(&self, f: impl Fn(f32) -> f32) -> Self {
        Self::from_array(self.data.mapv(f))
    }

    pub fn sigmoid(&self) -> Self {
        self.map(|x| 1.0 / (1.0 + (-x).exp()))
    }

    pub fn tanh(&self) -> Self {
        self.map(f32::tanh)
    }

    pub fn relu(&self) -> Self {
        self.map(|x| x.max(0.0))
    }

    /// 阶跃：x>0时为1，否则为0（用作ReLU的导数）
    pub fn step(&self) -> Self {
        self.map(|x| if x > 0.0 { 1.0 } else { 0.0 })
    }

    pub fn sqrt(&self) -> Self {
        self.map(f32::sqrt)
    }

    pub fn square(&self) -> Self {
        self.map(|x| x * x)
    }

    /// 对张量中的所有元素求和并返回一个形状为[1, 1]的标量张量
    pub fn sum(&self) -> Self {
        Self::from(self.data.sum())
    }

    /// 所有元素的平均值，返回形状为[1, 1]的标量张量
    pub fn mean(&self) -> Self {
        Self::from(self.data.sum() / self.size() as f32)
    }

    /// 将（广播后的）张量按求和的方式还原到`shape`。
    /// 用于反向传播：前向若把`shape`广播成了`self.shape()`，梯度就需要沿被广播的维度求和。
    pub fn sum_to_shape(&self, shape: &[usize]) -> Result<Self, TensorError> {
        if self.shape() == shape {
            return Ok(self.clone());
        }
        match Self::broadcast_shape(self.shape(), shape) {
            Some(ref broadcasted) if broadcasted.as_slice() == self.shape() => {}
            _ => return Err(TensorError::IncompatibleShape),
        }

        let mut data = self.data.clone();
        // 1. 先把多出来的前导维度求和掉
        while data.ndim() > shape.len() {
            data = data.sum_axis(Axis(0));
        }
        // 2. 再把目标中为1、而当前不为1的维度求和（保留维度）
        for (axis, &target) in shape.iter().enumerate() {
            if target == 1 && data.shape()[axis] != 1 {
                data = data.sum_axis(Axis(axis)).insert_axis(Axis(axis));
            }
        }
        Ok(Self::from_array(data))
    }
}
