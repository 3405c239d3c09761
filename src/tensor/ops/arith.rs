/*
 * @Author       : 老董
 * @Date         : 2023-08-17 17:24:24
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-16
 * @Description  : 张量的四则运算（逐元素），支持以下情况：
 *                 1. 其中一个操作数为纯数而另一个为张量：则返回的张量形状与该张量相同。
 *                 2. 两个操作数均为张量：支持 NumPy 风格的广播（broadcasting）。
 *                 复合赋值（+=、-=、*=）不改变左侧张量的形状，故右侧须同形或为标量。
 */

use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

/// 两个张量逐元素运算，支持 NumPy 风格广播
///
/// # Panics
/// 如果形状不兼容（无法广播）
fn broadcast_binary(
    tensor_1: &Tensor,
    tensor_2: &Tensor,
    operator: Operator,
    op: impl Fn(&Tensor, &Tensor) -> Tensor,
) -> Tensor {
    assert!(
        tensor_1.can_broadcast_with(tensor_2),
        "{}",
        TensorError::OperatorError {
            operator,
            tensor1_shape: tensor_1.shape().to_vec(),
            tensor2_shape: tensor_2.shape().to_vec(),
        }
    );
    op(tensor_1, tensor_2)
}

/// 为`Tensor`与`&Tensor`的四种组合以及与`f32`的组合实现同一个二元运算
macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $operator:expr, $symbol:tt) => {
        /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓（不）带引用的张量 与（不）带引用的张量↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
        impl<'b> $trait<&'b Tensor> for &Tensor {
            type Output = Tensor;

            fn $method(self, other: &'b Tensor) -> Tensor {
                broadcast_binary(self, other, $operator, |a, b| {
                    Tensor::from_array(&a.data $symbol &b.data)
                })
            }
        }
        impl $trait for Tensor {
            type Output = Tensor;

            fn $method(self, other: Tensor) -> Tensor {
                (&self).$method(&other)
            }
        }
        impl<'a> $trait<&'a Tensor> for Tensor {
            type Output = Tensor;

            fn $method(self, other: &'a Tensor) -> Tensor {
                (&self).$method(other)
            }
        }
        impl $trait<Tensor> for &Tensor {
            type Output = Tensor;

            fn $method(self, other: Tensor) -> Tensor {
                self.$method(&other)
            }
        }
        /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑（不）带引用的张量 与（不）带引用的张量↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

        /*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓（不）带引用的张量 与 f32↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
        impl $trait<f32> for &Tensor {
            type Output = Tensor;

            fn $method(self, scalar: f32) -> Tensor {
                Tensor::from_array(&self.data $symbol scalar)
            }
        }
        impl $trait<f32> for Tensor {
            type Output = Tensor;

            fn $method(self, scalar: f32) -> Tensor {
                Tensor::from_array(self.data $symbol scalar)
            }
        }
        impl $trait<&Tensor> for f32 {
            type Output = Tensor;

            fn $method(self, tensor: &Tensor) -> Tensor {
                Tensor::from_array(self $symbol &tensor.data)
            }
        }
        impl $trait<Tensor> for f32 {
            type Output = Tensor;

            fn $method(self, tensor: Tensor) -> Tensor {
                Tensor::from_array(self $symbol tensor.data)
            }
        }
        /*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑（不）带引用的张量 与 f32↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/
    };
}

impl_binary_op!(Add, add, Operator::Add, +);
impl_binary_op!(Sub, sub, Operator::Sub, -);
impl_binary_op!(Mul, mul, Operator::Mul, *);
impl_binary_op!(Div, div, Operator::Div, /);

impl Neg for Tensor {
    type Output = Self;

    fn neg(self) -> Self {
        Self::from_array(-self.data)
    }
}
impl Neg for &Tensor {
    type Output = Tensor;

    fn neg(self) -> Tensor {
        Tensor::from_array(-&self.data)
    }
}

/// 为复合赋值运算实现`&Tensor`、`Tensor`与`f32`三种右值
macro_rules! impl_assign_op {
    ($trait:ident, $method:ident, $operator:expr, $symbol:tt) => {
        impl<'a> $trait<&'a Tensor> for Tensor {
            fn $method(&mut self, other: &'a Tensor) {
                if self.is_same_shape(other) {
                    self.data $symbol &other.data;
                } else if let Some(number) = other.number() {
                    self.data $symbol number;
                } else {
                    panic!(
                        "{}",
                        TensorError::OperatorError {
                            operator: $operator,
                            tensor1_shape: self.shape().to_vec(),
                            tensor2_shape: other.shape().to_vec(),
                        }
                    )
                }
            }
        }
        impl $trait for Tensor {
            fn $method(&mut self, other: Tensor) {
                self.$method(&other);
            }
        }
        impl $trait<f32> for Tensor {
            fn $method(&mut self, scalar: f32) {
                self.data $symbol scalar;
            }
        }
    };
}

impl_assign_op!(AddAssign, add_assign, Operator::AddAssign, +=);
impl_assign_op!(SubAssign, sub_assign, Operator::SubAssign, -=);
impl_assign_op!(MulAssign, mul_assign, Operator::MulAssign, *=);

impl PartialEq for Tensor {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl From<f32> for Tensor {
    /// 实现 From<f32> trait 用于将`f32`类型转换为形状为`[1, 1]`的张量
    fn from(scalar: f32) -> Self {
        Self::full(scalar, &[1, 1])
    }
}
