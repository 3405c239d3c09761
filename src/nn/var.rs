/*
 * @Author       : 老董
 * @Date         : 2026-01-08
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-16
 * @Description  : Smart Var - 智能变量句柄，支持算子重载和链式调用
 */

use super::graph::{GraphInner, HookHandle, ParamSlot};
use super::{GraphError, NodeId};
use crate::tensor::Tensor;
use rand::Rng;
use std::cell::{Ref, RefCell, RefMut};
use std::ops::{Add, Mul, Sub};
use std::rc::Rc;

// ==================== Init 枚举 ====================

/// 参数初始化策略
#[derive(Debug, Clone)]
pub enum Init {
    /// 常数初始化
    Constant(f32),
    /// 全零
    Zeros,
    /// 全一
    Ones,
    /// 正态分布（使用 Graph 的 RNG）
    Normal { mean: f32, std: f32 },
    /// Kaiming/He 初始化（适用于 `ReLU`）
    Kaiming,
    /// Xavier/Glorot 初始化（适用于 Sigmoid/Tanh）
    Xavier,
}

impl Init {
    /// 生成初始化后的 Tensor（使用指定的 RNG）
    pub fn generate_with_rng<R: Rng + ?Sized>(&self, shape: &[usize], rng: &mut R) -> Tensor {
        match self {
            Self::Constant(v) => Tensor::full(*v, shape),
            Self::Zeros => Tensor::zeros(shape),
            Self::Ones => Tensor::ones(shape),
            Self::Normal { mean, std } => Tensor::normal_with_rng(*mean, *std, shape, rng),
            Self::Kaiming => {
                let fan_in = shape[0];
                let std = (2.0 / fan_in as f32).sqrt();
                Tensor::normal_with_rng(0.0, std, shape, rng)
            }
            Self::Xavier => {
                let (fan_in, fan_out) = (shape[0], shape.get(1).copied().unwrap_or(1));
                let std = (2.0 / (fan_in + fan_out) as f32).sqrt();
                Tensor::normal_with_rng(0.0, std, shape, rng)
            }
        }
    }
}

// ==================== Var 结构 ====================

/// 智能变量句柄 - 携带图引用，支持算子重载和链式调用
///
/// # 使用示例
/// ```ignore
/// let graph = Graph::new();
/// let x = graph.input(&images)?;
/// let h = x.matmul(&w)?.relu()?;
/// let loss = (&h + &b).sum()?;
/// loss.backward()?;
/// ```
#[derive(Clone)]
pub struct Var {
    id: NodeId,
    graph: Rc<RefCell<GraphInner>>,
}

impl std::fmt::Debug for Var {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Var").field("id", &self.id).finish()
    }
}

impl Var {
    /// 创建新的 Var（内部使用）
    pub(crate) const fn new(id: NodeId, graph: Rc<RefCell<GraphInner>>) -> Self {
        Self { id, graph }
    }

    /// 获取节点 ID
    pub const fn node_id(&self) -> NodeId {
        self.id
    }

    /// 借用计算图。反向传播期间（即钩子内部）图已被可变借用，此时返回错误而非 panic
    fn inner(&self) -> Result<Ref<'_, GraphInner>, GraphError> {
        self.graph.try_borrow().map_err(|_| graph_busy())
    }

    fn inner_mut(&self) -> Result<RefMut<'_, GraphInner>, GraphError> {
        self.graph.try_borrow_mut().map_err(|_| graph_busy())
    }

    /// 检查两个 Var 是否来自同一个 Graph
    pub fn same_graph(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.graph, &other.graph)
    }

    /// 获取 Var 所属的 Graph handle
    pub fn get_graph(&self) -> super::graph::Graph {
        super::graph::Graph::from_rc(Rc::clone(&self.graph))
    }

    /// 节点名称
    pub fn name(&self) -> Result<String, GraphError> {
        Ok(self.inner()?.get_node_name(self.id)?.to_string())
    }

    /// 节点值的形状（创建节点时即已确定）
    pub fn value_expected_shape(&self) -> Result<Vec<usize>, GraphError> {
        Ok(self
            .inner()?
            .get_node_value_expected_shape(self.id)?
            .to_vec())
    }

    pub fn is_parameter(&self) -> Result<bool, GraphError> {
        self.inner()?.is_parameter(self.id)
    }

    /// 在本节点与另一个 Var 之间建立二元算子节点
    pub(crate) fn binary_op(
        &self,
        other: &Self,
        op_name: &str,
        build: impl FnOnce(&mut GraphInner, NodeId, NodeId) -> Result<NodeId, GraphError>,
    ) -> Result<Self, GraphError> {
        if !self.same_graph(other) {
            return Err(GraphError::InvalidOperation(format!(
                "不能对来自不同 Graph 的 Var 进行{op_name}"
            )));
        }
        let id = build(&mut *self.inner_mut()?, self.id, other.id)?;
        Ok(Self::new(id, Rc::clone(&self.graph)))
    }

    /// 以本节点为唯一父节点建立一元算子节点
    pub(crate) fn unary_op(
        &self,
        build: impl FnOnce(&mut GraphInner, NodeId) -> Result<NodeId, GraphError>,
    ) -> Result<Self, GraphError> {
        let id = build(&mut *self.inner_mut()?, self.id)?;
        Ok(Self::new(id, Rc::clone(&self.graph)))
    }

    // ==================== 执行 ====================

    /// 前向传播
    pub fn forward(&self) -> Result<(), GraphError> {
        self.inner_mut()?.forward(self.id)
    }

    /// 反向传播（ensure-forward 语义：先执行前向传播，再反向传播并释放中间结果）
    ///
    /// # 返回值
    /// 返回 loss 的标量值
    pub fn backward(&self) -> Result<f32, GraphError> {
        self.backward_ex(false)
    }

    /// 反向传播，`retain_graph`为 true 时保留中间节点的值
    pub fn backward_ex(&self, retain_graph: bool) -> Result<f32, GraphError> {
        let mut g = self.inner_mut()?;
        g.forward(self.id)?;
        g.backward_ex(self.id, retain_graph)
    }

    // ==================== 值访问和设置 ====================

    /// 获取节点的值（克隆的 Tensor）
    pub fn value(&self) -> Result<Option<Tensor>, GraphError> {
        Ok(self.inner()?.get_node_value(self.id)?.cloned())
    }

    /// 设置节点的值（仅限输入和参数）
    pub fn set_value(&self, value: &Tensor) -> Result<(), GraphError> {
        self.inner_mut()?.set_node_value(self.id, Some(value))
    }

    /// 获取标量值（假设是 1x1 Tensor）
    pub fn item(&self) -> Result<f32, GraphError> {
        let val = self.value()?.ok_or_else(|| {
            GraphError::ComputationError(format!("节点{}没有值", self.id))
        })?;
        val.number()
            .ok_or_else(|| GraphError::InvalidOperation("Tensor 不是标量".to_string()))
    }

    /// 获取节点的梯度
    pub fn grad(&self) -> Result<Option<Tensor>, GraphError> {
        Ok(self.inner()?.get_node_grad(self.id)?.cloned())
    }

    // ==================== 钩子 ====================

    /// 登记梯度累积完毕钩子：每次反向传播中，本参数的梯度累积完毕后调用一次。
    /// 只能在参数上登记；钩子内不能再访问计算图
    pub fn register_post_accumulate_grad_hook<F>(&self, hook: F) -> Result<HookHandle, GraphError>
    where
        F: FnMut(&mut ParamSlot<'_>) -> Result<(), GraphError> + 'static,
    {
        let hook_id = self
            .inner_mut()?
            .register_post_accumulate_grad_hook(self.id, Box::new(hook))?;
        Ok(HookHandle::new(Rc::downgrade(&self.graph), self.id, hook_id))
    }

    // ==================== 安全版本（返回 Result）====================

    /// 安全的加法（返回 Result），支持广播
    pub fn try_add(&self, other: &Self) -> Result<Self, GraphError> {
        self.binary_op(other, "加法", |g, a, b| g.new_add_node(a, b, None))
    }

    /// 安全的减法（返回 Result），支持广播
    pub fn try_sub(&self, other: &Self) -> Result<Self, GraphError> {
        self.binary_op(other, "减法", |g, a, b| g.new_subtract_node(a, b, None))
    }

    /// 安全的元素级乘法（返回 Result），支持广播
    pub fn try_mul(&self, other: &Self) -> Result<Self, GraphError> {
        self.binary_op(other, "乘法", |g, a, b| g.new_multiply_node(a, b, None))
    }
}

fn graph_busy() -> GraphError {
    GraphError::InvalidOperation("钩子内不能访问计算图".to_string())
}

// ==================== 算子重载 ====================

macro_rules! impl_var_op {
    ($trait:ident, $method:ident, $try_method:ident, $msg:literal) => {
        impl $trait for &Var {
            type Output = Var;

            fn $method(self, other: &Var) -> Var {
                self.$try_method(other).expect($msg)
            }
        }

        impl $trait for Var {
            type Output = Self;

            fn $method(self, other: Self) -> Self {
                (&self).$method(&other)
            }
        }

        impl $trait<Var> for &Var {
            type Output = Var;

            fn $method(self, other: Var) -> Var {
                self.$method(&other)
            }
        }

        impl $trait<&Self> for Var {
            type Output = Self;

            fn $method(self, other: &Self) -> Self {
                (&self).$method(other)
            }
        }
    };
}

impl_var_op!(Add, add, try_add, "Var 加法失败");
impl_var_op!(Sub, sub, try_sub, "Var 减法失败");
impl_var_op!(Mul, mul, try_mul, "Var 乘法失败");

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_init_constant_and_zeros() {
        let mut rng = StdRng::seed_from_u64(0);
        let tensor = Init::Constant(0.5).generate_with_rng(&[2, 3], &mut rng);
        assert_eq!(tensor.shape(), &[2, 3]);
        assert!(tensor.to_vec().iter().all(|&x| x == 0.5));
        let tensor = Init::Zeros.generate_with_rng(&[2, 3], &mut rng);
        assert!(tensor.to_vec().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_init_kaiming() {
        let mut rng = StdRng::seed_from_u64(42);
        let tensor = Init::Kaiming.generate_with_rng(&[100, 50], &mut rng);
        assert_eq!(tensor.shape(), &[100, 50]);
        // Kaiming: std = sqrt(2/fan_in) = sqrt(2/100) ≈ 0.1414
        let expected_std = (2.0 / 100.0_f32).sqrt();
        let data = tensor.to_vec();
        let actual_std = (data.iter().map(|x| x * x).sum::<f32>() / data.len() as f32).sqrt();
        assert!((actual_std - expected_std).abs() < 0.05);
    }

    #[test]
    fn test_init_xavier() {
        let mut rng = StdRng::seed_from_u64(42);
        let tensor = Init::Xavier.generate_with_rng(&[100, 50], &mut rng);
        // Xavier: std = sqrt(2/(fan_in + fan_out)) = sqrt(2/150) ≈ 0.1155
        let expected_std = (2.0 / 150.0_f32).sqrt();
        let data = tensor.to_vec();
        let actual_std = (data.iter().map(|x| x * x).sum::<f32>() / data.len() as f32).sqrt();
        assert!((actual_std - expected_std).abs() < 0.05);
    }
}
