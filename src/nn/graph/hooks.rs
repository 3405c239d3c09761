/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 参数梯度累积完毕后的钩子（post-accumulate-grad hook）
 *
 * 反向传播中，某个参数的全部下游节点都把梯度贡献累加到它身上之后，
 * 该参数上登记的钩子会被依次调用一次。钩子只能看到这一个参数（`ParamSlot`），
 * 不能在钩子里再去访问计算图（此时图正处于可变借用中），通过`Var`访问会返回错误。
 */

use super::GraphError;
use super::inner::GraphInner;
use crate::memory::Tracked;
use crate::nn::NodeId;
use crate::tensor::Tensor;
use std::cell::RefCell;
use std::rc::Weak;

/// 钩子在所属参数内的编号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HookId(pub(crate) u64);

/// 钩子的类型：拿到参数的可变视图，出错则中止本次反向传播
pub type PostAccumulateGradHook = Box<dyn FnMut(&mut ParamSlot<'_>) -> Result<(), GraphError>>;

/// 单个参数的可变视图：值与梯度
pub struct ParamSlot<'a> {
    id: NodeId,
    name: &'a str,
    value: &'a mut Tracked,
    grad: &'a mut Option<Tracked>,
}

impl<'a> ParamSlot<'a> {
    pub(crate) const fn new(
        id: NodeId,
        name: &'a str,
        value: &'a mut Tracked,
        grad: &'a mut Option<Tracked>,
    ) -> Self {
        Self {
            id,
            name,
            value,
            grad,
        }
    }

    pub const fn id(&self) -> NodeId {
        self.id
    }

    pub const fn name(&self) -> &str {
        self.name
    }

    pub fn value(&self) -> &Tensor {
        self.value.tensor()
    }

    pub fn grad(&self) -> Option<&Tensor> {
        self.grad.as_ref().map(Tracked::tensor)
    }

    pub const fn has_grad(&self) -> bool {
        self.grad.is_some()
    }

    /// 原地修改参数值（不可改变形状）
    pub fn value_mut(&mut self) -> &mut Tensor {
        self.value.tensor_mut()
    }

    /// 整体替换参数值，形状必须不变
    pub fn set_value(&mut self, value: Tensor) -> Result<(), GraphError> {
        if value.shape() != self.value.shape() {
            return Err(GraphError::ShapeMismatch {
                expected: self.value.shape().to_vec(),
                got: value.shape().to_vec(),
                message: format!("参数{}的新值形状与原值不一致", self.name),
            });
        }
        self.value.replace(value, self.name);
        Ok(())
    }

    /// 释放梯度（置为 None），对应 PyTorch 的 `param.grad = None`
    pub fn clear_grad(&mut self) {
        *self.grad = None;
    }
}

/// 钩子句柄，可用于注销钩子。句柄只弱引用计算图，不会延长图的生命周期
#[derive(Debug)]
pub struct HookHandle {
    graph: Weak<RefCell<GraphInner>>,
    node: NodeId,
    id: HookId,
}

impl HookHandle {
    pub(crate) const fn new(graph: Weak<RefCell<GraphInner>>, node: NodeId, id: HookId) -> Self {
        Self { graph, node, id }
    }

    pub const fn node_id(&self) -> NodeId {
        self.node
    }

    pub const fn hook_id(&self) -> HookId {
        self.id
    }

    /// 注销钩子。图已被释放、钩子已注销，或在反向传播过程中（即钩子内部）调用时返回 false
    pub fn remove(self) -> bool {
        self.graph.upgrade().is_some_and(|graph| {
            graph
                .try_borrow_mut()
                .is_ok_and(|mut g| g.remove_hook(self.node, self.id))
        })
    }
}
