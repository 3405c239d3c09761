/*
 * @Author       : 老董
 * @Date         : 2026-01-27
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-16
 * @Description  : GraphInner 计算图的底层实现
 *
 * 各 impl 块分散在子模块中：
 * - core.rs: 基础操作 + forward
 * - backward.rs: 反向传播（含钩子调度）
 * - hooks.rs: 钩子的登记与注销
 * - node_builders.rs: new_*_node
 */

mod backward;
mod core;
mod hooks;
mod node_builders;

use super::hooks::{HookId, PostAccumulateGradHook};
use crate::nn::NodeId;
use crate::nn::nodes::NodeHandle;
use rand::rngs::StdRng;
use std::collections::HashMap;

/// 图的完整定义（核心实现）
///
/// 用户通常通过 `Graph` 句柄使用此结构。
pub struct GraphInner {
    pub(in crate::nn::graph) name: String,
    pub(in crate::nn::graph) nodes: HashMap<NodeId, NodeHandle>,
    /// 正向边：parent_id -> child_ids（父节点指向子节点）
    pub(in crate::nn::graph) forward_edges: HashMap<NodeId, Vec<NodeId>>,
    /// 反向边：child_id -> parent_ids（子节点指向父节点，按参数顺序，可重复）
    pub(in crate::nn::graph) backward_edges: HashMap<NodeId, Vec<NodeId>>,
    /// 已完成的反向传播次数
    pub(in crate::nn::graph) last_backward_pass_id: u64,
    pub(in crate::nn::graph) next_id: u64,
    /// 图级别的随机数生成器（用于参数初始化等）
    pub(in crate::nn::graph) rng: StdRng,
    /// 参数节点上登记的梯度累积完毕钩子（按登记顺序调用）
    pub(in crate::nn::graph) hooks: HashMap<NodeId, Vec<(HookId, PostAccumulateGradHook)>>,
    pub(in crate::nn::graph) next_hook_id: u64,
}

impl Default for GraphInner {
    fn default() -> Self {
        Self::new()
    }
}
