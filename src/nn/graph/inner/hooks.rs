/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : GraphInner 钩子的登记与注销
 */

use super::super::error::GraphError;
use super::super::hooks::{HookId, PostAccumulateGradHook};
use super::GraphInner;
use crate::nn::NodeId;

impl GraphInner {
    /// 在参数节点上登记一个梯度累积完毕钩子。非参数节点返回错误
    pub fn register_post_accumulate_grad_hook(
        &mut self,
        node_id: NodeId,
        hook: PostAccumulateGradHook,
    ) -> Result<HookId, GraphError> {
        let node = self.get_node(node_id)?;
        if !node.is_parameter() {
            return Err(GraphError::InvalidOperation(format!(
                "只能在参数节点上登记梯度钩子，{node}不是参数"
            )));
        }
        self.next_hook_id += 1;
        let hook_id = HookId(self.next_hook_id);
        self.hooks.entry(node_id).or_default().push((hook_id, hook));
        Ok(hook_id)
    }

    /// 注销钩子，返回是否确实移除了
    pub fn remove_hook(&mut self, node_id: NodeId, hook_id: HookId) -> bool {
        let Some(hooks) = self.hooks.get_mut(&node_id) else {
            return false;
        };
        let before = hooks.len();
        hooks.retain(|(id, _)| *id != hook_id);
        let removed = hooks.len() != before;
        if hooks.is_empty() {
            self.hooks.remove(&node_id);
        }
        removed
    }

    /// 参数节点上当前登记的钩子个数
    pub fn hook_count(&self, node_id: NodeId) -> usize {
        self.hooks.get(&node_id).map_or(0, Vec::len)
    }
}
