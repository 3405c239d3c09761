/*
 * @Author       : 老董
 * @Date         : 2024-01-31 20:23:53
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-16
 * @Description  : 负责神经网络（neural network）的构建
 */

mod graph;
pub mod layer;
mod module;
mod nodes;
pub mod optimizer;
mod var;
mod var_ops;

pub use graph::{
    Graph, GraphError, GraphInner, HookHandle, HookId, ParamSlot, PostAccumulateGradHook,
};
pub use layer::Linear;
pub use module::Module;
pub use nodes::NodeId;
pub use optimizer::{
    Adam, AdamConfig, AdamRule, Optimizer, OptimizerConfig, OptimizerDict, SGD, SgdConfig,
    SgdRule, UpdateRule,
};
pub use var::{Init, Var};
pub use var_ops::{VarActivationOps, VarLossOps, VarMatrixOps};

#[cfg(test)]
mod tests;
