/*
 * @Author       : 老董
 * @Date         : 2026-01-27
 * @LastEditors  : 老董
 * @LastEditTime : 2026-10-16
 * @Description  : GraphInner 节点构建方法（new_*_node）
 */

use super::super::error::GraphError;
use super::GraphInner;
use crate::nn::NodeId;
use crate::nn::nodes::NodeHandle;
use crate::nn::nodes::raw_node::{
    Add, Input, MSELoss, MatMul, Multiply, NodeType, Parameter, ReLU, Sigmoid, Subtract, Sum,
    Tanh,
};

impl GraphInner {
    /// 添加节点到列表
    pub(in crate::nn::graph) fn add_node_to_list(
        &mut self,
        mut node_handle: NodeHandle,
        name: Option<&str>,
        node_type: &str,
        parents: &[NodeId],
    ) -> Result<NodeId, GraphError> {
        let node_name = self.generate_valid_new_node_name(name.unwrap_or(""), node_type)?;
        let node_id = self.generate_valid_node_id();

        for &parent_id in parents {
            let children = self.forward_edges.entry(parent_id).or_default();
            if !children.contains(&node_id) {
                children.push(node_id);
            }
        }
        self.backward_edges
            .entry(node_id)
            .or_default()
            .extend(parents);

        node_handle.bind_id_and_name(node_id, &node_name);
        self.nodes.insert(node_id, node_handle);
        Ok(node_id)
    }

    /// 校验父节点存在，据其形状构建算子节点并加入图中
    fn new_op_node<T: Into<NodeType>>(
        &mut self,
        parents: &[NodeId],
        name: Option<&str>,
        node_type: &str,
        build: impl FnOnce(&[&[usize]]) -> Result<T, GraphError>,
    ) -> Result<NodeId, GraphError> {
        let shapes = parents
            .iter()
            .map(|&id| Ok(self.get_node(id)?.value_expected_shape().to_vec()))
            .collect::<Result<Vec<_>, GraphError>>()?;
        let shape_refs: Vec<&[usize]> = shapes.iter().map(Vec::as_slice).collect();
        let node = NodeHandle::new(build(&shape_refs)?);
        self.add_node_to_list(node, name, node_type, parents)
    }

    /// 创建输入节点（值需另行通过 set_node_value 设置）
    pub fn new_input_node(
        &mut self,
        shape: &[usize],
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let node = NodeHandle::new(Input::new(shape)?);
        self.add_node_to_list(node, name, "input", &[])
    }

    /// 创建参数节点（值需另行通过 set_node_value 设置）
    pub fn new_parameter_node(
        &mut self,
        shape: &[usize],
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let node = NodeHandle::new(Parameter::new(shape)?);
        self.add_node_to_list(node, name, "parameter", &[])
    }

    pub fn new_add_node(
        &mut self,
        a: NodeId,
        b: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.new_op_node(&[a, b], name, "add", Add::new)
    }

    pub fn new_subtract_node(
        &mut self,
        a: NodeId,
        b: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.new_op_node(&[a, b], name, "subtract", Subtract::new)
    }

    pub fn new_multiply_node(
        &mut self,
        a: NodeId,
        b: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.new_op_node(&[a, b], name, "multiply", Multiply::new)
    }

    pub fn new_mat_mul_node(
        &mut self,
        a: NodeId,
        b: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.new_op_node(&[a, b], name, "mat_mul", MatMul::new)
    }

    pub fn new_sigmoid_node(
        &mut self,
        x: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.new_op_node(&[x], name, "sigmoid", Sigmoid::new)
    }

    pub fn new_tanh_node(&mut self, x: NodeId, name: Option<&str>) -> Result<NodeId, GraphError> {
        self.new_op_node(&[x], name, "tanh", Tanh::new)
    }

    pub fn new_relu_node(&mut self, x: NodeId, name: Option<&str>) -> Result<NodeId, GraphError> {
        self.new_op_node(&[x], name, "relu", ReLU::new)
    }

    pub fn new_sum_node(&mut self, x: NodeId, name: Option<&str>) -> Result<NodeId, GraphError> {
        self.new_op_node(&[x], name, "sum", Sum::new)
    }

    pub fn new_mse_loss_node(
        &mut self,
        input: NodeId,
        target: NodeId,
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        self.new_op_node(&[input, target], name, "mse_loss", MSELoss::new)
    }
}
