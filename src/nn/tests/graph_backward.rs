/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 反向传播测试：梯度数值、梯度累加、中间结果的释放
 */

use crate::assert_err;
use crate::nn::{Graph, GraphError, VarActivationOps, VarLossOps, VarMatrixOps};
use crate::tensor::Tensor;

#[test]
fn test_backward_linear_grads() -> Result<(), GraphError> {
    let graph = Graph::new();
    let x = graph.input(&Tensor::new(&[1.0, 2.0], &[1, 2]))?;
    let w = graph.parameter_from(&Tensor::new(&[3.0, 4.0], &[2, 1]), "w")?;
    let b = graph.parameter_from(&Tensor::new(&[0.5], &[1, 1]), "b")?;

    let loss = (&x.matmul(&w)? + &b).sum()?;
    let loss_value = loss.backward()?;

    // y = 1*3 + 2*4 + 0.5
    assert_eq!(loss_value, 11.5);
    // dy/dw = x^T，dy/db = 1
    assert_eq!(w.grad()?, Some(Tensor::new(&[1.0, 2.0], &[2, 1])));
    assert_eq!(b.grad()?, Some(Tensor::new(&[1.0], &[1, 1])));
    Ok(())
}

#[test]
fn test_backward_accumulates_across_calls() -> Result<(), GraphError> {
    let graph = Graph::new();
    let x = graph.input(&Tensor::new(&[3.0], &[1, 1]))?;
    let w = graph.parameter_from(&Tensor::new(&[2.0], &[1, 1]), "w")?;
    let loss = x.matmul(&w)?.sum()?;

    loss.backward()?;
    assert_eq!(w.grad()?, Some(Tensor::new(&[3.0], &[1, 1])));
    // 参数梯度不会自动清零
    loss.backward()?;
    assert_eq!(w.grad()?, Some(Tensor::new(&[6.0], &[1, 1])));

    graph.zero_grad();
    assert_eq!(w.grad()?, None);
    Ok(())
}

#[test]
fn test_shared_parameter_grads_are_summed() -> Result<(), GraphError> {
    let graph = Graph::new();
    let x = graph.input(&Tensor::new(&[3.0], &[1, 1]))?;
    let w = graph.parameter_from(&Tensor::new(&[2.0], &[1, 1]), "w")?;

    let loss = (&x.matmul(&w)? + &x.matmul(&w)?).sum()?;
    assert_eq!(loss.backward()?, 12.0);
    assert_eq!(w.grad()?, Some(Tensor::new(&[6.0], &[1, 1])));

    // 同一个父节点被引用两次：d(w*w)/dw = 2w
    graph.zero_grad();
    let square = (&w * &w).sum()?;
    assert_eq!(square.backward()?, 4.0);
    assert_eq!(w.grad()?, Some(Tensor::new(&[4.0], &[1, 1])));
    Ok(())
}

#[test]
fn test_backward_releases_intermediate_results() -> Result<(), GraphError> {
    let graph = Graph::new();
    let x = graph.input(&Tensor::new(&[3.0], &[1, 1]))?;
    let w = graph.parameter_from(&Tensor::new(&[2.0], &[1, 1]), "w")?;
    let h = x.matmul(&w)?;
    let loss = h.sum()?;

    loss.backward()?;
    assert_eq!(h.value()?, None);
    assert_eq!(h.grad()?, None);
    // 叶子节点的值保留
    assert!(x.value()?.is_some());
    assert!(w.value()?.is_some());

    loss.backward_ex(true)?;
    assert_eq!(h.value()?, Some(Tensor::new(&[6.0], &[1, 1])));
    // 中间节点的梯度无论如何都会释放
    assert_eq!(h.grad()?, None);
    Ok(())
}

#[test]
fn test_backward_through_activations() -> Result<(), GraphError> {
    let graph = Graph::new();
    let p = graph.parameter_from(&Tensor::new(&[-1.0, 2.0], &[1, 2]), "p")?;

    let loss = p.relu()?.sum()?;
    assert_eq!(loss.backward()?, 2.0);
    assert_eq!(p.grad()?, Some(Tensor::new(&[0.0, 1.0], &[1, 2])));

    graph.zero_grad();
    let loss = p.tanh()?.sum()?;
    loss.backward()?;
    let grad = p.grad()?.map(|g| g.to_vec()).unwrap_or_default();
    let expected: Vec<f32> = [-1.0_f32, 2.0].iter().map(|x| 1.0 - x.tanh().powi(2)).collect();
    for (g, e) in grad.iter().zip(&expected) {
        approx::assert_abs_diff_eq!(*g, *e, epsilon = 1e-6);
    }
    Ok(())
}

#[test]
fn test_mse_loss_grad() -> Result<(), GraphError> {
    let graph = Graph::new();
    let p = graph.parameter_from(&Tensor::new(&[1.0, 3.0], &[1, 2]), "p")?;
    let t = graph.input(&Tensor::new(&[0.0, 1.0], &[1, 2]))?;

    let loss = p.mse_loss(&t)?;
    // ((1-0)² + (3-1)²) / 2
    assert_eq!(loss.backward()?, 2.5);
    // 2(p-t)/N
    assert_eq!(p.grad()?, Some(Tensor::new(&[1.0, 2.0], &[1, 2])));
    Ok(())
}

#[test]
fn test_backward_errors() -> Result<(), GraphError> {
    let graph = Graph::new();
    let x = graph.input(&Tensor::new(&[3.0], &[1, 1]))?;
    let w = graph.parameter_from(&Tensor::new(&[1.0, 2.0], &[1, 2]), "w")?;

    // 损失不依赖任何参数
    assert_err!(
        x.sum()?.backward(),
        GraphError::InvalidOperation(msg) if msg.contains("不依赖任何参数")
    );
    // 损失不是标量
    assert_err!(
        x.matmul(&w)?.backward(),
        GraphError::InvalidOperation(msg) if msg.contains("标量")
    );
    // 输入节点没有梯度
    assert_err!(
        x.grad(),
        GraphError::InvalidOperation(msg) if msg.contains("不应该有梯度")
    );
    Ok(())
}
