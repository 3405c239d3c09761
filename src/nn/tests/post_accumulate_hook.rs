/*
 * @Author       : 老董
 * @Date         : 2026-10-16
 * @Description  : 梯度累积完毕钩子测试
 */

use crate::assert_err;
use crate::nn::{Graph, GraphError, Var, VarActivationOps, VarMatrixOps};
use crate::tensor::Tensor;
use std::cell::RefCell;
use std::rc::Rc;

/// 在`param`上登记一个钩子，记录每次被调用时看到的梯度
fn record_grads(param: &Var) -> Result<Rc<RefCell<Vec<Vec<f32>>>>, GraphError> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let seen_in_hook = Rc::clone(&seen);
    param.register_post_accumulate_grad_hook(move |slot| {
        seen_in_hook
            .borrow_mut()
            .push(slot.grad().map(Tensor::to_vec).unwrap_or_default());
        Ok(())
    })?;
    Ok(seen)
}

#[test]
fn test_hook_fires_once_after_all_contributions() -> Result<(), GraphError> {
    let graph = Graph::new();
    let x = graph.input(&Tensor::new(&[3.0], &[1, 1]))?;
    let w = graph.parameter_from(&Tensor::new(&[2.0], &[1, 1]), "w")?;
    let seen = record_grads(&w)?;

    let loss = (&x.matmul(&w)? + &x.matmul(&w)?).sum()?;
    loss.backward()?;

    // 两条路径的贡献都已累加后才调用，且只调用一次
    assert_eq!(*seen.borrow(), vec![vec![6.0]]);
    Ok(())
}

#[test]
fn test_hook_sees_full_grad_for_squared_param() -> Result<(), GraphError> {
    let graph = Graph::new();
    let w = graph.parameter_from(&Tensor::new(&[2.0], &[1, 1]), "w")?;
    let seen = record_grads(&w)?;

    (&w * &w).sum()?.backward()?;
    assert_eq!(*seen.borrow(), vec![vec![4.0]]);
    Ok(())
}

#[test]
fn test_hook_fires_every_backward() -> Result<(), GraphError> {
    let graph = Graph::new();
    let x = graph.input(&Tensor::new(&[3.0], &[1, 1]))?;
    let w = graph.parameter_from(&Tensor::new(&[2.0], &[1, 1]), "w")?;
    let seen = record_grads(&w)?;

    let loss = x.matmul(&w)?.sum()?;
    loss.backward()?;
    loss.backward()?;
    // 钩子没有释放梯度，第二次看到的是累加后的梯度
    assert_eq!(*seen.borrow(), vec![vec![3.0], vec![6.0]]);
    Ok(())
}

#[test]
fn test_hook_not_fired_for_param_without_grad() -> Result<(), GraphError> {
    let graph = Graph::new();
    let x = graph.input(&Tensor::new(&[3.0], &[1, 1]))?;
    let w = graph.parameter_from(&Tensor::new(&[2.0], &[1, 1]), "w")?;
    let unused = graph.parameter_from(&Tensor::new(&[5.0], &[1, 1]), "unused")?;
    let seen_w = record_grads(&w)?;
    let seen_unused = record_grads(&unused)?;

    x.matmul(&w)?.sum()?.backward()?;

    assert_eq!(seen_w.borrow().len(), 1);
    assert!(seen_unused.borrow().is_empty());
    assert_eq!(unused.grad()?, None);
    Ok(())
}

#[test]
fn test_register_on_non_parameter_errors() -> Result<(), GraphError> {
    let graph = Graph::new();
    let x = graph.input(&Tensor::new(&[3.0], &[1, 1]))?;
    let w = graph.parameter_from(&Tensor::new(&[2.0], &[1, 1]), "w")?;
    let h = x.matmul(&w)?;

    assert_err!(
        x.register_post_accumulate_grad_hook(|_| Ok(())),
        GraphError::InvalidOperation(msg) if msg.contains("只能在参数节点上登记")
    );
    assert_err!(
        h.register_post_accumulate_grad_hook(|_| Ok(())),
        GraphError::InvalidOperation(msg) if msg.contains("只能在参数节点上登记")
    );
    Ok(())
}

#[test]
fn test_removed_hook_stops_firing() -> Result<(), GraphError> {
    let graph = Graph::new();
    let x = graph.input(&Tensor::new(&[3.0], &[1, 1]))?;
    let w = graph.parameter_from(&Tensor::new(&[2.0], &[1, 1]), "w")?;
    let count = Rc::new(RefCell::new(0));
    let count_in_hook = Rc::clone(&count);
    let handle = w.register_post_accumulate_grad_hook(move |_| {
        *count_in_hook.borrow_mut() += 1;
        Ok(())
    })?;
    assert_eq!(handle.node_id(), w.node_id());
    assert_eq!(graph.inner().hook_count(w.node_id()), 1);

    let loss = x.matmul(&w)?.sum()?;
    loss.backward()?;
    assert_eq!(*count.borrow(), 1);

    assert!(handle.remove());
    assert_eq!(graph.inner().hook_count(w.node_id()), 0);
    loss.backward()?;
    assert_eq!(*count.borrow(), 1);
    Ok(())
}

#[test]
fn test_hooks_run_in_registration_order() -> Result<(), GraphError> {
    let graph = Graph::new();
    let w = graph.parameter_from(&Tensor::new(&[2.0], &[1, 1]), "w")?;
    let order = Rc::new(RefCell::new(Vec::new()));
    for tag in 1..=3 {
        let order = Rc::clone(&order);
        w.register_post_accumulate_grad_hook(move |_| {
            order.borrow_mut().push(tag);
            Ok(())
        })?;
    }

    w.sum()?.backward()?;
    assert_eq!(*order.borrow(), vec![1, 2, 3]);
    Ok(())
}

#[test]
fn test_hook_error_aborts_backward() -> Result<(), GraphError> {
    let graph = Graph::new();
    let x = graph.input(&Tensor::new(&[3.0], &[1, 1]))?;
    let w = graph.parameter_from(&Tensor::new(&[2.0], &[1, 1]), "w")?;
    w.register_post_accumulate_grad_hook(|_| {
        Err(GraphError::ComputationError("更新失败".to_string()))
    })?;
    let h = x.matmul(&w)?;
    let loss = h.sum()?;

    let w_id = w.node_id();
    assert_err!(
        loss.backward(),
        GraphError::HookFailed { node, message } if *node == w_id && message == "更新失败"
    );
    // 中止后中间结果同样被清理
    assert_eq!(h.grad()?, None);
    assert_eq!(h.value()?, None);
    Ok(())
}

#[test]
fn test_hook_updates_param_and_clears_grad() -> Result<(), GraphError> {
    let graph = Graph::new();
    let x = graph.input(&Tensor::new(&[3.0], &[1, 1]))?;
    let w = graph.parameter_from(&Tensor::new(&[2.0], &[1, 1]), "w")?;
    w.register_post_accumulate_grad_hook(|slot| {
        let update = slot.grad().map(|grad| grad * 0.1);
        if let Some(update) = update {
            *slot.value_mut() -= &update;
        }
        slot.clear_grad();
        Ok(())
    })?;

    x.matmul(&w)?.sum()?.backward()?;

    assert_eq!(w.grad()?, None);
    let value = w.value()?.and_then(|v| v.number()).unwrap_or_default();
    approx::assert_abs_diff_eq!(value, 1.7, epsilon = 1e-6);
    Ok(())
}

#[test]
fn test_hook_updates_do_not_affect_other_grads() -> Result<(), GraphError> {
    let graph = Graph::new();
    let x = graph.input(&Tensor::new(&[1.0], &[1, 1]))?;
    let w1 = graph.parameter_from(&Tensor::new(&[2.0], &[1, 1]), "w1")?;
    let w2 = graph.parameter_from(&Tensor::new(&[3.0], &[1, 1]), "w2")?;
    let seen = Rc::new(RefCell::new(Vec::new()));
    for param in [&w1, &w2] {
        let seen = Rc::clone(&seen);
        param.register_post_accumulate_grad_hook(move |slot| {
            let grad = slot.grad().and_then(Tensor::number).unwrap_or_default();
            seen.borrow_mut().push((slot.name().to_string(), grad));
            // 钩子里把参数改掉，不应影响其它参数的梯度
            slot.set_value(Tensor::zeros(&[1, 1]))?;
            slot.clear_grad();
            Ok(())
        })?;
    }

    x.matmul(&w1)?.matmul(&w2)?.relu()?.sum()?.backward()?;

    let mut seen = seen.borrow().clone();
    seen.sort_by(|a, b| a.0.cmp(&b.0));
    // d/dw1 = x * w2，d/dw2 = x * w1
    assert_eq!(seen, vec![("w1".to_string(), 3.0), ("w2".to_string(), 2.0)]);
    assert_eq!(w1.value()?, Some(Tensor::zeros(&[1, 1])));
    Ok(())
}

#[test]
fn test_graph_access_inside_hook_is_error() -> Result<(), GraphError> {
    let graph = Graph::new();
    let x = graph.input(&Tensor::new(&[1.0], &[1, 1]))?;
    let w1 = graph.parameter_from(&Tensor::new(&[2.0], &[1, 1]), "w1")?;
    let w2 = graph.parameter_from(&Tensor::new(&[3.0], &[1, 1]), "w2")?;
    let other = w2.clone();
    w1.register_post_accumulate_grad_hook(move |_| other.value().map(|_| ()))?;
    let loss = x.matmul(&w1)?.matmul(&w2)?.sum()?;

    assert_err!(
        loss.backward(),
        GraphError::HookFailed { message, .. } if message == "钩子内不能访问计算图"
    );
    // 反向传播结束后图可以正常访问
    assert_eq!(w2.value()?, Some(Tensor::new(&[3.0], &[1, 1])));
    Ok(())
}

#[test]
fn test_remove_inside_hook_returns_false() -> Result<(), GraphError> {
    let graph = Graph::new();
    let w = graph.parameter_from(&Tensor::new(&[2.0], &[1, 1]), "w")?;
    let handle = w.register_post_accumulate_grad_hook(|_| Ok(()))?;
    let target = Rc::new(RefCell::new(Some(handle)));
    let removed = Rc::new(RefCell::new(Vec::new()));
    let (target_in_hook, removed_in_hook) = (Rc::clone(&target), Rc::clone(&removed));
    w.register_post_accumulate_grad_hook(move |_| {
        if let Some(handle) = target_in_hook.borrow_mut().take() {
            removed_in_hook.borrow_mut().push(handle.remove());
        }
        Ok(())
    })?;

    w.sum()?.backward()?;
    assert_eq!(*removed.borrow(), vec![false]);
    assert_eq!(graph.inner().hook_count(w.node_id()), 2);
    Ok(())
}
