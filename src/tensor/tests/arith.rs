use crate::tensor::Tensor;

#[test]
fn test_add_sub_mul_div_same_shape() {
    let a = Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
    let b = Tensor::new(&[4.0, 3.0, 2.0, 1.0], &[2, 2]);
    assert_eq!(&a + &b, Tensor::full(5.0, &[2, 2]));
    assert_eq!(&a - &b, Tensor::new(&[-3.0, -1.0, 1.0, 3.0], &[2, 2]));
    assert_eq!(&a * &b, Tensor::new(&[4.0, 6.0, 6.0, 4.0], &[2, 2]));
    assert_eq!(&a / &b, Tensor::new(&[0.25, 2.0 / 3.0, 1.5, 4.0], &[2, 2]));
    // 所有权版本结果一致
    assert_eq!(a.clone() + b.clone(), &a + &b);
}

#[test]
fn test_broadcast_add() {
    let a = Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
    let bias = Tensor::new(&[10.0, 20.0, 30.0], &[1, 3]);
    assert_eq!(
        &a + &bias,
        Tensor::new(&[11.0, 22.0, 33.0, 14.0, 25.0, 36.0], &[2, 3])
    );
}

#[test]
#[should_panic(expected = "形状不一致，故无法相加")]
fn test_add_incompatible_shapes_panics() {
    let a = Tensor::zeros(&[2, 3]);
    let b = Tensor::zeros(&[3, 2]);
    let _ = &a + &b;
}

#[test]
fn test_scalar_ops() {
    let a = Tensor::new(&[1.0, 2.0], &[1, 2]);
    assert_eq!(&a * 2.0, Tensor::new(&[2.0, 4.0], &[1, 2]));
    assert_eq!(1.0 - &a, Tensor::new(&[0.0, -1.0], &[1, 2]));
    assert_eq!(&a + 0.5, Tensor::new(&[1.5, 2.5], &[1, 2]));
    assert_eq!(-&a, Tensor::new(&[-1.0, -2.0], &[1, 2]));
}

#[test]
fn test_assign_ops() {
    let mut a = Tensor::new(&[1.0, 2.0], &[1, 2]);
    a += &Tensor::new(&[1.0, 1.0], &[1, 2]);
    assert_eq!(a, Tensor::new(&[2.0, 3.0], &[1, 2]));
    a *= 3.0;
    assert_eq!(a, Tensor::new(&[6.0, 9.0], &[1, 2]));
    a -= Tensor::from(1.0);
    assert_eq!(a, Tensor::new(&[5.0, 8.0], &[1, 2]));
}

#[test]
#[should_panic(expected = "形状不一致，故无法自相减")]
fn test_assign_incompatible_shapes_panics() {
    let mut a = Tensor::zeros(&[2, 2]);
    a -= &Tensor::zeros(&[1, 2]);
}
