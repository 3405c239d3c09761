use crate::errors::TensorError;
use crate::tensor::Tensor;
use approx::assert_abs_diff_eq;

#[test]
fn test_mat_mul() {
    let a = Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
    let b = Tensor::new(&[1.0, 0.0, 0.0, 1.0, 1.0, 1.0], &[3, 2]);
    let c = a.mat_mul(&b).unwrap();
    assert_eq!(c, Tensor::new(&[4.0, 5.0, 10.0, 11.0], &[2, 2]));
}

#[test]
fn test_mat_mul_errors() {
    let a = Tensor::zeros(&[2, 3]);
    assert!(matches!(
        a.mat_mul(&Tensor::zeros(&[2, 3])),
        Err(TensorError::OperatorError { .. })
    ));
    assert_eq!(
        a.mat_mul(&Tensor::zeros(&[3])),
        Err(TensorError::DimensionMismatch {
            expected: 2,
            got: 1
        })
    );
}

#[test]
fn test_transpose() {
    let a = Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
    let t = a.transpose();
    assert_eq!(t.shape(), &[3, 2]);
    assert_eq!(t.to_vec(), vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
}

#[test]
fn test_activations() {
    let x = Tensor::new(&[-1.0, 0.0, 2.0], &[1, 3]);
    assert_eq!(x.relu(), Tensor::new(&[0.0, 0.0, 2.0], &[1, 3]));
    assert_eq!(x.step(), Tensor::new(&[0.0, 0.0, 1.0], &[1, 3]));
    let s = x.sigmoid().to_vec();
    assert_abs_diff_eq!(s[1], 0.5, epsilon = 1e-6);
    assert_abs_diff_eq!(s[2], 0.880_797, epsilon = 1e-5);
    let t = x.tanh().to_vec();
    assert_abs_diff_eq!(t[0], -0.761_594, epsilon = 1e-5);
}

#[test]
fn test_reductions() {
    let a = Tensor::new(&[1.0, 2.0, 3.0, 4.0], &[2, 2]);
    assert_eq!(a.sum(), Tensor::from(10.0));
    assert_eq!(a.mean(), Tensor::from(2.5));
}

#[test]
fn test_sum_to_shape() {
    let grad = Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
    assert_eq!(
        grad.sum_to_shape(&[1, 3]).unwrap(),
        Tensor::new(&[5.0, 7.0, 9.0], &[1, 3])
    );
    assert_eq!(
        grad.sum_to_shape(&[3]).unwrap(),
        Tensor::new(&[5.0, 7.0, 9.0], &[3])
    );
    assert_eq!(grad.sum_to_shape(&[1, 1]).unwrap(), Tensor::new(&[21.0], &[1, 1]));
    assert_eq!(grad.sum_to_shape(&[2, 3]).unwrap(), grad);
    assert_eq!(grad.sum_to_shape(&[2, 2]), Err(TensorError::IncompatibleShape));
}
