use crate::errors::{ComparisonOperator, Operator, TensorError};
use crate::tensor::Tensor;
use rand::SeedableRng;
use rand::rngs::StdRng;

mod arith;
mod math;

#[test]
fn test_new_and_properties() {
    let tensor = Tensor::new(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
    assert_eq!(tensor.shape(), &[2, 3]);
    assert_eq!(tensor.dimension(), 2);
    assert_eq!(tensor.size(), 6);
    assert_eq!(tensor.nbytes(), 24);
    assert!(!tensor.is_scalar());
    assert_eq!(tensor.number(), None);
    assert_eq!(tensor.to_vec(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

    let scalar = Tensor::from(3.5);
    assert_eq!(scalar.shape(), &[1, 1]);
    assert_eq!(scalar.number(), Some(3.5));
}

#[test]
fn test_try_new_errors() {
    assert_eq!(
        Tensor::try_new(&[1.0, 2.0, 3.0], &[2, 2]),
        Err(TensorError::DataShapeMismatch {
            shape: vec![2, 2],
            data_len: 3,
        })
    );
    assert_eq!(
        Tensor::try_new(&[], &[0, 2]),
        Err(TensorError::ValueMustSatisfyComparison {
            value_name: "形状中的每个维度".to_string(),
            operator: ComparisonOperator::GreaterOrEqual,
            threshold: 1,
        })
    );
}

#[test]
#[should_panic(expected = "数据长度3与形状[2, 2]所需的元素个数不一致")]
fn test_new_panics_on_mismatch() {
    let _ = Tensor::new(&[1.0, 2.0, 3.0], &[2, 2]);
}

#[test]
fn test_seeded_random_is_reproducible() {
    let mut rng_1 = StdRng::seed_from_u64(42);
    let mut rng_2 = StdRng::seed_from_u64(42);
    let a = Tensor::normal_with_rng(0.0, 1.0, &[3, 5], &mut rng_1);
    let b = Tensor::normal_with_rng(0.0, 1.0, &[3, 5], &mut rng_2);
    assert_eq!(a, b);
    assert_eq!(a.shape(), &[3, 5]);

    let u = Tensor::uniform_with_rng(-1.0, 1.0, &[100], &mut rng_1);
    assert!(u.to_vec().iter().all(|x| (-1.0..1.0).contains(x)));
}

#[test]
fn test_broadcast_shape() {
    assert_eq!(Tensor::broadcast_shape(&[4, 3], &[1, 3]), Some(vec![4, 3]));
    assert_eq!(Tensor::broadcast_shape(&[4, 3], &[3]), Some(vec![4, 3]));
    assert_eq!(Tensor::broadcast_shape(&[1, 1], &[2, 5]), Some(vec![2, 5]));
    assert_eq!(Tensor::broadcast_shape(&[4, 3], &[2, 3]), None);
}

#[test]
fn test_operator_error_display() {
    let error = TensorError::OperatorError {
        operator: Operator::MatMul,
        tensor1_shape: vec![2, 3],
        tensor2_shape: vec![2, 3],
    };
    assert_eq!(
        error.to_string(),
        "形状不一致，故无法矩阵相乘：第一个张量的形状为[2, 3]，第二个张量的形状为[2, 3]"
    );
}
