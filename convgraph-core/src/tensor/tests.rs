// convgraph-core/src/tensor/tests.rs

use super::*;
use approx::assert_relative_eq;

fn create_test_tensor(data: Vec<f64>, shape: Shape) -> Tensor {
    Tensor::new(data, shape).expect("Test tensor creation failed")
}

#[test]
fn test_tensor_creation() {
    let t = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], [1, 3, 2]);
    assert_eq!(t.shape(), [1, 3, 2]);
    assert_eq!(t.height(), 1);
    assert_eq!(t.width(), 3);
    assert_eq!(t.channels(), 2);
    assert_eq!(t.numel(), 6);
    assert_relative_eq!(t.get(0, 0, 1).unwrap(), 2.0);
    assert_relative_eq!(t.get(0, 2, 0).unwrap(), 5.0);
    assert_relative_eq!(t[(0, 1, 1)], 4.0);
}

#[test]
fn test_tensor_creation_error() {
    let result = Tensor::new(vec![1.0, 2.0, 3.0], [2, 2, 1]);
    assert!(matches!(
        result,
        Err(ConvGraphError::TensorCreationError { data_len: 3, .. })
    ));
}

#[test]
fn test_get_out_of_bounds() {
    let t = create_test_tensor(vec![1.0; 4], [2, 2, 1]);
    match t.get(2, 0, 0) {
        Err(ConvGraphError::IndexOutOfBounds { index, shape }) => {
            assert_eq!(index, vec![2, 0, 0]);
            assert_eq!(shape, vec![2, 2, 1]);
        }
        other => panic!("Expected IndexOutOfBounds, got {:?}", other),
    }
}

#[test]
fn test_clone_is_deep() {
    let a = create_test_tensor(vec![1.0, 2.0], [1, 2, 1]);
    let mut b = a.clone();
    b[(0, 0, 0)] = 10.0;
    assert_eq!(a[(0, 0, 0)], 1.0);
    assert_eq!(b[(0, 0, 0)], 10.0);
}

#[test]
fn test_map_inplace_and_map() {
    let mut t = create_test_tensor(vec![-1.0, 2.0, -3.0, 4.0], [2, 2, 1]);
    let doubled = t.map(|x| x * 2.0);
    assert_eq!(doubled.data(), &[-2.0, 4.0, -6.0, 8.0]);
    assert_eq!(t.data(), &[-1.0, 2.0, -3.0, 4.0]);

    t.map_inplace(f64::abs);
    assert_eq!(t.data(), &[1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn test_add_assign_tensor() {
    let mut a = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0], [2, 1, 2]);
    let b = create_test_tensor(vec![0.5, 0.5, 1.0, 1.0], [2, 1, 2]);
    a.add_assign_tensor(&b).unwrap();
    assert_eq!(a.data(), &[1.5, 2.5, 4.0, 5.0]);

    let c = create_test_tensor(vec![0.0; 4], [1, 2, 2]);
    let err = a.add_assign_tensor(&c).unwrap_err();
    assert!(matches!(err, ConvGraphError::ShapeMismatch { .. }));
}

#[test]
fn test_sum_spatial() {
    // 2x2 spatial, 2 channels: c0 = 1,2,3,4 ; c1 = 10,20,30,40
    let t = create_test_tensor(vec![1.0, 10.0, 2.0, 20.0, 3.0, 30.0, 4.0, 40.0], [2, 2, 2]);
    assert_eq!(t.sum_spatial(), vec![10.0, 100.0]);
}

#[test]
fn test_debug_and_display() {
    let t = create_test_tensor(vec![1.0, 2.0], [1, 2, 1]);
    assert_eq!(format!("{:?}", t), "Tensor(shape=[1, 2, 1], data=[1.0, 2.0])");
    assert_eq!(format!("{}", t), "[[[1], [2]]]");
}
