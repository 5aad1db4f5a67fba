use super::*;

fn single_channel(data: Vec<f64>, height: usize, width: usize) -> Tensor<f64> {
    Tensor::new(data, [height, width, 1]).unwrap()
}

#[test]
fn test_max_pool_forward_2x2() {
    let input = single_channel(
        vec![
            1.0, 5.0, 2.0, 0.0, //
            3.0, 4.0, 8.0, 6.0, //
            0.0, 0.0, 1.0, 1.0, //
            9.0, 0.0, 1.0, 7.0,
        ],
        4,
        4,
    );
    let (output, ties) = max_pool_op(&input, 2);
    assert_eq!(output.shape(), [2, 2, 1]);
    assert_eq!(output.data(), &[5.0, 8.0, 9.0, 7.0]);
    assert_eq!(ties.get(0, 0, 0), &[(0, 1)]);
    assert_eq!(ties.get(0, 1, 0), &[(1, 2)]);
    assert_eq!(ties.get(1, 0, 0), &[(3, 0)]);
    assert_eq!(ties.get(1, 1, 0), &[(3, 3)]);
}

#[test]
fn test_max_pool_truncates_partial_windows() {
    // 3x3 with window 2 -> 2x2 output, the last row/col windows are clipped.
    let input = single_channel(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, -7.0, -8.0, -9.0], 3, 3);
    let (output, ties) = max_pool_op(&input, 2);
    assert_eq!(output.shape(), [2, 2, 1]);
    // Clipped windows are not zero-padded: the bottom-right max stays negative.
    assert_eq!(output.data(), &[5.0, 6.0, -7.0, -9.0]);
    assert_eq!(ties.get(1, 1, 0), &[(2, 2)]);
}

#[test]
fn test_max_pool_channels_are_independent() {
    // 2x2 spatial, 2 channels; channel 1 has its max elsewhere.
    let input = Tensor::new(vec![1.0, 4.0, 2.0, 3.0, 0.0, 2.0, 1.0, 1.0], [2, 2, 2]).unwrap();
    let (output, ties) = max_pool_op(&input, 2);
    assert_eq!(output.shape(), [1, 1, 2]);
    assert_eq!(output.data(), &[2.0, 4.0]);
    assert_eq!(ties.get(0, 0, 0), &[(0, 1)]);
    assert_eq!(ties.get(0, 0, 1), &[(0, 0)]);
}

#[test]
fn test_max_pool_tie_set_keeps_every_maximum() {
    let input = single_channel(vec![2.0, 1.0, 2.0, 2.0], 2, 2);
    let (output, ties) = max_pool_op(&input, 2);
    assert_eq!(output.data(), &[2.0]);
    assert_eq!(ties.get(0, 0, 0), &[(0, 0), (1, 0), (1, 1)]);
}

#[test]
fn test_max_pool_tie_set_resets_on_new_maximum() {
    let input = single_channel(vec![1.0, 1.0, 3.0, 1.0], 2, 2);
    let (_, ties) = max_pool_op(&input, 2);
    assert_eq!(ties.get(0, 0, 0), &[(1, 0)]);
}

#[test]
fn test_max_pool_backward_assigns_full_gradient_to_each_tie() {
    // Pins the tie semantics: each tied coordinate receives the whole output
    // gradient once; the gradient is neither split nor summed.
    let input = single_channel(vec![2.0, 1.0, 2.0, 2.0], 2, 2);
    let (_, ties) = max_pool_op(&input, 2);
    let grad_output = single_channel(vec![5.0], 1, 1);
    let grad_input = max_pool_backward(&input, &grad_output, &ties).unwrap();
    assert_eq!(grad_input.data(), &[5.0, 0.0, 5.0, 5.0]);
}

#[test]
fn test_max_pool_window_one_is_identity() {
    let input = Tensor::new(vec![3.0, -1.0, 0.5, 2.0, -4.0, 7.0], [1, 3, 2]).unwrap();
    let mut op = MaxPoolOp::new(1).unwrap();
    let output = GraphOp::<f64>::forward(&mut op, &[&input]).unwrap();
    assert_eq!(output, input);

    let grad_output = Tensor::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], [1, 3, 2]).unwrap();
    let grads = op.backward(&[&input], &grad_output).unwrap();
    assert_eq!(grads[0], grad_output);
}

#[test]
fn test_max_pool_op_validation() {
    assert!(matches!(
        MaxPoolOp::new(0),
        Err(ConvGraphError::ConfigurationError(_))
    ));
    let op = MaxPoolOp::new(3).unwrap();
    assert_eq!(GraphOp::<f64>::output_shape(&op, &[[7, 6, 2]]).unwrap(), [3, 2, 2]);
}

#[test]
fn test_max_pool_backward_before_forward() {
    let mut op = MaxPoolOp::new(2).unwrap();
    let input = single_channel(vec![1.0; 4], 2, 2);
    let grad_output = single_channel(vec![1.0], 1, 1);
    assert!(matches!(
        op.backward(&[&input], &grad_output),
        Err(ConvGraphError::InternalError(_))
    ));
}
