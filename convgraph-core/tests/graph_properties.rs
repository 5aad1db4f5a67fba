use approx::assert_relative_eq;
use convgraph_core::autograd::{check_input_grad, GradCheckConfig};
use convgraph_core::tensor::create::{rand_uniform, randn};
use convgraph_core::tensor::full;
use convgraph_core::{BoundaryStrategy, ConvGraphError, Graph, LayerSpec, ParameterGrad, Tensor};
use rand::rngs::StdRng;
use rand::SeedableRng;

mod common;
use common::{channel_major_tensor, create_test_tensor, init_logger};

#[test]
fn test_bias_gradient_is_spatial_sum_per_channel() {
    let mut rng = StdRng::seed_from_u64(11);
    let input: Tensor = randn([3, 4, 2], &mut rng);
    let seed: Tensor = randn([3, 4, 2], &mut rng);

    let outputs = Graph::run(input, &[LayerSpec::bias(vec![0.5, -0.5])], &seed).unwrap();

    let expected = seed.sum_spatial();
    let grad = outputs.parameter_grads[0].1.as_bias().unwrap().to_vec();
    for (g, e) in grad.iter().zip(expected.iter()) {
        assert_relative_eq!(*g, *e, epsilon = 1e-12);
    }
    assert_eq!(outputs.input_grad, seed);
}

#[test]
fn test_leaky_relu_derivative_and_grad_check() {
    let input = create_test_tensor(vec![-2.0, 0.0, 3.0, -0.1], [2, 2, 1]);
    let seed = full([2, 2, 1], 1.0);
    let outputs = Graph::run(input, &[LayerSpec::leaky_relu(0.25)], &seed).unwrap();
    assert_eq!(outputs.input_grad.data(), &[0.25, 1.0, 1.0, 0.25]);

    let mut rng = StdRng::seed_from_u64(99);
    let input: Tensor = rand_uniform([5, 5, 3], 0.05, 1.0, &mut rng);
    let signs: Tensor = rand_uniform([5, 5, 3], -1.0, 1.0, &mut rng);
    let input = Tensor::new(
        input
            .data()
            .iter()
            .zip(signs.data())
            .map(|(x, s)| if *s < 0.0 { -x } else { *x })
            .collect(),
        [5, 5, 3],
    )
    .unwrap();
    let seed: Tensor = randn([5, 5, 3], &mut rng);
    let result = check_input_grad(&input, &[LayerSpec::leaky_relu(0.5)], &seed, &GradCheckConfig::default());
    assert!(result.is_ok(), "{:?}", result.err());
}

#[test]
fn test_pool_window_one_is_identity() {
    let mut rng = StdRng::seed_from_u64(5);
    let input: Tensor = randn([3, 2, 2], &mut rng);
    let seed: Tensor = randn([3, 2, 2], &mut rng);
    let outputs = Graph::run(input.clone(), &[LayerSpec::max_pool(1)], &seed).unwrap();
    assert_eq!(outputs.output, input);
    assert_eq!(outputs.input_grad, seed);
}

#[test]
fn test_pool_ties_each_receive_full_gradient() {
    let input = create_test_tensor(vec![4.0, 4.0, 1.0, 4.0], [2, 2, 1]);
    let seed = full([1, 1, 1], 2.5);
    let outputs = Graph::run(input, &[LayerSpec::max_pool(2)], &seed).unwrap();
    assert_eq!(outputs.output.data(), &[4.0]);
    assert_eq!(outputs.input_grad.data(), &[2.5, 2.5, 0.0, 2.5]);
}

#[test]
fn test_zero_padding_makes_strategies_agree() {
    let mut rng = StdRng::seed_from_u64(3);
    let input: Tensor = randn([5, 4, 2], &mut rng);
    let weights: Tensor = randn([3, 2, 9], &mut rng);
    let seed: Tensor = randn([2, 1, 3], &mut rng);

    let run = |strategy| {
        let specs = [LayerSpec::conv(strategy, 3, 3, 2, 0, weights.data().to_vec())];
        Graph::run(input.clone(), &specs, &seed).unwrap()
    };
    let mirror = run(BoundaryStrategy::Mirror);
    let extend = run(BoundaryStrategy::Extend);
    let cyclic = run(BoundaryStrategy::Cyclic);
    assert_eq!(mirror, extend);
    assert_eq!(extend, cyclic);
}

#[test]
fn test_identity_conv_and_bias_example() {
    init_logger();
    let input = channel_major_tensor(&[1.0, 2.0, 3.0, 4.0], [2, 2, 1]);
    let specs = [
        LayerSpec::conv(BoundaryStrategy::Extend, 1, 1, 1, 0, vec![1.0]),
        LayerSpec::bias(vec![0.0]),
    ];
    let outputs = Graph::run(input.clone(), &specs, &full([2, 2, 1], 1.0)).unwrap();
    assert_eq!(outputs.output, input);
    assert_eq!(outputs.input_grad.to_channel_major(), vec![1.0; 4]);
    assert_eq!(outputs.parameter_grads[1], (2, ParameterGrad::Bias(vec![4.0])));
}

#[test]
fn test_conv_input_gradient_sums_overlapping_windows() {
    let mut rng = StdRng::seed_from_u64(17);
    let input: Tensor = randn([3, 3, 1], &mut rng);
    let weights = vec![1.0, -2.0, 0.5, 3.0];
    let seed: Tensor = randn([2, 2, 1], &mut rng);
    let specs = [LayerSpec::conv(BoundaryStrategy::Mirror, 1, 2, 1, 0, weights.clone())];

    let outputs = Graph::run(input, &specs, &seed).unwrap();

    // dL/dx[r][q] = sum over output cells (i, j) covering (r, q) of
    // seed[i][j] * w[r - i][q - j]
    for r in 0..3 {
        for q in 0..3 {
            let mut expected = 0.0;
            for i in 0..2 {
                for j in 0..2 {
                    if r >= i && r - i < 2 && q >= j && q - j < 2 {
                        expected += seed[(i, j, 0)] * weights[(r - i) * 2 + (q - j)];
                    }
                }
            }
            assert_relative_eq!(outputs.input_grad[(r, q, 0)], expected, epsilon = 1e-12);
        }
    }
}

#[test]
fn test_multi_channel_stack_grad_check() {
    init_logger();
    let mut rng = StdRng::seed_from_u64(31);
    let input: Tensor = randn([6, 6, 2], &mut rng);
    let w1: Tensor = randn([3, 2, 4], &mut rng);
    let w2: Tensor = randn([2, 3, 9], &mut rng);
    let specs = [
        LayerSpec::conv(BoundaryStrategy::Mirror, 3, 2, 1, 1, w1.data().to_vec()),
        LayerSpec::bias(vec![0.1, -0.2, 0.3]),
        LayerSpec::conv(BoundaryStrategy::Extend, 2, 3, 2, 2, w2.data().to_vec()),
    ];
    // 6 -> (6 + 2 - 2) + 1 = 7 -> (7 + 4 - 3) / 2 + 1 = 5
    let seed: Tensor = randn([5, 5, 2], &mut rng);
    let result = check_input_grad(&input, &specs, &seed, &GradCheckConfig::default());
    assert!(result.is_ok(), "{:?}", result.err());
}

#[test]
fn test_errors_surface_through_run() {
    let input = create_test_tensor(vec![1.0; 4], [2, 2, 1]);
    let seed = full([2, 2, 1], 1.0);
    // Mirror cannot reflect a 2-wide axis by 2.
    let specs = [LayerSpec::conv(BoundaryStrategy::Mirror, 1, 1, 1, 2, vec![1.0])];
    assert!(matches!(
        Graph::run(input.clone(), &specs, &seed),
        Err(ConvGraphError::ConfigurationError(_))
    ));
    let specs = [LayerSpec::max_pool(0)];
    assert!(matches!(
        Graph::run(input, &specs, &seed),
        Err(ConvGraphError::ConfigurationError(_))
    ));
}
