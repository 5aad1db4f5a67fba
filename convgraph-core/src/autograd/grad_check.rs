use crate::autograd::graph::Graph;
use crate::error::ConvGraphError;
use crate::nn::layer_spec::LayerSpec;
use crate::ops::traits::Element;
use crate::tensor::Tensor;
use approx::relative_eq;
use log::debug;
use thiserror::Error;

/// Error type specifically for gradient checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    #[error("Gradient check failed at element {element_index}: analytical {analytical:?} != numerical {numerical:?} (difference {difference:?})")]
    GradientMismatch {
        element_index: usize,
        analytical: f64,
        numerical: f64,
        difference: f64,
    },

    #[error("Numerical gradient is NaN or infinite at element {element_index} (loss+ {loss_plus:?}, loss- {loss_minus:?})")]
    NumericalGradNaNOrInfinite {
        element_index: usize,
        loss_plus: f64,
        loss_minus: f64,
    },

    #[error("Analytical gradient is NaN or infinite at element {element_index}: {value:?}")]
    AnalyticalGradNaNOrInfinite { element_index: usize, value: f64 },

    #[error("Graph error during gradient check: {0}")]
    Graph(ConvGraphError),
}

impl From<ConvGraphError> for GradCheckError {
    fn from(err: ConvGraphError) -> Self {
        GradCheckError::Graph(err)
    }
}

/// Step and tolerances of a finite-difference check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradCheckConfig {
    /// Half-width of the central difference.
    pub epsilon: f64,
    pub abs_tolerance: f64,
    pub rel_tolerance: f64,
}

impl GradCheckConfig {
    pub fn new(epsilon: f64, abs_tolerance: f64, rel_tolerance: f64) -> Result<Self, ConvGraphError> {
        if !(epsilon.is_finite() && epsilon > 0.0) {
            return Err(ConvGraphError::ConfigurationError(format!(
                "Finite-difference step must be positive, got {}",
                epsilon
            )));
        }
        if !(abs_tolerance >= 0.0 && rel_tolerance >= 0.0) {
            return Err(ConvGraphError::ConfigurationError(format!(
                "Tolerances must be non-negative, got abs {} and rel {}",
                abs_tolerance, rel_tolerance
            )));
        }
        Ok(GradCheckConfig {
            epsilon,
            abs_tolerance,
            rel_tolerance,
        })
    }
}

impl Default for GradCheckConfig {
    fn default() -> Self {
        GradCheckConfig {
            epsilon: 1e-6,
            abs_tolerance: 1e-6,
            rel_tolerance: 1e-5,
        }
    }
}

fn to_f64<T: Element>(value: T) -> Result<f64, ConvGraphError> {
    value
        .to_f64()
        .ok_or_else(|| ConvGraphError::InternalError(format!("{} does not fit in f64", value)))
}

fn from_f64<T: Element>(value: f64) -> Result<T, ConvGraphError> {
    num_traits::cast::<f64, T>(value)
        .ok_or_else(|| ConvGraphError::InternalError(format!("{} does not fit the element type", value)))
}

/// Scalar loss `sum(output * seed)`, whose gradient w.r.t. the output is `seed`.
fn weighted_loss<T: Element>(output: &Tensor<T>, seed: &Tensor<T>) -> Result<f64, ConvGraphError> {
    output.check_same_shape(seed, "grad_check (loss)")?;
    output
        .data()
        .iter()
        .zip(seed.data())
        .try_fold(0.0, |acc, (&o, &s)| Ok(acc + to_f64(o)? * to_f64(s)?))
}

fn loss_at<T: Element>(
    input: Tensor<T>,
    specs: &[LayerSpec<T>],
    seed: &Tensor<T>,
) -> Result<f64, ConvGraphError> {
    let mut graph = Graph::new(input, specs)?;
    let output = graph.forward()?;
    weighted_loss(output, seed)
}

/// Compares the graph's input gradient for `seed` against central finite
/// differences of `sum(output * seed)`, element by element.
///
/// Elements pass when they are within `abs_tolerance` or within
/// `rel_tolerance` of the larger magnitude. Piecewise-linear layers are only
/// checked reliably away from their kinks (and pooling away from ties).
pub fn check_input_grad<T: Element>(
    input: &Tensor<T>,
    specs: &[LayerSpec<T>],
    seed: &Tensor<T>,
    config: &GradCheckConfig,
) -> Result<(), GradCheckError> {
    let analytical = Graph::run(input.clone(), specs, seed)?.input_grad;
    debug!(
        "check_input_grad: {} elements, {} layers, epsilon {}",
        input.numel(),
        specs.len(),
        config.epsilon
    );

    for element_index in 0..input.numel() {
        let original = to_f64(input.data()[element_index])?;

        let mut plus = input.clone();
        plus.data_mut()[element_index] = from_f64(original + config.epsilon)?;
        let loss_plus = loss_at(plus, specs, seed)?;

        let mut minus = input.clone();
        minus.data_mut()[element_index] = from_f64(original - config.epsilon)?;
        let loss_minus = loss_at(minus, specs, seed)?;

        let numerical = (loss_plus - loss_minus) / (2.0 * config.epsilon);
        if !numerical.is_finite() {
            return Err(GradCheckError::NumericalGradNaNOrInfinite {
                element_index,
                loss_plus,
                loss_minus,
            });
        }
        let analytical = to_f64(analytical.data()[element_index])?;
        if !analytical.is_finite() {
            return Err(GradCheckError::AnalyticalGradNaNOrInfinite {
                element_index,
                value: analytical,
            });
        }
        if !relative_eq!(
            analytical,
            numerical,
            epsilon = config.abs_tolerance,
            max_relative = config.rel_tolerance
        ) {
            return Err(GradCheckError::GradientMismatch {
                element_index,
                analytical,
                numerical,
                difference: (analytical - numerical).abs(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nn::LayerSpec;

    #[test]
    fn test_config_validation() {
        assert!(GradCheckConfig::new(0.0, 1e-6, 1e-6).is_err());
        assert!(GradCheckConfig::new(f64::NAN, 1e-6, 1e-6).is_err());
        assert!(GradCheckConfig::new(1e-6, -1.0, 1e-6).is_err());
        let config = GradCheckConfig::new(1e-4, 1e-3, 1e-3).unwrap();
        assert_eq!(config.epsilon, 1e-4);
    }

    #[test]
    fn test_weighted_loss() {
        let output = Tensor::new(vec![1.0, 2.0, 3.0], [1, 1, 3]).unwrap();
        let seed = Tensor::new(vec![0.5, -1.0, 2.0], [1, 1, 3]).unwrap();
        assert_eq!(weighted_loss(&output, &seed).unwrap(), 0.5 - 2.0 + 6.0);
        let wrong = Tensor::new(vec![1.0], [1, 1, 1]).unwrap();
        assert!(weighted_loss(&output, &wrong).is_err());
    }

    #[test]
    fn test_bias_chain_passes() {
        let input = Tensor::new(vec![0.5, -1.5, 2.0, 3.0], [2, 1, 2]).unwrap();
        let seed = Tensor::new(vec![1.0, 2.0, -1.0, 0.25], [2, 1, 2]).unwrap();
        let specs = [LayerSpec::bias(vec![1.0, -1.0]), LayerSpec::leaky_relu(0.1)];
        assert!(check_input_grad(&input, &specs, &seed, &GradCheckConfig::default()).is_ok());
    }

    #[test]
    fn test_graph_errors_are_forwarded() {
        let input = Tensor::new(vec![1.0, 2.0], [1, 1, 2]).unwrap();
        let seed = Tensor::new(vec![1.0], [1, 1, 1]).unwrap();
        let err = check_input_grad(&input, &[LayerSpec::leaky_relu(0.5)], &seed, &GradCheckConfig::default())
            .unwrap_err();
        assert!(matches!(err, GradCheckError::Graph(ConvGraphError::ShapeMismatch { .. })));
    }
}
