use crate::autograd::NodeId;
use crate::error::ConvGraphError;
use crate::ops::activation::LeakyReluOp;
use crate::ops::arithmetic::BiasAddOp;
use crate::ops::conv::{BoundaryStrategy, ConvOp, Kernel};
use crate::ops::pool::MaxPoolOp;
use crate::ops::Operation;
use crate::ops::traits::Element;
use crate::tensor::Shape;

/// What a layer computes, with its hyper-parameters and raw weights.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerKind<T> {
    LeakyRelu {
        alpha: T,
    },
    BiasAdd {
        bias: Vec<T>,
    },
    MaxPool {
        window: usize,
    },
    /// `weights` are flattened `[out][in][row][col]`; the input channel
    /// count is taken from the predecessor when the graph is built.
    Conv {
        strategy: BoundaryStrategy,
        out_channels: usize,
        kernel_size: usize,
        stride: usize,
        padding: usize,
        weights: Vec<T>,
    },
}

/// Declarative description of one layer of a graph.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec<T> {
    pub kind: LayerKind<T>,
    /// Predecessor node; `None` means the node right before this one.
    pub input: Option<NodeId>,
}

impl<T: Element> LayerSpec<T> {
    pub fn new(kind: LayerKind<T>) -> Self {
        LayerSpec { kind, input: None }
    }

    pub fn leaky_relu(alpha: T) -> Self {
        Self::new(LayerKind::LeakyRelu { alpha })
    }

    pub fn bias(bias: Vec<T>) -> Self {
        Self::new(LayerKind::BiasAdd { bias })
    }

    pub fn max_pool(window: usize) -> Self {
        Self::new(LayerKind::MaxPool { window })
    }

    pub fn conv(
        strategy: BoundaryStrategy,
        out_channels: usize,
        kernel_size: usize,
        stride: usize,
        padding: usize,
        weights: Vec<T>,
    ) -> Self {
        Self::new(LayerKind::Conv {
            strategy,
            out_channels,
            kernel_size,
            stride,
            padding,
            weights,
        })
    }

    /// Reads from node `input` instead of the immediately preceding node.
    pub fn from_input(mut self, input: NodeId) -> Self {
        self.input = Some(input);
        self
    }

    /// Checks hyper-parameters that do not depend on the input shape.
    pub fn validate(&self) -> Result<(), ConvGraphError> {
        match &self.kind {
            LayerKind::LeakyRelu { alpha } if !alpha.is_finite() => Err(
                ConvGraphError::ConfigurationError(format!("Leaky ReLU slope must be finite, got {}", alpha)),
            ),
            LayerKind::MaxPool { window: 0 } => Err(ConvGraphError::ConfigurationError(
                "Pooling window must be at least 1".to_string(),
            )),
            LayerKind::Conv { stride: 0, .. } => Err(ConvGraphError::ConfigurationError(
                "Convolution stride must be at least 1".to_string(),
            )),
            LayerKind::Conv { kernel_size: 0, .. } => Err(ConvGraphError::ConfigurationError(
                "Convolution kernel size must be at least 1".to_string(),
            )),
            LayerKind::Conv { out_channels: 0, .. } => Err(ConvGraphError::ConfigurationError(
                "Convolution needs at least one output channel".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// Instantiates the operation for a predecessor of shape `input_shape`.
    pub fn build(&self, input_shape: Shape) -> Result<Operation<T>, ConvGraphError> {
        self.validate()?;
        let op = match &self.kind {
            LayerKind::LeakyRelu { alpha } => Operation::LeakyRelu(LeakyReluOp::new(*alpha)?),
            LayerKind::BiasAdd { bias } => Operation::BiasAdd(BiasAddOp::new(bias.clone())),
            LayerKind::MaxPool { window } => Operation::MaxPool(MaxPoolOp::new(*window)?),
            LayerKind::Conv {
                strategy,
                out_channels,
                kernel_size,
                stride,
                padding,
                weights,
            } => {
                let kernel = Kernel::new(weights.clone(), *out_channels, input_shape[2], *kernel_size)?;
                Operation::Conv(ConvOp::new(*strategy, kernel, *stride, *padding)?)
            }
        };
        Ok(op)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::GraphOp;

    #[test]
    fn test_validate_rejects_bad_hyper_parameters() {
        assert!(LayerSpec::<f64>::max_pool(0).validate().is_err());
        assert!(LayerSpec::leaky_relu(f64::INFINITY).validate().is_err());
        assert!(LayerSpec::<f64>::conv(BoundaryStrategy::Extend, 1, 1, 0, 0, vec![1.0]).validate().is_err());
        assert!(LayerSpec::<f64>::conv(BoundaryStrategy::Extend, 1, 0, 1, 0, vec![]).validate().is_err());
        assert!(LayerSpec::<f64>::conv(BoundaryStrategy::Extend, 0, 1, 1, 0, vec![]).validate().is_err());
        assert!(LayerSpec::bias(vec![1.0, 2.0]).validate().is_ok());
    }

    #[test]
    fn test_build_conv_infers_in_channels() {
        // 2 out channels, predecessor has 3 channels, 2x2 kernel -> 24 weights.
        let spec = LayerSpec::conv(BoundaryStrategy::Cyclic, 2, 2, 1, 0, vec![0.5; 24]);
        match spec.build([4, 4, 3]).unwrap() {
            Operation::Conv(op) => {
                assert_eq!(op.kernel().shape(), [2, 3, 2, 2]);
                assert_eq!(op.output_shape(&[[4, 4, 3]]).unwrap(), [3, 3, 2]);
            }
            other => panic!("Expected a convolution, got {:?}", other),
        }
        // Same weights against a single-channel predecessor: wrong count.
        assert!(matches!(
            spec.build([4, 4, 1]),
            Err(ConvGraphError::TensorCreationError { data_len: 24, .. })
        ));
    }

    #[test]
    fn test_from_input() {
        let spec = LayerSpec::<f64>::max_pool(2).from_input(0);
        assert_eq!(spec.input, Some(0));
        assert_eq!(LayerSpec::<f64>::max_pool(2).input, None);
    }
}
