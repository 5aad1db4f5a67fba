use thiserror::Error;

/// Custom error type for the convgraph crate.
#[derive(Error, Debug, PartialEq, Clone)] // PartialEq for easier testing
pub enum ConvGraphError {
    #[error("Shape mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        operation: String,
    },

    #[error("Tensor creation error: data length {data_len} does not match shape {shape:?}")]
    TensorCreationError { data_len: usize, shape: Vec<usize> },

    #[error("Index out of bounds: index {index:?} for shape {shape:?}")]
    IndexOutOfBounds {
        index: Vec<usize>,
        shape: Vec<usize>,
    },

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Layer {layer} references node {input}, which is not an earlier node")]
    InvalidLayerReference { layer: usize, input: usize },

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Node {node} was used before being evaluated")]
    NodeNotEvaluated { node: usize },

    #[error("Gradient for node {node} has not been computed; run backward first")]
    GradientNotComputed { node: usize },

    #[error("Internal error: {0}")]
    InternalError(String),
}
