use crate::error::ConvGraphError;
use crate::nn::parameter::ParameterGrad;
use crate::ops::traits::Element;
use crate::tensor::{Shape, Tensor};
use std::fmt::Debug;

/// Defines the interface shared by every operation that can sit on a graph node.
///
/// A node calls [`GraphOp::forward`] once per forward pass with the cached
/// results of its predecessors, and [`GraphOp::backward`] once per backward
/// pass with the same inputs plus the gradient accumulated on the node's own
/// output. Any state needed between the two calls (pooling tie-sets, the
/// padded input of a convolution) is kept inside the operation.
pub trait GraphOp<T: Element>: Debug {
    /// Short operation name, used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Computes the output shape from the input shapes without evaluating
    /// anything. The graph uses it to validate layers at construction time.
    fn output_shape(&self, input_shapes: &[Shape]) -> Result<Shape, ConvGraphError>;

    /// Evaluates the operation on its predecessors' results.
    fn forward(&mut self, inputs: &[&Tensor<T>]) -> Result<Tensor<T>, ConvGraphError>;

    /// Computes the gradients of the operation's inputs given the gradient
    /// of its output (dL/dOutput).
    ///
    /// # Returns
    /// One gradient tensor per input, in the order of `inputs`, each shaped
    /// like the corresponding input. The graph adds them into the
    /// predecessors' accumulators. Parameter gradients are kept by the
    /// operation and exposed through [`GraphOp::parameter_grad`].
    fn backward(
        &mut self,
        inputs: &[&Tensor<T>],
        grad_output: &Tensor<T>,
    ) -> Result<Vec<Tensor<T>>, ConvGraphError>;

    /// Whether the operation owns learnable parameters.
    fn has_parameters(&self) -> bool {
        false
    }

    /// Gradient w.r.t. the operation's parameters, available after `backward`.
    fn parameter_grad(&self) -> Option<ParameterGrad<T>> {
        None
    }
}

/// Returns `ShapeMismatch` unless `inputs` holds exactly `expected` tensors.
pub(crate) fn check_arity<T>(
    inputs: &[T],
    expected: usize,
    operation: &str,
) -> Result<(), ConvGraphError> {
    if inputs.len() != expected {
        return Err(ConvGraphError::ShapeMismatch {
            expected: vec![expected],
            actual: vec![inputs.len()],
            operation: format!("{} (number of inputs)", operation),
        });
    }
    Ok(())
}
