// convgraph-core/src/ops/arithmetic/bias_add.rs

use crate::autograd::backward_op::{check_arity, GraphOp};
use crate::error::ConvGraphError;
use crate::nn::parameter::ParameterGrad;
use crate::ops::traits::Element;
use crate::tensor::{Shape, Tensor};

// --- Forward Operation ---

/// Adds `bias[c]` to every element of channel `c`.
pub fn bias_add_op<T: Element>(input: &Tensor<T>, bias: &[T]) -> Result<Tensor<T>, ConvGraphError> {
    if bias.len() != input.channels() {
        return Err(ConvGraphError::ShapeMismatch {
            expected: vec![input.channels()],
            actual: vec![bias.len()],
            operation: "bias_add_op".to_string(),
        });
    }
    let channels = bias.len();
    let mut result = input.clone();
    for (i, x) in result.data_mut().iter_mut().enumerate() {
        *x += bias[i % channels];
    }
    Ok(result)
}

/// Graph node operation for a per-channel bias.
///
/// Backward passes the output gradient through unchanged and reduces it over
/// every spatial position to get the bias gradient.
#[derive(Debug, Clone)]
pub struct BiasAddOp<T> {
    bias: Vec<T>,
    grad_bias: Option<Vec<T>>,
}

impl<T: Element> BiasAddOp<T> {
    pub fn new(bias: Vec<T>) -> Self {
        BiasAddOp {
            bias,
            grad_bias: None,
        }
    }

    pub fn bias(&self) -> &[T] {
        &self.bias
    }
}

impl<T: Element> GraphOp<T> for BiasAddOp<T> {
    fn name(&self) -> &'static str {
        "bias_add"
    }

    fn output_shape(&self, input_shapes: &[Shape]) -> Result<Shape, ConvGraphError> {
        check_arity(input_shapes, 1, self.name())?;
        let shape = input_shapes[0];
        if shape[2] != self.bias.len() {
            return Err(ConvGraphError::ShapeMismatch {
                expected: vec![shape[2]],
                actual: vec![self.bias.len()],
                operation: "bias_add (bias length vs input channels)".to_string(),
            });
        }
        Ok(shape)
    }

    fn forward(&mut self, inputs: &[&Tensor<T>]) -> Result<Tensor<T>, ConvGraphError> {
        check_arity(inputs, 1, self.name())?;
        bias_add_op(inputs[0], &self.bias)
    }

    fn backward(
        &mut self,
        inputs: &[&Tensor<T>],
        grad_output: &Tensor<T>,
    ) -> Result<Vec<Tensor<T>>, ConvGraphError> {
        check_arity(inputs, 1, self.name())?;
        inputs[0].check_same_shape(grad_output, "bias_add_backward")?;
        self.grad_bias = Some(grad_output.sum_spatial());
        Ok(vec![grad_output.clone()])
    }

    fn has_parameters(&self) -> bool {
        true
    }

    fn parameter_grad(&self) -> Option<ParameterGrad<T>> {
        self.grad_bias.clone().map(ParameterGrad::Bias)
    }
}

#[cfg(test)]
#[path = "bias_add_test.rs"]
mod tests;
