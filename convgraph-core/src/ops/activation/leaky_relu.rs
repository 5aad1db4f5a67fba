use crate::autograd::backward_op::{check_arity, GraphOp};
use crate::error::ConvGraphError;
use crate::ops::traits::Element;
use crate::tensor::{Shape, Tensor};

// --- Forward Operation ---

/// Applies the leaky Rectified Linear Unit element-wise.
/// `LeakyReLU(x) = x if x >= 0 else alpha * x`
pub fn leaky_relu_op<T: Element>(input: &Tensor<T>, alpha: T) -> Tensor<T> {
    input.map(|x| if x >= T::zero() { x } else { alpha * x })
}

// --- Backward Operation ---

/// Gradient of leaky ReLU w.r.t. its input.
///
/// The local derivative is read from the forward *input*: `1` where
/// `input >= 0`, `alpha` elsewhere.
pub fn leaky_relu_backward<T: Element>(
    input: &Tensor<T>,
    grad_output: &Tensor<T>,
    alpha: T,
) -> Result<Tensor<T>, ConvGraphError> {
    input.check_same_shape(grad_output, "leaky_relu_backward")?;
    let data = input
        .data()
        .iter()
        .zip(grad_output.data().iter())
        .map(|(&x, &g)| if x >= T::zero() { g } else { alpha * g })
        .collect();
    Tensor::new(data, input.shape())
}

/// Graph node operation for leaky ReLU with slope `alpha` on negative inputs.
#[derive(Debug, Clone)]
pub struct LeakyReluOp<T> {
    alpha: T,
}

impl<T: Element> LeakyReluOp<T> {
    pub fn new(alpha: T) -> Result<Self, ConvGraphError> {
        if !alpha.is_finite() {
            return Err(ConvGraphError::ConfigurationError(format!(
                "Leaky ReLU slope must be finite, got {}",
                alpha
            )));
        }
        Ok(LeakyReluOp { alpha })
    }

    pub fn alpha(&self) -> T {
        self.alpha
    }
}

impl<T: Element> GraphOp<T> for LeakyReluOp<T> {
    fn name(&self) -> &'static str {
        "leaky_relu"
    }

    fn output_shape(&self, input_shapes: &[Shape]) -> Result<Shape, ConvGraphError> {
        check_arity(input_shapes, 1, self.name())?;
        Ok(input_shapes[0])
    }

    fn forward(&mut self, inputs: &[&Tensor<T>]) -> Result<Tensor<T>, ConvGraphError> {
        check_arity(inputs, 1, self.name())?;
        Ok(leaky_relu_op(inputs[0], self.alpha))
    }

    fn backward(
        &mut self,
        inputs: &[&Tensor<T>],
        grad_output: &Tensor<T>,
    ) -> Result<Vec<Tensor<T>>, ConvGraphError> {
        check_arity(inputs, 1, self.name())?;
        Ok(vec![leaky_relu_backward(inputs[0], grad_output, self.alpha)?])
    }
}

#[cfg(test)]
#[path = "leaky_relu_test.rs"]
mod tests;
