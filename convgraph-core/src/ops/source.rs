use crate::autograd::backward_op::{check_arity, GraphOp};
use crate::error::ConvGraphError;
use crate::ops::traits::Element;
use crate::tensor::{Shape, Tensor};

/// Graph input: holds the caller's tensor.
///
/// Forward is the identity on the stored value and backward is a no-op; the
/// gradient accumulated on this node after the backward pass is the gradient
/// w.r.t. the graph input.
#[derive(Debug, Clone)]
pub struct SourceOp<T> {
    value: Tensor<T>,
}

impl<T: Element> SourceOp<T> {
    pub fn new(value: Tensor<T>) -> Self {
        SourceOp { value }
    }

    pub fn value(&self) -> &Tensor<T> {
        &self.value
    }
}

impl<T: Element> GraphOp<T> for SourceOp<T> {
    fn name(&self) -> &'static str {
        "source"
    }

    fn output_shape(&self, input_shapes: &[Shape]) -> Result<Shape, ConvGraphError> {
        check_arity(input_shapes, 0, self.name())?;
        Ok(self.value.shape())
    }

    fn forward(&mut self, inputs: &[&Tensor<T>]) -> Result<Tensor<T>, ConvGraphError> {
        check_arity(inputs, 0, self.name())?;
        Ok(self.value.clone())
    }

    fn backward(
        &mut self,
        inputs: &[&Tensor<T>],
        _grad_output: &Tensor<T>,
    ) -> Result<Vec<Tensor<T>>, ConvGraphError> {
        check_arity(inputs, 0, self.name())?;
        Ok(Vec::new())
    }
}
