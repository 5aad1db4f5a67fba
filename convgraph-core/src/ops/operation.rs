use crate::autograd::GraphOp;
use crate::error::ConvGraphError;
use crate::nn::parameter::ParameterGrad;
use crate::ops::activation::LeakyReluOp;
use crate::ops::arithmetic::BiasAddOp;
use crate::ops::conv::ConvOp;
use crate::ops::pool::MaxPoolOp;
use crate::ops::source::SourceOp;
use crate::ops::traits::Element;
use crate::tensor::{Shape, Tensor};

/// Every operation a graph node can hold.
///
/// The set is closed; dispatch goes through [`GraphOp`], which this enum
/// implements by delegating to the wrapped operation.
#[derive(Debug, Clone)]
pub enum Operation<T> {
    Source(SourceOp<T>),
    LeakyRelu(LeakyReluOp<T>),
    BiasAdd(BiasAddOp<T>),
    MaxPool(MaxPoolOp),
    Conv(ConvOp<T>),
}

impl<T: Element> Operation<T> {
    fn as_op(&self) -> &dyn GraphOp<T> {
        match self {
            Operation::Source(op) => op,
            Operation::LeakyRelu(op) => op,
            Operation::BiasAdd(op) => op,
            Operation::MaxPool(op) => op,
            Operation::Conv(op) => op,
        }
    }

    fn as_op_mut(&mut self) -> &mut dyn GraphOp<T> {
        match self {
            Operation::Source(op) => op,
            Operation::LeakyRelu(op) => op,
            Operation::BiasAdd(op) => op,
            Operation::MaxPool(op) => op,
            Operation::Conv(op) => op,
        }
    }
}

impl<T: Element> GraphOp<T> for Operation<T> {
    fn name(&self) -> &'static str {
        self.as_op().name()
    }

    fn output_shape(&self, input_shapes: &[Shape]) -> Result<Shape, ConvGraphError> {
        self.as_op().output_shape(input_shapes)
    }

    fn forward(&mut self, inputs: &[&Tensor<T>]) -> Result<Tensor<T>, ConvGraphError> {
        self.as_op_mut().forward(inputs)
    }

    fn backward(
        &mut self,
        inputs: &[&Tensor<T>],
        grad_output: &Tensor<T>,
    ) -> Result<Vec<Tensor<T>>, ConvGraphError> {
        self.as_op_mut().backward(inputs, grad_output)
    }

    fn has_parameters(&self) -> bool {
        self.as_op().has_parameters()
    }

    fn parameter_grad(&self) -> Option<ParameterGrad<T>> {
        self.as_op().parameter_grad()
    }
}
