use crate::autograd::backward_op::{check_arity, GraphOp};
use crate::error::ConvGraphError;
use crate::ops::traits::Element;
use crate::tensor::{zeros, zeros_like, Shape, Tensor};

/// Input coordinates `(row, col)` that attained the maximum of each output
/// cell, stored in the output tensor's storage order.
#[derive(Debug, Clone, PartialEq)]
pub struct TieSets {
    output_shape: Shape,
    cells: Vec<Vec<(usize, usize)>>,
}

impl TieSets {
    /// Tie-set of output cell `(i, j, c)`.
    pub fn get(&self, i: usize, j: usize, c: usize) -> &[(usize, usize)] {
        let [_, width, channels] = self.output_shape;
        &self.cells[(i * width + j) * channels + c]
    }
}

/// Output shape of a non-overlapping `window x window` max-pool.
/// Partial windows at the bottom/right edges produce an output cell too.
pub fn max_pool_output_shape(input: Shape, window: usize) -> Shape {
    let [height, width, channels] = input;
    [height.div_ceil(window), width.div_ceil(window), channels]
}

/// Max-pools with window and stride `window`.
///
/// Windows crossing the tensor boundary are truncated, never padded. Every
/// coordinate equal to the window maximum is recorded in the tie-set, in
/// scan order.
pub fn max_pool_op<T: Element>(input: &Tensor<T>, window: usize) -> (Tensor<T>, TieSets) {
    let [height, width, channels] = input.shape();
    let output_shape = max_pool_output_shape(input.shape(), window);
    let mut output = zeros(output_shape);
    let mut cells = Vec::with_capacity(output.numel());

    for i in 0..output_shape[0] {
        for j in 0..output_shape[1] {
            for c in 0..channels {
                let mut max = T::neg_infinity();
                let mut ties = Vec::new();
                for row in (i * window)..((i + 1) * window).min(height) {
                    for col in (j * window)..((j + 1) * window).min(width) {
                        let value = input[(row, col, c)];
                        if value > max {
                            max = value;
                            ties.clear();
                            ties.push((row, col));
                        } else if value == max {
                            ties.push((row, col));
                        }
                    }
                }
                output[(i, j, c)] = max;
                cells.push(ties);
            }
        }
    }
    (output, TieSets { output_shape, cells })
}

/// Routes each output gradient to its tie-set.
///
/// Every tied coordinate is *assigned* the full gradient of its output cell.
/// Windows are disjoint so no coordinate is reached from two output cells.
pub fn max_pool_backward<T: Element>(
    input: &Tensor<T>,
    grad_output: &Tensor<T>,
    ties: &TieSets,
) -> Result<Tensor<T>, ConvGraphError> {
    if grad_output.shape() != ties.output_shape {
        return Err(ConvGraphError::ShapeMismatch {
            expected: ties.output_shape.to_vec(),
            actual: grad_output.shape().to_vec(),
            operation: "max_pool_backward".to_string(),
        });
    }
    let mut grad_input = zeros_like(input);
    let [out_h, out_w, channels] = ties.output_shape;
    for i in 0..out_h {
        for j in 0..out_w {
            for c in 0..channels {
                let g = grad_output[(i, j, c)];
                for &(row, col) in ties.get(i, j, c) {
                    grad_input[(row, col, c)] = g;
                }
            }
        }
    }
    Ok(grad_input)
}

const NAME: &str = "max_pool";

/// Graph node operation for max-pooling.
#[derive(Debug, Clone)]
pub struct MaxPoolOp {
    window: usize,
    ties: Option<TieSets>,
}

impl MaxPoolOp {
    pub fn new(window: usize) -> Result<Self, ConvGraphError> {
        if window == 0 {
            return Err(ConvGraphError::ConfigurationError(
                "Pooling window must be at least 1".to_string(),
            ));
        }
        Ok(MaxPoolOp { window, ties: None })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Tie-sets from the last forward pass.
    pub fn ties(&self) -> Option<&TieSets> {
        self.ties.as_ref()
    }
}

impl<T: Element> GraphOp<T> for MaxPoolOp {
    fn name(&self) -> &'static str {
        NAME
    }

    fn output_shape(&self, input_shapes: &[Shape]) -> Result<Shape, ConvGraphError> {
        check_arity(input_shapes, 1, NAME)?;
        Ok(max_pool_output_shape(input_shapes[0], self.window))
    }

    fn forward(&mut self, inputs: &[&Tensor<T>]) -> Result<Tensor<T>, ConvGraphError> {
        check_arity(inputs, 1, NAME)?;
        let (output, ties) = max_pool_op(inputs[0], self.window);
        self.ties = Some(ties);
        Ok(output)
    }

    fn backward(
        &mut self,
        inputs: &[&Tensor<T>],
        grad_output: &Tensor<T>,
    ) -> Result<Vec<Tensor<T>>, ConvGraphError> {
        check_arity(inputs, 1, NAME)?;
        let ties = self.ties.as_ref().ok_or_else(|| {
            ConvGraphError::InternalError("max_pool backward called before forward".to_string())
        })?;
        Ok(vec![max_pool_backward(inputs[0], grad_output, ties)?])
    }
}

#[cfg(test)]
#[path = "max_pool_test.rs"]
mod tests;
