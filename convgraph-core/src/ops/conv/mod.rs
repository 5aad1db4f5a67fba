//! # Convolution
//!
//! A convolution layer first expands its input by `padding` on every
//! spatial side following a [`BoundaryStrategy`], then cross-correlates the
//! expanded tensor with a square kernel (the kernel is not flipped):
//!
//! ```text
//! out[i][j][k] = Σ_{r, q, ch} expanded[i*s + r][j*s + q][ch] * kernel[k][ch][r][q]
//! ```
//!
//! The three strategies share the forward and backward arithmetic and only
//! differ in how padded cells map back to input cells ([`ExpansionMap`]).
//! That map is many-to-one, so the input gradient sums contributions from
//! every expanded cell sharing a source.

use crate::autograd::backward_op::{check_arity, GraphOp};
use crate::error::ConvGraphError;
use crate::nn::parameter::ParameterGrad;
use crate::ops::traits::Element;
use crate::tensor::{checked_numel, zeros, Shape, Tensor};

pub mod kernel;
pub mod padding;

pub use kernel::Kernel;
pub use padding::{expand_op, padded_extent, BoundaryStrategy, ExpansionMap};

/// Output extent along one axis: `(n + 2 * pad - size) / stride + 1`.
///
/// # Errors
/// `ConfigurationError` when the padded axis is shorter than the kernel or
/// the stride is zero.
pub fn conv_output_extent(
    n: usize,
    pad: usize,
    size: usize,
    stride: usize,
) -> Result<usize, ConvGraphError> {
    if stride == 0 {
        return Err(ConvGraphError::ConfigurationError(
            "Convolution stride must be at least 1".to_string(),
        ));
    }
    let padded = padded_extent(n, pad)?;
    if size == 0 || padded < size {
        return Err(ConvGraphError::ConfigurationError(format!(
            "Kernel of size {} does not fit an axis of extent {} padded by {}",
            size, n, pad
        )));
    }
    Ok((padded - size) / stride + 1)
}

/// Cross-correlates an already expanded tensor with `kernel`.
pub fn conv2d_op<T: Element>(
    expanded: &Tensor<T>,
    kernel: &Kernel<T>,
    stride: usize,
) -> Result<Tensor<T>, ConvGraphError> {
    if expanded.channels() != kernel.in_channels() {
        return Err(ConvGraphError::ShapeMismatch {
            expected: vec![kernel.in_channels()],
            actual: vec![expanded.channels()],
            operation: "conv2d_op (input channels)".to_string(),
        });
    }
    let size = kernel.size();
    let out_h = conv_output_extent(expanded.height(), 0, size, stride)?;
    let out_w = conv_output_extent(expanded.width(), 0, size, stride)?;
    let mut output = zeros([out_h, out_w, kernel.out_channels()]);

    for i in 0..out_h {
        for j in 0..out_w {
            for k in 0..kernel.out_channels() {
                let mut acc = T::zero();
                for r in 0..size {
                    for q in 0..size {
                        for ch in 0..kernel.in_channels() {
                            acc += expanded[(i * stride + r, j * stride + q, ch)] * kernel[(k, ch, r, q)];
                        }
                    }
                }
                output[(i, j, k)] = acc;
            }
        }
    }
    Ok(output)
}

/// Gradients of a convolution w.r.t. its unpadded input and its kernel.
///
/// `input_shape` is the shape of the unpadded input; `map` routes every
/// expanded cell back to it and contributions are summed.
pub fn conv2d_backward<T: Element>(
    expanded: &Tensor<T>,
    map: &ExpansionMap,
    kernel: &Kernel<T>,
    stride: usize,
    grad_output: &Tensor<T>,
    input_shape: Shape,
) -> Result<(Tensor<T>, Kernel<T>), ConvGraphError> {
    let size = kernel.size();
    let expected_output = [
        conv_output_extent(expanded.height(), 0, size, stride)?,
        conv_output_extent(expanded.width(), 0, size, stride)?,
        kernel.out_channels(),
    ];
    if grad_output.shape() != expected_output {
        return Err(ConvGraphError::ShapeMismatch {
            expected: expected_output.to_vec(),
            actual: grad_output.shape().to_vec(),
            operation: "conv2d_backward".to_string(),
        });
    }

    let mut grad_input = zeros(input_shape);
    let mut grad_kernel = Kernel::zeros(kernel.out_channels(), kernel.in_channels(), size);
    let [out_h, out_w, out_c] = expected_output;

    for i in 0..out_h {
        for j in 0..out_w {
            for k in 0..out_c {
                let g = grad_output[(i, j, k)];
                for r in 0..size {
                    for q in 0..size {
                        let (row, col) = (i * stride + r, j * stride + q);
                        let (src_row, src_col) = map.source(row, col);
                        for ch in 0..kernel.in_channels() {
                            grad_input[(src_row, src_col, ch)] += g * kernel[(k, ch, r, q)];
                            grad_kernel[(k, ch, r, q)] += expanded[(row, col, ch)] * g;
                        }
                    }
                }
            }
        }
    }
    Ok((grad_input, grad_kernel))
}

/// Values kept from the forward pass for the backward pass.
#[derive(Debug, Clone)]
struct ConvCache<T> {
    expanded: Tensor<T>,
    map: ExpansionMap,
}

/// Graph node operation for a padded, strided convolution.
#[derive(Debug, Clone)]
pub struct ConvOp<T> {
    strategy: BoundaryStrategy,
    kernel: Kernel<T>,
    stride: usize,
    padding: usize,
    cache: Option<ConvCache<T>>,
    grad_kernel: Option<Kernel<T>>,
}

impl<T: Element> ConvOp<T> {
    pub fn new(
        strategy: BoundaryStrategy,
        kernel: Kernel<T>,
        stride: usize,
        padding: usize,
    ) -> Result<Self, ConvGraphError> {
        if stride == 0 {
            return Err(ConvGraphError::ConfigurationError(
                "Convolution stride must be at least 1".to_string(),
            ));
        }
        if kernel.size() == 0 {
            return Err(ConvGraphError::ConfigurationError(
                "Convolution kernel size must be at least 1".to_string(),
            ));
        }
        Ok(ConvOp {
            strategy,
            kernel,
            stride,
            padding,
            cache: None,
            grad_kernel: None,
        })
    }

    pub fn strategy(&self) -> BoundaryStrategy {
        self.strategy
    }

    pub fn kernel(&self) -> &Kernel<T> {
        &self.kernel
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn padding(&self) -> usize {
        self.padding
    }
}

impl<T: Element> GraphOp<T> for ConvOp<T> {
    fn name(&self) -> &'static str {
        match self.strategy {
            BoundaryStrategy::Mirror => "conv_mirror",
            BoundaryStrategy::Extend => "conv_extend",
            BoundaryStrategy::Cyclic => "conv_cyclic",
        }
    }

    fn output_shape(&self, input_shapes: &[Shape]) -> Result<Shape, ConvGraphError> {
        check_arity(input_shapes, 1, self.name())?;
        let [height, width, channels] = input_shapes[0];
        if channels != self.kernel.in_channels() {
            return Err(ConvGraphError::ShapeMismatch {
                expected: vec![self.kernel.in_channels()],
                actual: vec![channels],
                operation: format!("{} (kernel in-channels vs input channels)", self.name()),
            });
        }
        self.strategy.validate(height, self.padding)?;
        self.strategy.validate(width, self.padding)?;
        let expanded = [
            padded_extent(height, self.padding)?,
            padded_extent(width, self.padding)?,
            channels,
        ];
        if checked_numel(expanded).is_none() {
            return Err(ConvGraphError::ConfigurationError(format!(
                "{}: padding {} of a {}x{}x{} input overflows the element count",
                self.name(),
                self.padding,
                height,
                width,
                channels
            )));
        }
        Ok([
            conv_output_extent(height, self.padding, self.kernel.size(), self.stride)?,
            conv_output_extent(width, self.padding, self.kernel.size(), self.stride)?,
            self.kernel.out_channels(),
        ])
    }

    fn forward(&mut self, inputs: &[&Tensor<T>]) -> Result<Tensor<T>, ConvGraphError> {
        check_arity(inputs, 1, self.name())?;
        let (expanded, map) = expand_op(inputs[0], self.padding, self.strategy)?;
        let output = conv2d_op(&expanded, &self.kernel, self.stride)?;
        self.cache = Some(ConvCache { expanded, map });
        Ok(output)
    }

    fn backward(
        &mut self,
        inputs: &[&Tensor<T>],
        grad_output: &Tensor<T>,
    ) -> Result<Vec<Tensor<T>>, ConvGraphError> {
        check_arity(inputs, 1, self.name())?;
        let cache = self.cache.as_ref().ok_or_else(|| {
            ConvGraphError::InternalError(format!("{} backward called before forward", self.name()))
        })?;
        let (grad_input, grad_kernel) = conv2d_backward(
            &cache.expanded,
            &cache.map,
            &self.kernel,
            self.stride,
            grad_output,
            inputs[0].shape(),
        )?;
        self.grad_kernel = Some(grad_kernel);
        Ok(vec![grad_input])
    }

    fn has_parameters(&self) -> bool {
        true
    }

    fn parameter_grad(&self) -> Option<ParameterGrad<T>> {
        self.grad_kernel.clone().map(ParameterGrad::Kernel)
    }
}

#[cfg(test)]
#[path = "conv_test.rs"]
mod tests;
