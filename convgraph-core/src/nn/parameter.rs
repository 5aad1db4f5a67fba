use crate::ops::conv::Kernel;
use crate::ops::traits::Element;

/// Gradient of a layer's learnable parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterGrad<T> {
    /// One value per channel (bias-add layers).
    Bias(Vec<T>),
    /// Same layout as the layer's kernel (convolution layers).
    Kernel(Kernel<T>),
}

impl<T: Element> ParameterGrad<T> {
    /// Flattens the gradient: per channel for a bias, `[out][in][row][col]`
    /// for a kernel.
    pub fn flatten(&self) -> Vec<T> {
        match self {
            ParameterGrad::Bias(values) => values.clone(),
            ParameterGrad::Kernel(kernel) => kernel.data().to_vec(),
        }
    }

    pub fn as_bias(&self) -> Option<&[T]> {
        match self {
            ParameterGrad::Bias(values) => Some(values),
            ParameterGrad::Kernel(_) => None,
        }
    }

    pub fn as_kernel(&self) -> Option<&Kernel<T>> {
        match self {
            ParameterGrad::Kernel(kernel) => Some(kernel),
            ParameterGrad::Bias(_) => None,
        }
    }
}
