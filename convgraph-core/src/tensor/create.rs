// src/tensor/create.rs

use crate::error::ConvGraphError;
use crate::ops::traits::Element;
use crate::tensor::{checked_numel, Shape, Tensor};
use rand::distributions::uniform::SampleUniform;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

/// Creates a new tensor filled with zeros with the specified shape.
pub fn zeros<T: Element>(shape: Shape) -> Tensor<T> {
    full(shape, T::zero())
}

/// Creates a tensor filled with zeros with the same shape as `tensor`.
pub fn zeros_like<T: Element>(tensor: &Tensor<T>) -> Tensor<T> {
    zeros(tensor.shape())
}

/// Creates a new tensor filled with `value`.
pub fn full<T: Element>(shape: Shape, value: T) -> Tensor<T> {
    let numel: usize = shape.iter().product();
    Tensor {
        data: vec![value; numel],
        shape,
    }
}

/// Creates a tensor with values drawn uniformly from `[low, high)`.
pub fn rand_uniform<T, R>(shape: Shape, low: T, high: T, rng: &mut R) -> Tensor<T>
where
    T: Element + SampleUniform,
    R: Rng + ?Sized,
{
    let numel: usize = shape.iter().product();
    let data = (0..numel).map(|_| rng.gen_range(low..high)).collect();
    Tensor { data, shape }
}

/// Creates a tensor with values drawn from the standard normal distribution.
pub fn randn<T, R>(shape: Shape, rng: &mut R) -> Tensor<T>
where
    T: Element,
    StandardNormal: Distribution<T>,
    R: Rng + ?Sized,
{
    let numel: usize = shape.iter().product();
    let data = (0..numel).map(|_| StandardNormal.sample(rng)).collect();
    Tensor { data, shape }
}

impl<T: Element> Tensor<T> {
    /// Builds a tensor from values ordered channel-major then row-major
    /// (`values[c][h][w]`), the layout used by the text protocol.
    pub fn from_channel_major(values: &[T], shape: Shape) -> Result<Self, ConvGraphError> {
        let [height, width, channels] = shape;
        if checked_numel(shape) != Some(values.len()) {
            return Err(ConvGraphError::TensorCreationError {
                data_len: values.len(),
                shape: shape.to_vec(),
            });
        }
        let mut tensor = zeros(shape);
        for c in 0..channels {
            for h in 0..height {
                for w in 0..width {
                    tensor[(h, w, c)] = values[(c * height + h) * width + w];
                }
            }
        }
        Ok(tensor)
    }

    /// Flattens channel-major then row-major; inverse of [`Tensor::from_channel_major`].
    pub fn to_channel_major(&self) -> Vec<T> {
        let [height, width, channels] = self.shape;
        let mut values = Vec::with_capacity(self.numel());
        for c in 0..channels {
            for h in 0..height {
                for w in 0..width {
                    values.push(self[(h, w, c)]);
                }
            }
        }
        values
    }
}

#[cfg(test)]
#[path = "create_test.rs"]
mod tests;
