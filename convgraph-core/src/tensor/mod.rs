// src/tensor/mod.rs

use crate::error::ConvGraphError;
use crate::ops::traits::Element;
use std::ops::{Index, IndexMut};

pub mod create;
mod debug;

pub use create::{full, zeros, zeros_like};

/// Shape of a rank-3 tensor: `[height, width, channels]`.
pub type Shape = [usize; 3];

/// Element count of `shape`, or `None` if it does not fit in `usize`.
pub fn checked_numel(shape: Shape) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
}

/// A dense rank-3 array of real values laid out as `(height, width, channel)`.
///
/// Storage is row-major with the channel as the fastest axis, so the element
/// at `(h, w, c)` lives at `(h * width + w) * channels + c`. `Clone` performs a
/// deep copy: tensors have value semantics and nodes never alias each other's
/// results.
#[derive(Clone, PartialEq)]
pub struct Tensor<T = f64> {
    pub(crate) data: Vec<T>,
    pub(crate) shape: Shape,
}

impl<T: Element> Tensor<T> {
    /// Creates a tensor from raw `(h, w, c)`-ordered data.
    ///
    /// # Errors
    /// `TensorCreationError` if `data.len()` is not `h * w * c`.
    pub fn new(data: Vec<T>, shape: Shape) -> Result<Self, ConvGraphError> {
        if checked_numel(shape) != Some(data.len()) {
            return Err(ConvGraphError::TensorCreationError {
                data_len: data.len(),
                shape: shape.to_vec(),
            });
        }
        Ok(Tensor { data, shape })
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn height(&self) -> usize {
        self.shape[0]
    }

    pub fn width(&self) -> usize {
        self.shape[1]
    }

    pub fn channels(&self) -> usize {
        self.shape[2]
    }

    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// Raw data in storage order.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    #[inline]
    pub(crate) fn offset(&self, h: usize, w: usize, c: usize) -> usize {
        (h * self.shape[1] + w) * self.shape[2] + c
    }

    /// Checked element access.
    pub fn get(&self, h: usize, w: usize, c: usize) -> Result<T, ConvGraphError> {
        if h >= self.shape[0] || w >= self.shape[1] || c >= self.shape[2] {
            return Err(ConvGraphError::IndexOutOfBounds {
                index: vec![h, w, c],
                shape: self.shape.to_vec(),
            });
        }
        Ok(self.data[self.offset(h, w, c)])
    }

    /// Applies `f` to every element in place.
    pub fn map_inplace<F>(&mut self, f: F)
    where
        F: Fn(T) -> T,
    {
        self.data.iter_mut().for_each(|x| *x = f(*x));
    }

    /// Returns a transformed copy, leaving `self` untouched.
    pub fn map<F>(&self, f: F) -> Tensor<T>
    where
        F: Fn(T) -> T,
    {
        let mut result = self.clone();
        result.map_inplace(f);
        result
    }

    /// Element-wise `self += other`. Used to accumulate gradients.
    pub fn add_assign_tensor(&mut self, other: &Tensor<T>) -> Result<(), ConvGraphError> {
        self.check_same_shape(other, "add_assign_tensor")?;
        self.data
            .iter_mut()
            .zip(other.data.iter())
            .for_each(|(a, &b)| *a += b);
        Ok(())
    }

    /// Per-channel sum over every spatial position.
    pub fn sum_spatial(&self) -> Vec<T> {
        let channels = self.channels();
        let mut sums = vec![T::zero(); channels];
        for (i, &x) in self.data.iter().enumerate() {
            sums[i % channels] += x;
        }
        sums
    }

    /// Returns `ShapeMismatch` unless `other` has exactly the same shape.
    pub fn check_same_shape(
        &self,
        other: &Tensor<T>,
        operation: &str,
    ) -> Result<(), ConvGraphError> {
        if self.shape != other.shape {
            return Err(ConvGraphError::ShapeMismatch {
                expected: self.shape.to_vec(),
                actual: other.shape.to_vec(),
                operation: operation.to_string(),
            });
        }
        Ok(())
    }
}

impl<T> Index<(usize, usize, usize)> for Tensor<T> {
    type Output = T;

    fn index(&self, (h, w, c): (usize, usize, usize)) -> &T {
        &self.data[(h * self.shape[1] + w) * self.shape[2] + c]
    }
}

impl<T> IndexMut<(usize, usize, usize)> for Tensor<T> {
    fn index_mut(&mut self, (h, w, c): (usize, usize, usize)) -> &mut T {
        let offset = (h * self.shape[1] + w) * self.shape[2] + c;
        &mut self.data[offset]
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
