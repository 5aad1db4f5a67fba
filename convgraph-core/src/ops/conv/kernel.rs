use crate::error::ConvGraphError;
use crate::ops::traits::Element;
use std::ops::{Index, IndexMut};

/// Square convolution weights laid out `[out_channel][in_channel][row][col]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel<T> {
    data: Vec<T>,
    out_channels: usize,
    in_channels: usize,
    size: usize,
}

impl<T: Element> Kernel<T> {
    /// Creates a kernel from flattened `[out][in][row][col]` weights.
    pub fn new(
        data: Vec<T>,
        out_channels: usize,
        in_channels: usize,
        size: usize,
    ) -> Result<Self, ConvGraphError> {
        let expected = [out_channels, in_channels, size, size]
            .iter()
            .try_fold(1usize, |acc, &dim| acc.checked_mul(dim));
        if expected != Some(data.len()) {
            return Err(ConvGraphError::TensorCreationError {
                data_len: data.len(),
                shape: vec![out_channels, in_channels, size, size],
            });
        }
        Ok(Kernel {
            data,
            out_channels,
            in_channels,
            size,
        })
    }

    pub fn zeros(out_channels: usize, in_channels: usize, size: usize) -> Self {
        Kernel {
            data: vec![T::zero(); out_channels * in_channels * size * size],
            out_channels,
            in_channels,
            size,
        }
    }

    pub fn out_channels(&self) -> usize {
        self.out_channels
    }

    pub fn in_channels(&self) -> usize {
        self.in_channels
    }

    /// Spatial extent (the kernel is `size x size`).
    pub fn size(&self) -> usize {
        self.size
    }

    /// `[out_channels, in_channels, size, size]`
    pub fn shape(&self) -> [usize; 4] {
        [self.out_channels, self.in_channels, self.size, self.size]
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }
}

impl<T> Kernel<T> {
    #[inline]
    fn offset(&self, k: usize, ch: usize, row: usize, col: usize) -> usize {
        ((k * self.in_channels + ch) * self.size + row) * self.size + col
    }
}

impl<T> Index<(usize, usize, usize, usize)> for Kernel<T> {
    type Output = T;

    fn index(&self, (k, ch, row, col): (usize, usize, usize, usize)) -> &T {
        &self.data[self.offset(k, ch, row, col)]
    }
}

impl<T> IndexMut<(usize, usize, usize, usize)> for Kernel<T> {
    fn index_mut(&mut self, (k, ch, row, col): (usize, usize, usize, usize)) -> &mut T {
        let offset = self.offset(k, ch, row, col);
        &mut self.data[offset]
    }
}
