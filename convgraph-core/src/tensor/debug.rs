// src/tensor/debug.rs
use crate::tensor::Tensor;
use std::fmt;

/// Number of elements shown by the `Debug` preview.
const DEBUG_PREVIEW: usize = 16;

impl<T: fmt::Debug> fmt::Debug for Tensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tensor(shape={:?}, data=", self.shape)?;
        if self.data.len() > DEBUG_PREVIEW {
            let preview = &self.data[..DEBUG_PREVIEW];
            write!(f, "{:?} ... ({} elements))", preview, self.data.len())
        } else {
            write!(f, "{:?})", self.data)
        }
    }
}

/// Prints rows of pixels, each pixel being its channel vector.
impl<T: fmt::Display> fmt::Display for Tensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [height, width, channels] = self.shape;
        write!(f, "[")?;
        for h in 0..height {
            if h > 0 {
                write!(f, ", ")?;
            }
            write!(f, "[")?;
            for w in 0..width {
                if w > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "[")?;
                for c in 0..channels {
                    if c > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", self.data[(h * width + w) * channels + c])?;
                }
                write!(f, "]")?;
            }
            write!(f, "]")?;
        }
        write!(f, "]")
    }
}
