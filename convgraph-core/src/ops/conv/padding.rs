// convgraph-core/src/ops/conv/padding.rs

use crate::error::ConvGraphError;
use crate::ops::traits::Element;
use crate::tensor::{checked_numel, zeros, Tensor};
use std::fmt;
use std::str::FromStr;

/// How a convolution fills the padded border of its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundaryStrategy {
    /// Reflect around the edge without repeating the edge sample
    /// (`[a, b, c]` padded by 1 is `[b, a, b, c, b]`).
    Mirror,
    /// Repeat the nearest edge sample.
    Extend,
    /// Wrap around to the opposite edge.
    Cyclic,
}

impl BoundaryStrategy {
    pub const ALL: [BoundaryStrategy; 3] = [
        BoundaryStrategy::Mirror,
        BoundaryStrategy::Extend,
        BoundaryStrategy::Cyclic,
    ];

    /// Layer token of the text protocol.
    pub fn token(self) -> &'static str {
        match self {
            BoundaryStrategy::Mirror => "cnvm",
            BoundaryStrategy::Extend => "cnve",
            BoundaryStrategy::Cyclic => "cnvc",
        }
    }

    /// Maps position `i` of an axis padded by `pad` on both sides to the
    /// position it is copied from in the unpadded axis of extent `n`.
    ///
    /// `i` ranges over `[0, n + 2 * pad)`; the caller must have checked
    /// [`BoundaryStrategy::validate`] for `(n, pad)`.
    pub fn source_index(self, i: usize, n: usize, pad: usize) -> usize {
        let n = n as isize;
        let offset = i as isize - pad as isize;
        let v = match self {
            BoundaryStrategy::Mirror => {
                let v = offset.abs();
                if v >= n {
                    2 * n - v - 2
                } else {
                    v
                }
            }
            BoundaryStrategy::Extend => offset.clamp(0, n - 1),
            BoundaryStrategy::Cyclic => (offset + 2 * n) % n,
        };
        v as usize
    }

    /// Checks that every padded position of an axis of extent `n` maps
    /// inside `[0, n)`.
    pub fn validate(self, n: usize, pad: usize) -> Result<(), ConvGraphError> {
        if n == 0 {
            return Err(ConvGraphError::ConfigurationError(
                "Cannot pad an empty axis".to_string(),
            ));
        }
        padded_extent(n, pad)?;
        let fits = match self {
            BoundaryStrategy::Mirror => pad < n,
            BoundaryStrategy::Extend => true,
            BoundaryStrategy::Cyclic => pad <= 2 * n,
        };
        if !fits {
            return Err(ConvGraphError::ConfigurationError(format!(
                "Padding {} is too large for {:?} expansion of an axis of extent {}",
                pad, self, n
            )));
        }
        Ok(())
    }
}

impl fmt::Display for BoundaryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for BoundaryStrategy {
    type Err = ConvGraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BoundaryStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.token() == s)
            .ok_or_else(|| ConvGraphError::UnknownOperation(s.to_string()))
    }
}

/// Extent `n + 2 * pad` of an axis padded on both sides.
///
/// # Errors
/// `ConfigurationError` if the padded extent overflows (it must stay within
/// `isize` so that padded positions can be mapped back).
pub fn padded_extent(n: usize, pad: usize) -> Result<usize, ConvGraphError> {
    pad.checked_mul(2)
        .and_then(|border| border.checked_add(n))
        .filter(|&extent| extent <= isize::MAX as usize)
        .ok_or_else(|| {
            ConvGraphError::ConfigurationError(format!(
                "Padding {} overflows an axis of extent {}",
                pad, n
            ))
        })
}

/// For every `(row, col)` of an expanded tensor, the unpadded coordinate it
/// was copied from. Several expanded cells can share one source.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpansionMap {
    rows: Vec<usize>,
    cols: Vec<usize>,
}

impl ExpansionMap {
    /// Builds the map for an `height x width` input padded by `pad`.
    pub fn new(
        height: usize,
        width: usize,
        pad: usize,
        strategy: BoundaryStrategy,
    ) -> Result<Self, ConvGraphError> {
        strategy.validate(height, pad)?;
        strategy.validate(width, pad)?;
        // Rows and columns are mapped independently.
        let rows = (0..padded_extent(height, pad)?)
            .map(|i| strategy.source_index(i, height, pad))
            .collect();
        let cols = (0..padded_extent(width, pad)?)
            .map(|j| strategy.source_index(j, width, pad))
            .collect();
        Ok(ExpansionMap { rows, cols })
    }

    /// Expanded extent `(rows, cols)`.
    pub fn extent(&self) -> (usize, usize) {
        (self.rows.len(), self.cols.len())
    }

    /// Source coordinate of expanded cell `(row, col)`.
    #[inline]
    pub fn source(&self, row: usize, col: usize) -> (usize, usize) {
        (self.rows[row], self.cols[col])
    }
}

/// Pads `input` by `pad` on every spatial side following `strategy`.
///
/// Returns the expanded tensor together with the map from expanded cells
/// back to `input` coordinates.
pub fn expand_op<T: Element>(
    input: &Tensor<T>,
    pad: usize,
    strategy: BoundaryStrategy,
) -> Result<(Tensor<T>, ExpansionMap), ConvGraphError> {
    let map = ExpansionMap::new(input.height(), input.width(), pad, strategy)?;
    let (rows, cols) = map.extent();
    let channels = input.channels();
    if checked_numel([rows, cols, channels]).is_none() {
        return Err(ConvGraphError::ConfigurationError(format!(
            "Expanding a {:?} input by {} overflows the element count",
            input.shape(),
            pad
        )));
    }
    let mut expanded = zeros([rows, cols, channels]);
    for i in 0..rows {
        for j in 0..cols {
            let (src_i, src_j) = map.source(i, j);
            for c in 0..channels {
                expanded[(i, j, c)] = input[(src_i, src_j, c)];
            }
        }
    }
    Ok((expanded, map))
}
