use num_traits::{Float, NumAssignOps, NumOps};
use std::fmt::{Debug, Display};

/// A trait representing the element types usable in convgraph tensors.
///
/// Bounds the types (`f32`, `f64`) accepted by the generic kernels of the
/// graph operations. `Float` already provides `zero()`, `one()`,
/// `neg_infinity()` and the casts used when importing protocol values.
pub trait Element:
    Float
    + NumAssignOps
    + NumOps
    + PartialOrd
    + Debug
    + Display
    + Default
    + Send
    + Sync
    + 'static
{
}

impl Element for f32 {}
impl Element for f64 {}
