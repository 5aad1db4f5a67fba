//! # Tensor Operations Module (`ops`)
//!
//! Central hub for the operations a graph node can evaluate.
//!
//! ## Structure:
//!
//! - **`_op` functions:** each operation has a forward kernel (`leaky_relu_op`,
//!   `bias_add_op`, `max_pool_op`, `conv2d_op`, ...) and, where needed, a
//!   matching `_backward` kernel. They work on plain tensors and can be used
//!   without a graph.
//! - **`...Op` structs:** wrap the kernels, hold parameters and the state kept
//!   between the forward and backward passes, and implement
//!   [`GraphOp`](crate::autograd::GraphOp).
//! - **[`Operation`]:** the closed set of node operations.
//!
//! ## Key Submodules:
//!
//! - [`activation`]: leaky ReLU.
//! - [`arithmetic`]: per-channel bias.
//! - [`pool`]: max-pooling with tie-sets.
//! - [`conv`]: convolution with mirror / extend / cyclic boundary expansion.
//! - [`source`]: the graph input.

pub mod traits;

pub mod activation;
pub mod arithmetic;
pub mod conv;
pub mod operation;
pub mod pool;
pub mod source;

pub use operation::Operation;
