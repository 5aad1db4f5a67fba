// src/ops/activation/mod.rs

//! # Activation Functions
//!
//! ## Currently Implemented:
//! - [`LeakyReluOp`]: leaky Rectified Linear Unit, `x` for `x >= 0`, `alpha * x` otherwise.

pub mod leaky_relu;

// Re-export key functions
pub use leaky_relu::{leaky_relu_backward, leaky_relu_op, LeakyReluOp};
