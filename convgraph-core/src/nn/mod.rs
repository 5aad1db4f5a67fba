// src/nn/mod.rs
// Layer descriptions and learnable parameters.

pub mod layer_spec;
pub mod parameter;

// Re-export common items
pub use layer_spec::{LayerKind, LayerSpec};
pub use parameter::ParameterGrad;
