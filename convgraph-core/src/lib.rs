// Declares the main modules of the crate
pub mod autograd;
pub mod error;
pub mod nn;
pub mod ops;
pub mod tensor;

// Re-export the main types so they are reachable as `convgraph_core::Tensor`, ...
pub use autograd::{Graph, GraphOp, GraphOutputs, NodeId};
pub use error::ConvGraphError;
pub use nn::{LayerKind, LayerSpec, ParameterGrad};
pub use ops::conv::{BoundaryStrategy, Kernel};
pub use ops::traits::Element;
pub use ops::Operation;
pub use tensor::{Shape, Tensor};
// Re-export traits required by public functions/structs
pub use num_traits;
