//! Reverse-mode differentiation over an arena of nodes.
//!
//! [`Graph`] owns the nodes; each [`Node`] holds an
//! [`Operation`](crate::ops::Operation) dispatched through [`GraphOp`].

pub mod backward_op;
pub mod grad_check;
pub mod graph;
pub mod node;

pub use backward_op::GraphOp;
pub use grad_check::{check_input_grad, GradCheckConfig, GradCheckError};
pub use graph::{Graph, GraphOutputs};
pub use node::{Node, NodeId, NodeState};
