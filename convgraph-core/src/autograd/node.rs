use crate::autograd::backward_op::GraphOp;
use crate::error::ConvGraphError;
use crate::ops::traits::Element;
use crate::ops::Operation;
use crate::tensor::{zeros_like, Shape, Tensor};
use log::trace;

/// Position of a node in its graph.
pub type NodeId = usize;

/// Evaluation state of a node.
#[derive(Debug, Clone)]
pub enum NodeState<T> {
    /// Built but not evaluated yet.
    Uninitialized,
    /// Forward result plus the gradient accumulator of the same shape.
    Evaluated { result: Tensor<T>, grad: Tensor<T> },
}

/// A graph vertex: an operation, the indices of its predecessors and its
/// evaluation state.
#[derive(Debug, Clone)]
pub struct Node<T> {
    pub(crate) op: Operation<T>,
    pub(crate) inputs: Vec<NodeId>,
    pub(crate) output_shape: Shape,
    pub(crate) state: NodeState<T>,
}

impl<T: Element> Node<T> {
    pub(crate) fn new(op: Operation<T>, inputs: Vec<NodeId>, output_shape: Shape) -> Self {
        Node {
            op,
            inputs,
            output_shape,
            state: NodeState::Uninitialized,
        }
    }

    pub fn op(&self) -> &Operation<T> {
        &self.op
    }

    pub fn inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    /// Shape inferred at construction; the forward result always has it.
    pub fn output_shape(&self) -> Shape {
        self.output_shape
    }

    pub fn is_evaluated(&self) -> bool {
        matches!(self.state, NodeState::Evaluated { .. })
    }

    pub fn state(&self) -> &NodeState<T> {
        &self.state
    }

    /// Forward result. `id` is only used to report the error.
    pub fn result(&self, id: NodeId) -> Result<&Tensor<T>, ConvGraphError> {
        match &self.state {
            NodeState::Evaluated { result, .. } => Ok(result),
            NodeState::Uninitialized => Err(ConvGraphError::NodeNotEvaluated { node: id }),
        }
    }

    /// Gradient accumulator.
    pub fn grad(&self, id: NodeId) -> Result<&Tensor<T>, ConvGraphError> {
        match &self.state {
            NodeState::Evaluated { grad, .. } => Ok(grad),
            NodeState::Uninitialized => Err(ConvGraphError::NodeNotEvaluated { node: id }),
        }
    }

    pub(crate) fn grad_mut(&mut self, id: NodeId) -> Result<&mut Tensor<T>, ConvGraphError> {
        match &mut self.state {
            NodeState::Evaluated { grad, .. } => Ok(grad),
            NodeState::Uninitialized => Err(ConvGraphError::NodeNotEvaluated { node: id }),
        }
    }

    /// Computes and caches the forward result and allocates a zeroed
    /// gradient accumulator.
    ///
    /// `predecessors` are the nodes before this one (`graph[..id]`).
    pub(crate) fn evaluate(
        &mut self,
        id: NodeId,
        predecessors: &[Node<T>],
    ) -> Result<(), ConvGraphError> {
        let result = {
            let inputs = self
                .inputs
                .iter()
                .map(|&input| predecessors[input].result(input))
                .collect::<Result<Vec<_>, _>>()?;
            self.op.forward(&inputs)?
        };
        if result.shape() != self.output_shape {
            return Err(ConvGraphError::InternalError(format!(
                "node {} ({}) produced shape {:?}, inferred {:?}",
                id,
                self.op.name(),
                result.shape(),
                self.output_shape
            )));
        }
        trace!("evaluate: node {} ({}) -> {:?}", id, self.op.name(), result.shape());
        let grad = zeros_like(&result);
        self.state = NodeState::Evaluated { result, grad };
        Ok(())
    }

    /// Pushes this node's accumulated gradient into its predecessors'
    /// accumulators.
    pub(crate) fn back_propagate(
        &mut self,
        id: NodeId,
        predecessors: &mut [Node<T>],
    ) -> Result<(), ConvGraphError> {
        let grad = match &self.state {
            NodeState::Evaluated { grad, .. } => grad,
            NodeState::Uninitialized => return Err(ConvGraphError::NodeNotEvaluated { node: id }),
        };
        let input_grads = {
            let inputs = self
                .inputs
                .iter()
                .map(|&input| predecessors[input].result(input))
                .collect::<Result<Vec<_>, _>>()?;
            self.op.backward(&inputs, grad)?
        };
        if input_grads.len() != self.inputs.len() {
            return Err(ConvGraphError::InternalError(format!(
                "node {} ({}) returned {} gradients for {} inputs",
                id,
                self.op.name(),
                input_grads.len(),
                self.inputs.len()
            )));
        }
        trace!("back_propagate: node {} ({}) -> inputs {:?}", id, self.op.name(), self.inputs);
        for (&input, input_grad) in self.inputs.iter().zip(input_grads.iter()) {
            predecessors[input].grad_mut(input)?.add_assign_tensor(input_grad)?;
        }
        Ok(())
    }
}
