use crate::autograd::backward_op::GraphOp;
use crate::autograd::node::{Node, NodeId, NodeState};
use crate::error::ConvGraphError;
use crate::nn::layer_spec::LayerSpec;
use crate::nn::parameter::ParameterGrad;
use crate::ops::source::SourceOp;
use crate::ops::traits::Element;
use crate::ops::Operation;
use crate::tensor::{zeros_like, Tensor};
use log::{debug, trace};

/// Everything a single forward + backward run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphOutputs<T> {
    /// Forward result of the terminal node.
    pub output: Tensor<T>,
    /// Gradient w.r.t. the graph input.
    pub input_grad: Tensor<T>,
    /// Parameter gradients of bias and convolution layers, in construction
    /// order, tagged with their node.
    pub parameter_grads: Vec<(NodeId, ParameterGrad<T>)>,
}

/// A computation graph stored as an arena of nodes.
///
/// Node 0 is the source holding the input tensor; node `i + 1` is built from
/// the `i`-th layer specification. Every node reads only from nodes with a
/// smaller index, so declaration order is a topological order: the forward
/// pass walks the arena front to back and the backward pass back to front.
#[derive(Debug, Clone)]
pub struct Graph<T> {
    nodes: Vec<Node<T>>,
}

impl<T: Element> Graph<T> {
    /// Builds the graph, inferring every node's output shape so that layer
    /// parameters are validated before anything is evaluated.
    ///
    /// # Errors
    /// - `InvalidLayerReference` if a layer reads from itself or a later node.
    /// - `ShapeMismatch`, `TensorCreationError` or `ConfigurationError` if a
    ///   layer's parameters do not fit its predecessor.
    pub fn new(input: Tensor<T>, specs: &[LayerSpec<T>]) -> Result<Self, ConvGraphError> {
        let source_shape = input.shape();
        let mut nodes = Vec::with_capacity(specs.len() + 1);
        nodes.push(Node::new(Operation::Source(SourceOp::new(input)), Vec::new(), source_shape));

        for (layer, spec) in specs.iter().enumerate() {
            let id = layer + 1;
            let input = match spec.input {
                Some(input) if input >= id => {
                    return Err(ConvGraphError::InvalidLayerReference { layer, input });
                }
                Some(input) => input,
                None => id - 1,
            };
            let input_shape = nodes[input].output_shape();
            let op = spec.build(input_shape)?;
            let output_shape = op.output_shape(&[input_shape])?;
            trace!(
                "Graph::new: node {} ({}) reads node {}, {:?} -> {:?}",
                id,
                op.name(),
                input,
                input_shape,
                output_shape
            );
            nodes.push(Node::new(op, vec![input], output_shape));
        }
        debug!("Graph::new: built {} nodes", nodes.len());
        Ok(Graph { nodes })
    }

    /// Number of nodes, source included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a graph has at least its source node.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[Node<T>] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&Node<T>> {
        self.nodes.get(id)
    }

    fn terminal_id(&self) -> NodeId {
        self.nodes.len() - 1
    }

    /// Evaluates every node in declaration order and returns the terminal
    /// node's result. Gradient accumulators are reset to zero.
    pub fn forward(&mut self) -> Result<&Tensor<T>, ConvGraphError> {
        debug!("Graph::forward: evaluating {} nodes", self.nodes.len());
        for id in 0..self.nodes.len() {
            let (predecessors, rest) = self.nodes.split_at_mut(id);
            rest[0].evaluate(id, predecessors)?;
        }
        self.output()
    }

    /// Installs `seed` as the terminal node's gradient and back-propagates
    /// through every node in reverse declaration order.
    ///
    /// Accumulators are zeroed first, so calling `backward` again after the
    /// same forward pass gives the same gradients.
    ///
    /// # Errors
    /// - `NodeNotEvaluated` if `forward` has not run.
    /// - `ShapeMismatch` if `seed` is not shaped like the terminal result.
    pub fn backward(&mut self, seed: &Tensor<T>) -> Result<(), ConvGraphError> {
        let terminal = self.terminal_id();
        for (id, node) in self.nodes.iter_mut().enumerate() {
            match &mut node.state {
                NodeState::Evaluated { result, grad } => *grad = zeros_like(result),
                NodeState::Uninitialized => return Err(ConvGraphError::NodeNotEvaluated { node: id }),
            }
        }
        {
            let grad = self.nodes[terminal].grad_mut(terminal)?;
            grad.check_same_shape(seed, "Graph::backward (seed gradient)")?;
            *grad = seed.clone();
        }

        debug!("Graph::backward: propagating from node {}", terminal);
        for id in (0..self.nodes.len()).rev() {
            let (predecessors, rest) = self.nodes.split_at_mut(id);
            rest[0].back_propagate(id, predecessors)?;
        }
        Ok(())
    }

    /// Forward result of the terminal node.
    pub fn output(&self) -> Result<&Tensor<T>, ConvGraphError> {
        let terminal = self.terminal_id();
        self.nodes[terminal].result(terminal)
    }

    /// Gradient w.r.t. the graph input (the source node's accumulator).
    pub fn input_grad(&self) -> Result<&Tensor<T>, ConvGraphError> {
        self.node_grad(0)
    }

    /// Gradient accumulated on node `id`.
    pub fn node_grad(&self, id: NodeId) -> Result<&Tensor<T>, ConvGraphError> {
        let node = self.nodes.get(id).ok_or_else(|| ConvGraphError::IndexOutOfBounds {
            index: vec![id],
            shape: vec![self.nodes.len()],
        })?;
        node.grad(id)
    }

    /// Parameter gradients of every bias and convolution node, in
    /// construction order.
    ///
    /// # Errors
    /// `GradientNotComputed` if a parameterised node has not been through
    /// `backward` yet.
    pub fn parameter_grads(&self) -> Result<Vec<(NodeId, ParameterGrad<T>)>, ConvGraphError> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.op.has_parameters())
            .map(|(id, node)| {
                node.op
                    .parameter_grad()
                    .map(|grad| (id, grad))
                    .ok_or(ConvGraphError::GradientNotComputed { node: id })
            })
            .collect()
    }

    /// Builds a graph, runs one forward and one backward pass and collects
    /// the results.
    pub fn run(
        input: Tensor<T>,
        specs: &[LayerSpec<T>],
        seed: &Tensor<T>,
    ) -> Result<GraphOutputs<T>, ConvGraphError> {
        let mut graph = Graph::new(input, specs)?;
        let output = graph.forward()?.clone();
        graph.backward(seed)?;
        Ok(GraphOutputs {
            output,
            input_grad: graph.input_grad()?.clone(),
            parameter_grads: graph.parameter_grads()?,
        })
    }
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
