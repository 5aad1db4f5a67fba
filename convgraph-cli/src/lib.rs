//! Text front end for `convgraph-core`: parses a problem description, runs
//! one forward and one backward pass and formats the results.

pub mod error;
pub mod input;
pub mod output;

pub use error::CliError;
pub use input::{parse_problem, ProblemInput};
pub use output::format_report;

use convgraph_core::autograd::GraphOutputs;
use convgraph_core::{Graph, Tensor};
use log::debug;

/// Evaluates a parsed problem. The flat seed is shaped like the terminal
/// output.
pub fn evaluate(problem: ProblemInput) -> Result<GraphOutputs<f64>, CliError> {
    let mut graph = Graph::new(problem.input, &problem.layers)?;
    let output = graph.forward()?.clone();
    let seed = Tensor::from_channel_major(&problem.seed, output.shape())?;
    graph.backward(&seed)?;
    debug!("evaluate: {} nodes, output {:?}", graph.len(), output.shape());
    Ok(GraphOutputs {
        output,
        input_grad: graph.input_grad()?.clone(),
        parameter_grads: graph.parameter_grads()?,
    })
}

/// Parses `text`, evaluates it and returns the printable report.
pub fn run_protocol(text: &str) -> Result<String, CliError> {
    let problem = parse_problem(text)?;
    let outputs = evaluate(problem)?;
    Ok(format_report(&outputs))
}
