//! Parser for the line-oriented problem format:
//!
//! ```text
//! n d v_0 ... v_{d*n*n-1}      input, channel-major
//! L                            layer count
//! relu a | pool s | bias b... | cnvm/cnve/cnvc h k s p w...
//! g_0 ... g_m                  seed gradient, channel-major
//! ```
//!
//! Blank lines are skipped; line numbers in errors are 1-based and count
//! every physical line.

use crate::error::CliError;
use convgraph_core::{BoundaryStrategy, ConvGraphError, LayerSpec, Tensor};
use log::{debug, warn};
use std::str::FromStr;

/// A fully parsed problem. The seed stays flat because its shape is only
/// known once the graph has inferred the output shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemInput {
    pub input: Tensor<f64>,
    pub layers: Vec<LayerSpec<f64>>,
    pub seed: Vec<f64>,
}

struct Lines<'a> {
    inner: std::iter::Enumerate<std::str::Lines<'a>>,
    last: usize,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        Lines {
            inner: text.lines().enumerate(),
            last: 0,
        }
    }

    /// Next non-blank line as `(line_number, tokens)`.
    fn next_tokens(&mut self, what: &str) -> Result<(usize, Vec<&'a str>), CliError> {
        for (index, line) in self.inner.by_ref() {
            self.last = index + 1;
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if !tokens.is_empty() {
                return Ok((index + 1, tokens));
            }
        }
        Err(CliError::parse(self.last + 1, format!("unexpected end of input, expected {}", what)))
    }

    fn remaining(&mut self) -> usize {
        self.inner.by_ref().filter(|(_, line)| !line.trim().is_empty()).count()
    }
}

fn parse_value<T: FromStr>(line: usize, token: &str, what: &str) -> Result<T, CliError> {
    token
        .parse()
        .map_err(|_| CliError::parse(line, format!("invalid {} '{}'", what, token)))
}

fn parse_values(line: usize, tokens: &[&str]) -> Result<Vec<f64>, CliError> {
    tokens.iter().map(|token| parse_value(line, token, "number")).collect()
}

fn parse_input_tensor(line: usize, tokens: &[&str]) -> Result<Tensor<f64>, CliError> {
    if tokens.len() < 2 {
        return Err(CliError::parse(line, "expected the spatial size and channel count"));
    }
    let n: usize = parse_value(line, tokens[0], "spatial size")?;
    let d: usize = parse_value(line, tokens[1], "channel count")?;
    let expected = n
        .checked_mul(n)
        .and_then(|area| area.checked_mul(d))
        .ok_or_else(|| CliError::parse(line, format!("a {}x{}x{} tensor is too large", n, n, d)))?;
    let values = parse_values(line, &tokens[2..])?;
    if values.len() != expected {
        return Err(CliError::parse(
            line,
            format!("expected {} input values for a {}x{}x{} tensor, got {}", expected, n, n, d, values.len()),
        ));
    }
    Ok(Tensor::from_channel_major(&values, [n, n, d])?)
}

fn expect_params(line: usize, token: &str, params: &[&str], count: usize) -> Result<(), CliError> {
    if params.len() != count {
        return Err(CliError::parse(
            line,
            format!("'{}' takes {} parameter(s), got {}", token, count, params.len()),
        ));
    }
    Ok(())
}

/// Parses one layer line.
///
/// # Errors
/// `UnknownOperation` for an unrecognised token, `ConfigurationError` for
/// `relu 0`, `ParseError` for malformed parameters.
pub fn parse_layer(line: usize, tokens: &[&str]) -> Result<LayerSpec<f64>, CliError> {
    let (token, params) = match tokens.split_first() {
        Some(split) => split,
        None => return Err(CliError::parse(line, "empty layer line")),
    };
    let spec = match *token {
        "relu" => {
            expect_params(line, token, params, 1)?;
            let a: f64 = parse_value(line, params[0], "activation divisor")?;
            if a == 0.0 {
                return Err(ConvGraphError::ConfigurationError(format!(
                    "relu divisor on line {} must be non-zero",
                    line
                ))
                .into());
            }
            LayerSpec::leaky_relu(1.0 / a)
        }
        "pool" => {
            expect_params(line, token, params, 1)?;
            LayerSpec::max_pool(parse_value(line, params[0], "pooling window")?)
        }
        "bias" => LayerSpec::bias(parse_values(line, params)?),
        _ => {
            let strategy = token.parse::<BoundaryStrategy>()?;
            if params.len() < 4 {
                return Err(CliError::parse(
                    line,
                    format!("'{}' needs out channels, kernel size, stride and padding", token),
                ));
            }
            LayerSpec::conv(
                strategy,
                parse_value(line, params[0], "output channel count")?,
                parse_value(line, params[1], "kernel size")?,
                parse_value(line, params[2], "stride")?,
                parse_value(line, params[3], "padding")?,
                parse_values(line, &params[4..])?,
            )
        }
    };
    spec.validate()?;
    Ok(spec)
}

/// Parses a whole problem description.
pub fn parse_problem(text: &str) -> Result<ProblemInput, CliError> {
    let mut lines = Lines::new(text);

    let (line, tokens) = lines.next_tokens("the input tensor")?;
    let input = parse_input_tensor(line, &tokens)?;

    let (line, tokens) = lines.next_tokens("the layer count")?;
    if tokens.len() != 1 {
        return Err(CliError::parse(line, "expected a single layer count"));
    }
    let count: usize = parse_value(line, tokens[0], "layer count")?;

    let mut layers = Vec::with_capacity(count);
    for _ in 0..count {
        let (line, tokens) = lines.next_tokens("a layer")?;
        layers.push(parse_layer(line, &tokens)?);
    }

    let (line, tokens) = lines.next_tokens("the seed gradient")?;
    let seed = parse_values(line, &tokens)?;

    let trailing = lines.remaining();
    if trailing > 0 {
        warn!("Ignoring {} trailing line(s) after the seed gradient", trailing);
    }
    debug!(
        "parse_problem: input {:?}, {} layers, {} seed values",
        input.shape(),
        layers.len(),
        seed.len()
    );
    Ok(ProblemInput { input, layers, seed })
}

#[cfg(test)]
#[path = "input_test.rs"]
mod tests;
