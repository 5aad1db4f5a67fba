use convgraph_core::ConvGraphError;
use thiserror::Error;

/// Errors reported by the command-line front end.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Parse error on line {line}: {message}")]
    ParseError { line: usize, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Graph(#[from] ConvGraphError),
}

impl CliError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        CliError::ParseError {
            line,
            message: message.into(),
        }
    }
}
