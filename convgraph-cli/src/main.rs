use convgraph_cli::{run_protocol, CliError};
use log::{error, info};
use std::env;
use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;

fn print_help() {
    println!("convgraph - forward and backward pass over a convolution stack");
    println!();
    println!("Usage:");
    println!("  convgraph                # Read the problem from stdin");
    println!("  convgraph problem.txt    # Read the problem from a file");
    println!("  convgraph --help         # Show this help");
    println!();
    println!("Set RUST_LOG=debug to trace the passes.");
}

fn read_input(path: Option<String>) -> Result<String, CliError> {
    match path {
        Some(path) => {
            info!("Reading problem from {}", path);
            Ok(fs::read_to_string(path)?)
        }
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let path = env::args().nth(1);
    if matches!(path.as_deref(), Some("-h") | Some("--help")) {
        print_help();
        return ExitCode::SUCCESS;
    }

    match read_input(path).and_then(|text| run_protocol(&text)) {
        Ok(report) => {
            print!("{}", report);
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
