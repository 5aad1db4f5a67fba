use convgraph_core::autograd::GraphOutputs;
use convgraph_core::Tensor;

/// Space-separated values in round-trip float notation.
pub fn format_values(values: &[f64]) -> String {
    values
        .iter()
        .map(|value| format!("{:?}", value))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn format_tensor(tensor: &Tensor<f64>) -> String {
    format_values(&tensor.to_channel_major())
}

/// Output, input gradient, then one line per parameterised layer.
pub fn format_report(outputs: &GraphOutputs<f64>) -> String {
    let mut report = String::new();
    report.push_str(&format_tensor(&outputs.output));
    report.push('\n');
    report.push_str(&format_tensor(&outputs.input_grad));
    report.push('\n');
    for (_, grad) in &outputs.parameter_grads {
        report.push_str(&format_values(&grad.flatten()));
        report.push('\n');
    }
    report
}
