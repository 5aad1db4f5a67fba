use convgraph_core::tensor::{Shape, Tensor};
use convgraph_core::Element;

// Helper function to create a tensor from (h, w, c)-ordered data.
// allow(dead_code) because not every test crate uses every helper.
#[allow(dead_code)]
pub(crate) fn create_test_tensor<T: Element>(data: Vec<T>, shape: Shape) -> Tensor<T> {
    Tensor::new(data, shape).expect("Test tensor creation failed")
}

// Same, from channel-major (t[c][i][j]) data as written in the text protocol.
#[allow(dead_code)]
pub(crate) fn channel_major_tensor<T: Element>(values: &[T], shape: Shape) -> Tensor<T> {
    Tensor::from_channel_major(values, shape).expect("Channel-major tensor creation failed")
}

// Routes `log` output of the library through the test harness (RUST_LOG=trace).
#[allow(dead_code)]
pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
