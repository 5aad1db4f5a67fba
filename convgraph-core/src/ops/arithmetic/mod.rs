pub mod bias_add;

pub use bias_add::{bias_add_op, BiasAddOp};
