pub mod max_pool;

pub use max_pool::{max_pool_backward, max_pool_op, max_pool_output_shape, MaxPoolOp, TieSets};
