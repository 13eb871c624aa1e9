#![warn(clippy::uninlined_format_args)]

pub mod error;
pub mod model;
pub mod model_builder;
pub mod optimizer;
pub mod ports;

pub use error::{PoolingError, SolverStatusError};
pub use model::{PoolingModel, SolveOptions};
pub use model_builder::PoolingModelBuilder;
pub use optimizer::PoolingOptimizer;
pub use ports::{BinaryProgramSolver, SolveAttempt};
