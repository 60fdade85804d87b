pub mod coverage;
pub mod factory;
pub mod ipog;
pub mod negative;
pub mod order;
pub mod partitioner;
pub mod pipeline;

pub use ipog::{generate, Ipog};
pub use negative::{negative_group, negative_groups};
pub use pipeline::{generate_groups, GenerationConfig, GenerationError};
