pub mod chasi;
pub mod core;
pub mod plan;
