pub mod cli;
pub mod estimate;
pub mod initializers;
