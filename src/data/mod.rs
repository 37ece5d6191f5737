pub mod dataset;
pub mod loader;
pub mod remote;
