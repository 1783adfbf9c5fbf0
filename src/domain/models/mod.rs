pub mod file;
pub mod project;
pub mod signal;
