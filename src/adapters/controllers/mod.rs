pub mod base_controller;
pub mod data_controller;
pub mod health_controller;
