pub mod controllers;
pub mod datastore;
pub mod dto;
pub mod error;
pub mod router;
pub mod state;
