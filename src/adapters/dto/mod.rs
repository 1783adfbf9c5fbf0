pub mod base_dto;
pub mod data_dto;
