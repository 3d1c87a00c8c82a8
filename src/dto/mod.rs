pub mod common_dto;
pub mod list_dto;
