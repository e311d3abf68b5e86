pub mod icon_dto;
