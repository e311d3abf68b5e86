pub mod health_controller;
pub mod icon_controller;
