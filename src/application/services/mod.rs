pub mod archive;
mod icon_service;
mod storage_service;

pub use icon_service::{IconListing, IconService};
pub use storage_service::IconStorage;
