pub mod build;
pub mod check;
pub mod combine;
pub mod manifest;
pub mod render;
pub mod scenes;
