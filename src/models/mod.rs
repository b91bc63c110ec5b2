//! Domain types shared across the client.

pub mod image;
pub mod user;

pub use image::{CropBox, OutputFormat, Resize, TransformParams};
pub use user::User;
