//! REST client for the Pixelport image processing service.
//!
//! Authentication uses an opaque bearer token obtained from `POST /login`;
//! every request that needs it attaches the token explicitly.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
