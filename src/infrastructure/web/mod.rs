//! HTTP surface: landing page and metrics endpoint.

pub mod landing;
pub mod server;

pub use landing::LandingPage;
pub use server::{router, serve};
