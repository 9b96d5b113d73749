pub mod auth;
pub use auth::*;
pub mod image;
pub use image::*;
pub mod jwt;
pub use jwt::*;
