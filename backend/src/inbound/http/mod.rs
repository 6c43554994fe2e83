//! HTTP inbound adapter: roster pages, downloads, stylesheets and health checks.

pub mod assets;
pub mod download;
pub mod error;
pub mod health;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod views;

pub use error::ApiResult;
