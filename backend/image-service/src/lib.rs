//! Image Service
//!
//! Accepts image uploads, resizes them to a fixed JPEG rendition through an
//! event-driven processing step, and serves the processed result by key.

pub mod config;
pub mod error;
pub mod events;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod services;
pub mod storage;

// Public re-exports
pub use config::Config;
pub use error::{AppError, Result};
