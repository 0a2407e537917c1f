//! HTTP route handlers.

pub mod assets;
