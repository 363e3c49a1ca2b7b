//! Stable Diffusion WebUI REST client.
//!
//! Provides a typed wrapper around the synchronous `txt2img` endpoint and
//! the connection settings used to reach it.

pub mod api;
pub mod config;
