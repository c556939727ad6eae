//! Linkscope - URL shortener with click analytics
//!
//! # Architecture
//! - `services`: short code generation, link creation and resolution
//! - `storage`: `LinkStore` contract with SeaORM and in-memory backends
//! - `api`: HTTP handlers and middleware (actix-web)
//! - `config`: static TOML/env configuration
//! - `runtime`: server startup, run loop and shutdown
//! - `system`: logging

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
