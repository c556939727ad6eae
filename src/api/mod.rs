pub mod middleware;
pub mod services;

pub use services::{api_routes, health_routes};
