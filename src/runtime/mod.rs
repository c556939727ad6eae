//! Application lifecycle: startup, server run loop, shutdown

pub mod server;
pub mod shutdown;
pub mod startup;

pub use server::run_server;
