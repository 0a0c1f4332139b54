//! Process lifecycle.
//!
//! # Flow
//! ```text
//! main: load config → init logging → bind listener → HttpServer::run
//! Ctrl+C → Shutdown::trigger → axum graceful shutdown → exit
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
