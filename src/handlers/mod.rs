//! Demo HTTP handlers served behind the access log.

pub mod health;
pub mod index;

pub use health::health_handler;
pub use index::index_handler;
