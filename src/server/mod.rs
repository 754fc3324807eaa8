//! HTTP and WebSocket server
//!
//! One listener serves the health check and upgrades WebSocket requests.
//! Each upgraded socket gets its own [`connection::Connection`] task that
//! shuttles frames between the socket and the sync hub.

pub mod config;
pub mod connection;
pub mod health;
pub mod listener;
pub mod routes;
pub mod upgrade;

pub use config::{OriginPolicy, ServerConfig};
pub use connection::Connection;
pub use listener::EmployeeServer;
pub use routes::ServerState;
