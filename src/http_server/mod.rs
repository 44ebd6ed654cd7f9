//! # HTTP Server
//!
//! axum front end for the roster service: health check, roster upload and
//! upsert, listing and `.xlsx` export.
pub mod config;
pub mod server;
pub mod student_routes;

pub use config::HttpServerConfig;
pub use server::HttpServer;
pub use student_routes::RosterState;
