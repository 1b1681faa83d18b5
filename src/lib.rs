pub mod config;
pub mod error;
pub mod qr;
pub mod routes;
pub mod store;
pub mod types;
pub mod utils;
