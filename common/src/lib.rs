//! Types shared by every scanr crate: configuration, the error taxonomy,
//! interface and route descriptions and the port list parser.

pub mod config;
pub mod error;
pub mod network;
pub mod ports;
