//! Scan machinery: capture handle, route and next hop resolution, and the
//! SYN scan engine.

pub mod network;
pub mod scanner;
