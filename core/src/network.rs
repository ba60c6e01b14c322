pub mod channel;
pub mod route;
